use std::path::PathBuf;

use eframe::egui::{
    self, Color32, Context, Event, FontId, Painter, PointerButton, Rect, Sense, Ui,
};
use log::error;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::EngineConfig;
use crate::content::{ContentClient, FsRepository};

mod interaction;
mod navigation;
mod overlay;
mod physics;
mod presenter;
mod render;
mod render_utils;
mod scene;
mod text_layout;

use interaction::{PointerEvent, Reaction};
use navigation::PendingLoad;
use overlay::BracketOverlay;
use presenter::{FramePresenter, MediaPresenter};
use scene::{NodeKind, SceneState};
use text_layout::TextMeasure;

pub struct GraphApp {
    config: EngineConfig,
    seed: Option<u64>,
    scene: Option<SceneState>,
    client: ContentClient<PendingLoad>,
    presenter: FramePresenter,
    overlay: BracketOverlay,
}

/// Measures text with the fonts the painter will draw it in.
struct PainterMeasure<'a> {
    painter: &'a Painter,
}

impl TextMeasure for PainterMeasure<'_> {
    fn width(&self, text: &str, font_size: f32) -> f32 {
        self.painter
            .layout_no_wrap(text.to_owned(), FontId::proportional(font_size), Color32::WHITE)
            .size()
            .x
    }
}

impl GraphApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        content_dir: PathBuf,
        config: EngineConfig,
        seed: Option<u64>,
    ) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        Self {
            config,
            seed,
            scene: None,
            client: ContentClient::spawn(FsRepository::new(content_dir)),
            presenter: FramePresenter::new(),
            overlay: BracketOverlay::new(),
        }
    }

    fn show_canvas(&mut self, ui: &mut Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let rect = response.rect;
        let origin = rect.min.to_vec2();
        let Self {
            config,
            seed,
            scene,
            client,
            presenter,
            overlay,
        } = self;

        let scene = scene.get_or_insert_with(|| {
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(*seed),
                None => StdRng::from_entropy(),
            };
            SceneState::new(rect.size(), config.clone(), rng)
        });
        if scene.canvas != rect.size() {
            scene.resize(rect.size());
        }

        for reply in client.poll() {
            navigation::complete(scene, reply.ticket, reply.result);
        }
        sync_media(scene, presenter);

        let measure = PainterMeasure { painter: &painter };
        let events = ui.input(|input| {
            input
                .events
                .iter()
                .filter_map(|event| translate_event(event, rect))
                .collect::<Vec<_>>()
        });
        for event in events {
            let reaction = interaction::handle_pointer(scene, event, &measure, overlay);
            apply_reaction(ui.ctx(), client, reaction);
        }

        let dt = ui.input(|input| input.stable_dt);
        physics::advance(scene, dt);

        render_utils::draw_background(&painter, rect, render::BACKGROUND);
        let plan = render::compose(scene, &measure);
        render::paint(&plan, &painter, origin, presenter);

        let pointer = ui.input(|input| input.pointer.hover_pos());
        overlay.paint(&painter, origin, pointer, dt, scene.config.rect.line_width);
    }
}

/// Keeps the presenter's media set in step with the scene's Media nodes.
fn sync_media(scene: &mut SceneState, presenter: &mut dyn MediaPresenter) {
    for id in scene.take_released_media() {
        presenter.release(id);
    }
    for node in &scene.nodes {
        if let NodeKind::Media { source, .. } = &node.kind {
            presenter.attach(node.id, source);
        }
    }
    for (id, natural) in presenter.drain_natural_sizes() {
        scene.set_natural_size(id, natural);
    }
}

fn apply_reaction(ctx: &Context, client: &ContentClient<PendingLoad>, reaction: Reaction) {
    if let Some(load) = reaction.load {
        let query = load.query();
        if let Err(error) = client.submit(load, query) {
            error!("content request failed: {error}");
        }
    }
    if let Some(url) = reaction.open_url {
        ctx.open_url(egui::OpenUrl::new_tab(url));
    }
}

/// Canvas-relative pointer event for an egui input event, if it is one.
fn translate_event(event: &Event, canvas: Rect) -> Option<PointerEvent> {
    let local = |pos: egui::Pos2| pos - canvas.min.to_vec2();
    match event {
        Event::PointerMoved(pos) => Some(PointerEvent::Move(local(*pos))),
        Event::PointerButton {
            pos,
            button: PointerButton::Primary,
            pressed: true,
            ..
        } if canvas.contains(*pos) => Some(PointerEvent::Down(local(*pos))),
        Event::PointerButton {
            button: PointerButton::Primary,
            pressed: false,
            ..
        } => Some(PointerEvent::Up),
        Event::PointerGone => Some(PointerEvent::Leave),
        _ => None,
    }
}

impl eframe::App for GraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(render::BACKGROUND))
            .show(ctx, |ui| self.show_canvas(ui));
        ctx.request_repaint();
    }
}

impl Drop for GraphApp {
    fn drop(&mut self) {
        self.presenter.release_all();
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{Modifiers, pos2, vec2};

    use super::*;
    use crate::app::scene::tests::{media, test_scene};

    fn press(pos: egui::Pos2, pressed: bool) -> Event {
        Event::PointerButton {
            pos,
            button: PointerButton::Primary,
            pressed,
            modifiers: Modifiers::NONE,
        }
    }

    #[test]
    fn events_become_canvas_relative() {
        let canvas = Rect::from_min_size(pos2(100.0, 50.0), vec2(400.0, 300.0));

        assert_eq!(
            translate_event(&Event::PointerMoved(pos2(150.0, 60.0)), canvas),
            Some(PointerEvent::Move(pos2(50.0, 10.0)))
        );
        assert_eq!(
            translate_event(&press(pos2(110.0, 70.0), true), canvas),
            Some(PointerEvent::Down(pos2(10.0, 20.0)))
        );
        assert_eq!(translate_event(&press(pos2(10.0, 10.0), true), canvas), None);
        assert_eq!(
            translate_event(&press(pos2(10.0, 10.0), false), canvas),
            Some(PointerEvent::Up)
        );
        assert_eq!(
            translate_event(&Event::PointerGone, canvas),
            Some(PointerEvent::Leave)
        );
    }

    #[test]
    fn media_sync_attaches_sizes_and_releases_removed_nodes() {
        let mut scene = test_scene();
        let mut presenter = FramePresenter::new();
        let index = scene.push(vec2(500.0, 500.0), media(1));

        sync_media(&mut scene, &mut presenter);
        match &scene.nodes[index].kind {
            NodeKind::Media { display_size, .. } => {
                let size = scene.config.media.size;
                assert_eq!(*display_size, Some(vec2(size, size)));
            }
            other => panic!("unexpected node {other:?}"),
        }

        scene.truncate_to_mains();
        sync_media(&mut scene, &mut presenter);
        assert!(scene.released_media.is_empty());
        assert!(presenter.drain_natural_sizes().is_empty());
    }
}
