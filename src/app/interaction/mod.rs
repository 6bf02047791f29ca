
use eframe::egui::{Pos2, Rect, vec2};

use super::navigation::{
    PendingLoad, back_to_category, click_empty, enter_about, enter_category, enter_focus,
    enter_project,
};
use super::overlay::HoverOverlay;
use super::scene::{DragState, MainKey, Mode, NodeKind, RESUME_TIMER, SceneState};
use super::text_layout::TextMeasure;
use crate::util::jitter;
pub(in crate::app) use hit_test::hit_test;
use hit_test::node_rect;

const LEAVE_RESUME_TIMER: f32 = 0.1;
const HOVER_NUDGE: f32 = 0.05;

/// Canvas-relative pointer input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum PointerEvent {
    Down(Pos2),
    Move(Pos2),
    Up,
    Leave,
}

/// Side effects the frame driver has to carry out for one event.
#[derive(Debug, Default, PartialEq)]
pub(in crate::app) struct Reaction {
    pub(in crate::app) load: Option<PendingLoad>,
    pub(in crate::app) open_url: Option<String>,
}

impl Reaction {
    fn load(load: Option<PendingLoad>) -> Self {
        Self {
            load,
            open_url: None,
        }
    }
}

/// Whether a node frozen by hover may wander again once the pointer moves
/// off it.
pub(in crate::app) fn can_resume(mode: Mode, kind: &NodeKind) -> bool {
    match mode {
        Mode::Home => true,
        Mode::Focus => matches!(kind, NodeKind::Child { .. }),
        Mode::Category => matches!(kind, NodeKind::Grandchild { .. }),
        Mode::Project => matches!(kind, NodeKind::Media { .. }),
        Mode::Content => false,
    }
}

pub(in crate::app) fn handle_pointer(
    scene: &mut SceneState,
    event: PointerEvent,
    measure: &dyn TextMeasure,
    overlay: &mut dyn HoverOverlay,
) -> Reaction {
    match event {
        PointerEvent::Down(pos) => pointer_down(scene, pos, measure),
        PointerEvent::Move(pos) => {
            pointer_move(scene, pos, measure, overlay);
            Reaction::default()
        }
        PointerEvent::Up => {
            pointer_up(scene);
            Reaction::default()
        }
        PointerEvent::Leave => {
            pointer_leave(scene, overlay);
            Reaction::default()
        }
    }
}

enum Press {
    Main(MainKey),
    Link(String),
    Ignore,
    Category,
    Project,
    Drag,
}

fn pointer_down(scene: &mut SceneState, pos: Pos2, measure: &dyn TextMeasure) -> Reaction {
    let Some(index) = hit_test(scene, pos, measure) else {
        return Reaction::load(click_empty(scene));
    };

    let press = match &scene.nodes[index].kind {
        NodeKind::Main { key } => Press::Main(*key),
        NodeKind::Child { url: Some(url), .. } => Press::Link(url.clone()),
        NodeKind::Child {
            parent: Some(MainKey::Contacts),
            ..
        } => Press::Ignore,
        NodeKind::Child { .. } => Press::Category,
        NodeKind::Grandchild { .. } => Press::Project,
        NodeKind::Description(_)
        | NodeKind::AboutDescription(_)
        | NodeKind::TextContent(_)
        | NodeKind::Media { .. } => Press::Drag,
    };

    match press {
        Press::Main(MainKey::About) => Reaction::load(enter_about(scene, index)),
        Press::Main(key) => Reaction::load(enter_focus(scene, key)),
        Press::Link(url) => Reaction {
            load: None,
            open_url: Some(url),
        },
        Press::Ignore => Reaction::default(),
        Press::Category if scene.mode == Mode::Project => {
            Reaction::load(back_to_category(scene))
        }
        Press::Category => Reaction::load(enter_category(scene, index)),
        Press::Project => Reaction::load(enter_project(scene, index)),
        Press::Drag => {
            let node = &mut scene.nodes[index];
            node.freeze();
            scene.drag = Some(DragState {
                index,
                offset: node.pos - pos.to_vec2(),
            });
            Reaction::default()
        }
    }
}

/// Hover footprint; media get a little breathing room for the brackets.
fn hover_rect(scene: &SceneState, index: usize, measure: &dyn TextMeasure) -> Option<Rect> {
    let rect = node_rect(scene, index, measure)?;
    match scene.nodes[index].kind {
        NodeKind::Media { .. } => Some(rect.expand(scene.config.media.bracket_padding)),
        _ => Some(rect),
    }
}

fn report_hover(
    scene: &SceneState,
    index: Option<usize>,
    measure: &dyn TextMeasure,
    overlay: &mut dyn HoverOverlay,
) {
    match index.and_then(|index| hover_rect(scene, index, measure)) {
        Some(rect) => overlay.set_hover_box(rect),
        None => overlay.clear_hover_box(),
    }
}

fn pointer_move(
    scene: &mut SceneState,
    pos: Pos2,
    measure: &dyn TextMeasure,
    overlay: &mut dyn HoverOverlay,
) {
    if let Some(drag) = scene.drag {
        if let Some(node) = scene.nodes.get_mut(drag.index) {
            node.pos = pos.to_vec2() + drag.offset;
            node.freeze();
        }
        report_hover(scene, Some(drag.index), measure, overlay);
        return;
    }

    let hit = hit_test(scene, pos, measure);
    if hit != scene.hovered {
        if let Some(previous) = scene.hovered {
            let nudge = vec2(
                jitter(&mut scene.rng, HOVER_NUDGE),
                jitter(&mut scene.rng, HOVER_NUDGE),
            );
            let mode = scene.mode;
            if let Some(node) = scene.nodes.get_mut(previous)
                && can_resume(mode, &node.kind)
            {
                node.rearm(RESUME_TIMER);
                node.vel += nudge;
            }
        }

        if let Some(index) = hit {
            let top = scene
                .nodes
                .iter()
                .filter_map(|node| match node.kind {
                    NodeKind::Media { z_index, .. } => Some(z_index),
                    _ => None,
                })
                .max()
                .unwrap_or(0);
            let node = &mut scene.nodes[index];
            node.freeze();
            if let NodeKind::Media { z_index, .. } = &mut node.kind {
                *z_index = top + 1;
            }
        }
        scene.hovered = hit;
    }

    report_hover(scene, hit, measure, overlay);
}

fn pointer_up(scene: &mut SceneState) {
    let Some(drag) = scene.drag.take() else {
        return;
    };
    if let Some(node) = scene.nodes.get_mut(drag.index) {
        node.freeze();
        if let NodeKind::Media { manually_moved, .. } = &mut node.kind {
            *manually_moved = true;
        }
    }
}

fn pointer_leave(scene: &mut SceneState, overlay: &mut dyn HoverOverlay) {
    scene.drag = None;
    let mode = scene.mode;
    scene.rearm_where(LEAVE_RESUME_TIMER, |node| {
        node.is_frozen() && can_resume(mode, &node.kind)
    });
    scene.hovered = None;
    overlay.clear_hover_box();
}
