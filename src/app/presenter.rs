use std::collections::BTreeMap;

use eframe::egui::{Align2, FontId, Painter, Rect, Stroke, StrokeKind, Vec2};
use log::debug;

use super::render::{BACKGROUND, FOREGROUND};
use super::render_utils::{blend_color, faded};
use super::scene::{MediaSource, NodeId};
use crate::content::MediaKind;

/// Where and how one media element should appear this frame, in screen
/// coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct MediaPlacement {
    pub(in crate::app) id: NodeId,
    pub(in crate::app) rect: Rect,
    pub(in crate::app) alpha: f32,
    pub(in crate::app) z_index: i32,
}

/// Owns whatever actually displays media assets. The scene only hands it
/// placements and collects the natural sizes it discovers.
pub(in crate::app) trait MediaPresenter {
    /// Registers a media node. Attaching an id twice is a no-op.
    fn attach(&mut self, id: NodeId, source: &MediaSource);
    fn show(&mut self, placement: MediaPlacement);
    fn hide(&mut self, id: NodeId);
    fn release(&mut self, id: NodeId);
    fn release_all(&mut self);
    /// Natural dimensions reported since the last drain.
    fn drain_natural_sizes(&mut self) -> Vec<(NodeId, Vec2)>;

    fn present(&mut self, _painter: &Painter) {}
}

struct PresentedMedia {
    alt: String,
    kind: MediaKind,
    placement: Option<MediaPlacement>,
}

/// Draws a framed placeholder with the alt text in place of each image.
/// Sizes come from the record metadata, or a square when there is none.
#[derive(Default)]
pub(in crate::app) struct FramePresenter {
    media: BTreeMap<NodeId, PresentedMedia>,
    natural_sizes: Vec<(NodeId, Vec2)>,
}

impl FramePresenter {
    pub(in crate::app) fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn attached(&self) -> usize {
        self.media.len()
    }

    fn visible(&self) -> Vec<(&PresentedMedia, MediaPlacement)> {
        let mut visible: Vec<_> = self
            .media
            .values()
            .filter_map(|media| media.placement.map(|placement| (media, placement)))
            .collect();
        visible.sort_by_key(|(_, placement)| placement.z_index);
        visible
    }
}

impl MediaPresenter for FramePresenter {
    fn attach(&mut self, id: NodeId, source: &MediaSource) {
        if self.media.contains_key(&id) {
            return;
        }

        let natural = source.natural_size.unwrap_or(Vec2::splat(1.0));
        self.natural_sizes.push((id, natural));
        self.media.insert(
            id,
            PresentedMedia {
                alt: source.alt.clone(),
                kind: source.kind,
                placement: None,
            },
        );
    }

    fn show(&mut self, placement: MediaPlacement) {
        if let Some(media) = self.media.get_mut(&placement.id) {
            media.placement = Some(placement);
        }
    }

    fn hide(&mut self, id: NodeId) {
        if let Some(media) = self.media.get_mut(&id) {
            media.placement = None;
        }
    }

    fn release(&mut self, id: NodeId) {
        self.media.remove(&id);
        self.natural_sizes.retain(|(pending, _)| *pending != id);
    }

    fn release_all(&mut self) {
        if !self.media.is_empty() {
            debug!("releasing {} presented media", self.media.len());
        }
        self.media.clear();
        self.natural_sizes.clear();
    }

    fn drain_natural_sizes(&mut self) -> Vec<(NodeId, Vec2)> {
        std::mem::take(&mut self.natural_sizes)
    }

    fn present(&mut self, painter: &Painter) {
        let fill = blend_color(BACKGROUND, FOREGROUND, 0.08);
        for (media, placement) in self.visible() {
            let color = faded(FOREGROUND, placement.alpha);
            painter.rect_filled(placement.rect, 0.0, faded(fill, placement.alpha));
            painter.rect_stroke(
                placement.rect,
                0.0,
                Stroke::new(1.0, color),
                StrokeKind::Inside,
            );
            if media.kind == MediaKind::Image && !media.alt.is_empty() {
                painter.with_clip_rect(placement.rect).text(
                    placement.rect.center(),
                    Align2::CENTER_CENTER,
                    &media.alt,
                    FontId::monospace(11.0),
                    color,
                );
            }
        }

        for media in self.media.values_mut() {
            media.placement = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;
    use crate::app::scene::tests::test_scene;

    fn source(natural: Option<Vec2>) -> MediaSource {
        MediaSource {
            kind: MediaKind::Image,
            src: "a.png".to_owned(),
            alt: "a".to_owned(),
            natural_size: natural,
        }
    }

    fn ids() -> (NodeId, NodeId) {
        let scene = test_scene();
        (scene.nodes[0].id, scene.nodes[1].id)
    }

    #[test]
    fn attach_is_idempotent_and_reports_sizes_once() {
        let (first, second) = ids();
        let mut presenter = FramePresenter::new();
        presenter.attach(first, &source(Some(vec2(800.0, 600.0))));
        presenter.attach(first, &source(Some(vec2(10.0, 10.0))));
        presenter.attach(second, &source(None));

        let sizes = presenter.drain_natural_sizes();
        assert_eq!(sizes, vec![(first, vec2(800.0, 600.0)), (second, Vec2::splat(1.0))]);
        assert!(presenter.drain_natural_sizes().is_empty());
        assert_eq!(presenter.attached(), 2);
    }

    #[test]
    fn shown_media_sort_by_z_and_release_forgets_them() {
        let (first, second) = ids();
        let mut presenter = FramePresenter::new();
        presenter.attach(first, &source(None));
        presenter.attach(second, &source(None));
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(10.0, 10.0));
        presenter.show(MediaPlacement {
            id: first,
            rect,
            alpha: 1.0,
            z_index: 9,
        });
        presenter.show(MediaPlacement {
            id: second,
            rect,
            alpha: 1.0,
            z_index: 2,
        });

        let order: Vec<NodeId> = presenter.visible().iter().map(|(_, p)| p.id).collect();
        assert_eq!(order, vec![second, first]);

        presenter.hide(second);
        assert_eq!(presenter.visible().len(), 1);
        presenter.release(first);
        presenter.release_all();
        assert_eq!(presenter.attached(), 0);
    }
}
