use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};

use super::super::scene::{MainKey, Mode, NodeKind, SceneState};
use super::super::text_layout::{TextMeasure, box_origin};

const ABOUT_Z: i32 = 10_000;

/// Whether `index` is on the active path at the current level and so
/// ignores the camera shift.
pub(in crate::app) fn is_anchored(scene: &SceneState, index: usize) -> bool {
    let Some(node) = scene.nodes.get(index) else {
        return false;
    };

    match scene.mode {
        Mode::Home => false,
        Mode::Focus => {
            Some(index) == scene.focus_key.map(MainKey::index)
                || matches!(node.kind, NodeKind::Child { .. })
        }
        Mode::Category => {
            Some(index) == scene.selected_category
                || (matches!(node.kind, NodeKind::Grandchild { .. })
                    && node.owner_index() == scene.selected_category)
        }
        Mode::Project => {
            Some(index) == scene.selected_project
                || (matches!(node.kind, NodeKind::Media { .. } | NodeKind::Description(_))
                    && node.owner_index() == scene.selected_project)
        }
        Mode::Content => {
            Some(index) == scene.selected_content
                || (matches!(
                    node.kind,
                    NodeKind::TextContent(_) | NodeKind::AboutDescription(_)
                ) && node.owner_index() == scene.selected_content)
        }
    }
}

pub(in crate::app) fn screen_x(scene: &SceneState, index: usize) -> f32 {
    let Some(node) = scene.nodes.get(index) else {
        return 0.0;
    };

    if is_anchored(scene, index) {
        node.pos.x
    } else {
        node.pos.x + scene.camera.offset_x
    }
}

pub(in crate::app) fn screen_pos(scene: &SceneState, index: usize) -> Pos2 {
    let y = scene.nodes.get(index).map_or(0.0, |node| node.pos.y);
    pos2(screen_x(scene, index), y)
}

pub(in crate::app) fn node_alpha(scene: &SceneState, index: usize) -> f32 {
    let Some(node) = scene.nodes.get(index) else {
        return 1.0;
    };
    let main_dim = scene.config.main.dim_alpha;
    let project_dim = scene.config.project.dim_alpha;
    let pick = |active: bool, dim: f32| if active { 1.0 } else { dim };
    let projects = Some(MainKey::Projects.index());

    match (scene.mode, &node.kind) {
        (Mode::Focus, NodeKind::Main { key }) => pick(Some(*key) == scene.focus_key, main_dim),
        (Mode::Category, NodeKind::Main { .. }) => pick(Some(index) == projects, main_dim),
        (Mode::Category, NodeKind::Child { .. }) => {
            pick(Some(index) == scene.selected_category, main_dim)
        }
        (Mode::Category, NodeKind::Grandchild { .. }) => {
            pick(node.owner_index() == scene.selected_category, main_dim)
        }
        (Mode::Project, NodeKind::Main { .. }) => pick(Some(index) == projects, project_dim),
        (Mode::Project, NodeKind::Child { .. }) => {
            pick(Some(index) == scene.selected_category, project_dim)
        }
        (Mode::Project, NodeKind::Grandchild { .. }) => {
            pick(Some(index) == scene.selected_project, project_dim)
        }
        (Mode::Project, NodeKind::Media { .. } | NodeKind::Description(_)) => {
            pick(node.owner_index() == scene.selected_project, project_dim)
        }
        (Mode::Content, NodeKind::Main { .. }) => {
            pick(Some(index) == scene.selected_content, main_dim)
        }
        (Mode::Content, NodeKind::TextContent(_) | NodeKind::AboutDescription(_)) => {
            pick(node.owner_index() == scene.selected_content, main_dim)
        }
        _ => 1.0,
    }
}

fn base_font_size(scene: &SceneState, index: usize) -> f32 {
    let fonts = &scene.config.fonts;
    match scene.nodes.get(index).map(|node| &node.kind) {
        Some(NodeKind::Main { key }) => {
            if scene.mode == Mode::Category && *key != MainKey::Projects {
                fonts.main_small
            } else {
                fonts.main
            }
        }
        Some(NodeKind::Child { .. }) => fonts.child,
        Some(NodeKind::Grandchild { .. }) => fonts.grandchild,
        Some(NodeKind::Media { .. }) => fonts.media,
        Some(NodeKind::Description(_)) => scene.config.description.font_size,
        Some(NodeKind::AboutDescription(_)) => scene.config.about.font_size,
        Some(NodeKind::TextContent(_)) => scene.config.text.font_size,
        None => fonts.main,
    }
}

fn shrink(scale: f32, progress: f32) -> f32 {
    1.0 - (1.0 - scale) * progress
}

/// Font size after the per-level shrink applied to nodes off the active path.
pub(in crate::app) fn font_size(scene: &SceneState, index: usize) -> f32 {
    let mut size = base_font_size(scene, index);
    let Some(node) = scene.nodes.get(index) else {
        return size;
    };

    let depth = scene.camera.depth;
    let focus_t = depth.min(1.0);
    let category_t = (depth - 1.0).clamp(0.0, 1.0);
    let project_t = (depth - 2.0).clamp(0.0, 1.0);
    let config = &scene.config;
    let deep = matches!(scene.mode, Mode::Category | Mode::Project);
    let project = scene.mode == Mode::Project;

    match &node.kind {
        NodeKind::Main { key }
            if matches!(scene.mode, Mode::Focus | Mode::Category | Mode::Project)
                && Some(*key) != scene.focus_key =>
        {
            size *= shrink(config.main.shrink_scale, focus_t);
            if deep {
                size *= shrink(config.child.shrink_scale, category_t);
            }
            if project {
                size *= shrink(config.project.shrink_scale, project_t);
            }
        }
        NodeKind::Child { .. } if deep && Some(index) != scene.selected_category => {
            size *= shrink(config.child.shrink_scale, category_t);
            if project {
                size *= shrink(config.project.shrink_scale, project_t);
            }
        }
        NodeKind::Grandchild { .. } if project && Some(index) != scene.selected_project => {
            size *= shrink(config.project.shrink_scale, project_t);
        }
        _ => {}
    }

    size
}

pub(in crate::app) fn z_key(scene: &SceneState, index: usize) -> i32 {
    match scene.nodes.get(index).map(|node| &node.kind) {
        Some(NodeKind::AboutDescription(_)) => ABOUT_Z,
        Some(NodeKind::Media { z_index, .. }) => *z_index,
        _ => -1000 - index as i32,
    }
}

/// Indices from bottom to top.
pub(in crate::app) fn draw_order(scene: &SceneState) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scene.nodes.len()).collect();
    order.sort_by_key(|&index| z_key(scene, index));
    order
}

/// Marker rectangle, label anchor and hit bounds of a Main/Child/Grandchild.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct PlainGeometry {
    pub(in crate::app) marker: Rect,
    pub(in crate::app) label_pos: Pos2,
    pub(in crate::app) bounds: Rect,
    pub(in crate::app) font_size: f32,
}

pub(in crate::app) fn plain_geometry(
    scene: &SceneState,
    index: usize,
    measure: &dyn TextMeasure,
) -> Option<PlainGeometry> {
    let node = scene.nodes.get(index)?;
    let label = node.label()?;
    let rect = &scene.config.rect;
    let font_size = font_size(scene, index);
    let scale = if node.is_main() {
        font_size / scene.config.fonts.main
    } else {
        1.0
    };

    let center = screen_pos(scene, index);
    let marker_size = vec2(rect.width, rect.height) * scale;
    let marker = Rect::from_center_size(center, marker_size);
    let label_pos = pos2(marker.right() + rect.label_gap, center.y);
    let label_width = measure.width(label, font_size);
    let bounds = Rect::from_min_size(
        marker.min,
        vec2(
            marker_size.x + rect.label_gap + label_width,
            marker_size.y.max(font_size),
        ),
    );

    Some(PlainGeometry {
        marker,
        label_pos,
        bounds,
        font_size,
    })
}

/// Screen rectangle of a media node, or `None` before its size is usable.
pub(in crate::app) fn media_rect(scene: &SceneState, index: usize) -> Option<Rect> {
    let node = scene.nodes.get(index)?;
    let NodeKind::Media {
        scale,
        display_size,
        source,
        ..
    } = &node.kind
    else {
        return None;
    };

    let fallback = Vec2::splat(scene.config.media.size);
    let base = match source.kind {
        crate::content::MediaKind::Image => (*display_size)?,
        _ => display_size.unwrap_or(fallback),
    };
    Some(Rect::from_center_size(screen_pos(scene, index), base * *scale))
}

/// Screen rectangle of a text node once its box has been measured.
pub(in crate::app) fn text_rect(scene: &SceneState, index: usize) -> Option<Rect> {
    let node = scene.nodes.get(index)?;
    let text = node.text()?;
    let size = text.box_size?;
    let pos = screen_pos(scene, index).to_vec2();
    let origin = box_origin(text.anchor, pos, size);
    Some(Rect::from_min_size(origin.to_pos2(), size))
}

#[cfg(test)]
mod tests {
    use super::super::super::scene::tests::{child, test_scene};
    use super::super::super::text_layout::tests::Monospace;
    use super::*;

    #[test]
    fn focus_mode_anchors_focused_main_and_children() {
        let mut scene = test_scene();
        let child_index = scene.push(vec2(800.0, 300.0), child("visuals", Some(MainKey::Projects)));
        scene.mode = Mode::Focus;
        scene.focus_key = Some(MainKey::Projects);
        scene.camera.offset_x = -40.0;

        assert_eq!(screen_x(&scene, 1), scene.nodes[1].pos.x);
        assert_eq!(screen_x(&scene, child_index), 800.0);
        assert_eq!(screen_x(&scene, 0), scene.nodes[0].pos.x - 40.0);
    }

    #[test]
    fn dim_alpha_follows_mode() {
        let mut scene = test_scene();
        scene.mode = Mode::Focus;
        scene.focus_key = Some(MainKey::Contacts);
        assert_eq!(node_alpha(&scene, 2), 1.0);
        assert_eq!(node_alpha(&scene, 0), scene.config.main.dim_alpha);

        scene.mode = Mode::Project;
        assert_eq!(node_alpha(&scene, 0), scene.config.project.dim_alpha);
        assert_eq!(node_alpha(&scene, 1), 1.0);
    }

    #[test]
    fn project_dimming_reads_the_configured_alpha() {
        let mut scene = test_scene();
        scene.config.project.dim_alpha = 0.5;
        scene.mode = Mode::Project;
        scene.selected_category = None;
        scene.selected_project = None;

        assert_eq!(node_alpha(&scene, 0), 0.5);
        assert_eq!(node_alpha(&scene, 2), 0.5);
        assert_eq!(node_alpha(&scene, 1), 1.0);
    }

    #[test]
    fn shrink_tracks_depth_progress() {
        let mut scene = test_scene();
        scene.mode = Mode::Focus;
        scene.focus_key = Some(MainKey::Projects);
        scene.camera.depth = 0.0;
        assert_eq!(font_size(&scene, 0), scene.config.fonts.main);

        scene.camera.depth = 1.0;
        let shrunk = scene.config.fonts.main * scene.config.main.shrink_scale;
        assert!((font_size(&scene, 0) - shrunk).abs() < 1e-4);
        assert_eq!(font_size(&scene, 1), scene.config.fonts.main);
    }

    #[test]
    fn about_box_sorts_above_everything() {
        let mut scene = test_scene();
        scene.push(
            vec2(10.0, 10.0),
            NodeKind::AboutDescription(super::super::super::scene::TextNode::new(
                "x".to_owned(),
                crate::config::AnchorPoint::Center,
                Some(0),
            )),
        );
        scene.push(vec2(10.0, 10.0), child("a", None));

        let order = draw_order(&scene);
        assert_eq!(order.last(), Some(&3));
        assert_eq!(order.first(), Some(&4));
    }

    #[test]
    fn plain_bounds_cover_marker_and_label() {
        let scene = test_scene();
        let geometry = plain_geometry(&scene, 1, &Monospace).unwrap();
        let label_width = "PROJECTS".len() as f32 * geometry.font_size * 0.5;
        assert!(geometry.bounds.contains(geometry.marker.center()));
        assert!(
            (geometry.bounds.width()
                - (geometry.marker.width() + scene.config.rect.label_gap + label_width))
                .abs()
                < 1e-3
        );
    }
}
