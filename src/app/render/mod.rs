mod paint;
pub(in crate::app) mod style;

use eframe::egui::{Pos2, Rect};

use super::scene::{MainKey, Mode, NodeId, NodeKind, SceneState};
use super::text_layout::{TextBlockLayout, TextMeasure, TextStyle, TextToken, box_center, box_origin};
use crate::content::MediaKind;
pub(in crate::app) use paint::{BACKGROUND, FOREGROUND, paint};
use style::{PlainGeometry, draw_order, media_rect, node_alpha, plain_geometry, screen_pos};

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) enum DrawItem {
    Link {
        from: Pos2,
        to: Pos2,
        alpha: f32,
    },
    Plain {
        geometry: PlainGeometry,
        label: String,
        alpha: f32,
    },
    Text {
        origin: Pos2,
        token_lines: Vec<Vec<TextToken>>,
        style: TextStyle,
        alpha: f32,
    },
    Media {
        id: NodeId,
        rect: Rect,
        alpha: f32,
        z_index: i32,
        placeholder: bool,
    },
    HiddenMedia {
        id: NodeId,
    },
}

/// Everything one frame draws, bottom to top, in canvas coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub(in crate::app) struct FramePlan {
    pub(in crate::app) items: Vec<DrawItem>,
    pub(in crate::app) line_width: f32,
    pub(in crate::app) border_width: f32,
}

impl FramePlan {
    pub(in crate::app) fn count_where(&self, predicate: impl Fn(&DrawItem) -> bool) -> usize {
        self.items.iter().filter(|item| predicate(item)).count()
    }
}

fn text_style(scene: &SceneState, kind: &NodeKind) -> Option<TextStyle> {
    let width = scene.canvas.x;
    match kind {
        NodeKind::Description(_) => Some(TextStyle::description(&scene.config.description, width)),
        NodeKind::AboutDescription(_) => Some(TextStyle::block(&scene.config.about, width)),
        NodeKind::TextContent(_) => Some(TextStyle::block(&scene.config.text, width)),
        _ => None,
    }
}

struct MeasuredText {
    layout: TextBlockLayout,
    style: TextStyle,
    first_frame: bool,
}

/// Lays out text nodes, refreshing their cached box sizes, then orders the
/// frame's draw items for the current mode.
pub(in crate::app) fn compose(scene: &mut SceneState, measure: &dyn TextMeasure) -> FramePlan {
    let mut measured = Vec::with_capacity(scene.nodes.len());
    for index in 0..scene.nodes.len() {
        let Some(style) = text_style(scene, &scene.nodes[index].kind) else {
            measured.push(None);
            continue;
        };
        let Some(text) = scene.nodes[index].text_mut() else {
            measured.push(None);
            continue;
        };

        let layout = TextBlockLayout::compute(measure, &text.text, &style);
        let first_frame = text.box_size.is_none();
        if text.box_size.map(|size| size.x) != Some(layout.size.x) {
            text.box_size = Some(layout.size);
        }
        measured.push(Some(MeasuredText {
            layout,
            style,
            first_frame,
        }));
    }

    let scene: &SceneState = scene;
    let mut composer = Composer {
        scene,
        measure,
        measured,
        plan: FramePlan {
            items: Vec::new(),
            line_width: scene.config.rect.line_width,
            border_width: scene.config.media.border_width,
        },
    };

    match scene.mode {
        Mode::Home => {
            composer.main_links(1.0);
            composer.all_nodes();
        }
        Mode::Focus => {
            composer.main_links(scene.config.main.dim_alpha);
            composer.focus_links();
            composer.all_nodes();
        }
        Mode::Content => {
            composer.main_links(scene.config.main.dim_alpha);
            composer.content_links();
            composer.all_nodes();
        }
        Mode::Category => composer.category_layers(),
        Mode::Project => composer.project_layers(),
    }

    composer.plan
}

struct Composer<'a> {
    scene: &'a SceneState,
    measure: &'a dyn TextMeasure,
    measured: Vec<Option<MeasuredText>>,
    plan: FramePlan,
}

impl Composer<'_> {
    fn link_to(&mut self, from: usize, to: Pos2, alpha: f32) {
        self.plan.items.push(DrawItem::Link {
            from: screen_pos(self.scene, from),
            to,
            alpha,
        });
    }

    fn link(&mut self, from: usize, to: usize, alpha: f32) {
        let to = screen_pos(self.scene, to);
        self.link_to(from, to, alpha);
    }

    fn main_links(&mut self, alpha: f32) {
        for (from, to) in [(0, 1), (0, 2), (1, 2)] {
            self.link(from, to, alpha);
        }
    }

    fn indices_where(&self, predicate: impl Fn(usize, &NodeKind) -> bool) -> Vec<usize> {
        self.scene
            .nodes
            .iter()
            .enumerate()
            .filter(|(index, node)| predicate(*index, &node.kind))
            .map(|(index, _)| index)
            .collect()
    }

    fn focus_links(&mut self) {
        let focus = self.scene.focus_key;
        for index in self.indices_where(|_, kind| matches!(kind, NodeKind::Child { .. })) {
            let parent = match &self.scene.nodes[index].kind {
                NodeKind::Child { parent, .. } => parent.or(focus),
                _ => None,
            };
            if let Some(parent) = parent {
                self.link(parent.index(), index, 1.0);
            }
        }
    }

    fn content_links(&mut self) {
        let Some(selected) = self.scene.selected_content else {
            return;
        };

        for index in self.indices_where(|_, kind| matches!(kind, NodeKind::TextContent(_))) {
            if self.scene.nodes[index].owner_index() == Some(selected) {
                self.link(selected, index, 1.0);
            }
        }

        if self.scene.focus_key != Some(MainKey::About) {
            return;
        }
        for index in self.indices_where(|_, kind| matches!(kind, NodeKind::AboutDescription(_))) {
            let node = &self.scene.nodes[index];
            let measured = node.text().is_some_and(|text| text.box_size.is_some());
            if node.owner_index() == Some(selected) && measured {
                let to = screen_pos(self.scene, index);
                self.link_to(selected, to, 1.0);
            }
        }
    }

    fn all_nodes(&mut self) {
        for index in draw_order(self.scene) {
            let alpha = node_alpha(self.scene, index);
            self.node(index, alpha);
        }
    }

    fn category_layers(&mut self) {
        let scene = self.scene;
        let dim = scene.config.main.dim_alpha;
        let projects = MainKey::Projects.index();
        let selected = scene.selected_category;
        let children = self.indices_where(|_, kind| matches!(kind, NodeKind::Child { .. }));
        let grandchildren =
            self.indices_where(|_, kind| matches!(kind, NodeKind::Grandchild { .. }));

        self.main_links(dim);
        for &index in &children {
            let alpha = if Some(index) == selected { 1.0 } else { dim };
            self.link(projects, index, alpha);
        }

        for index in 0..3 {
            self.node(index, node_alpha(scene, index));
        }
        for &index in &children {
            self.node(index, node_alpha(scene, index));
        }

        if let Some(category) = selected {
            for &index in &grandchildren {
                if scene.nodes[index].owner_index() == Some(category) {
                    self.link(category, index, 1.0);
                }
            }
        }
        for &index in &grandchildren {
            self.node(index, node_alpha(scene, index));
        }
    }

    fn project_layers(&mut self) {
        let scene = self.scene;
        let projects = MainKey::Projects.index();
        let category = scene.selected_category;
        let project = scene.selected_project;
        let dim = scene.config.project.dim_alpha;
        let children = self.indices_where(|_, kind| matches!(kind, NodeKind::Child { .. }));
        let grandchildren =
            self.indices_where(|_, kind| matches!(kind, NodeKind::Grandchild { .. }));

        self.main_links(dim);
        for &index in children.iter().filter(|&&index| Some(index) != category) {
            self.link(projects, index, dim);
        }
        if let Some(category) = category {
            for &index in &grandchildren {
                let owned = scene.nodes[index].owner_index() == Some(category);
                if owned && Some(index) != project {
                    self.link(category, index, dim);
                }
            }
        }

        for index in (0..3).filter(|&index| index != projects) {
            self.node(index, node_alpha(scene, index));
        }
        for &index in children.iter().filter(|&&index| Some(index) != category) {
            self.node(index, node_alpha(scene, index));
        }
        for &index in grandchildren.iter().filter(|&&index| Some(index) != project) {
            self.node(index, node_alpha(scene, index));
        }

        if let Some(category) = category {
            self.link(projects, category, 1.0);
            if let Some(project) = project {
                self.link(category, project, 1.0);
            }
        }
        self.node(projects, node_alpha(scene, projects));
        for index in [category, project].into_iter().flatten() {
            self.node(index, node_alpha(scene, index));
        }

        let content = self.indices_where(|_, kind| {
            matches!(kind, NodeKind::Media { .. } | NodeKind::Description(_))
        });
        if let Some(project) = project {
            for &index in &content {
                let node = &scene.nodes[index];
                if node.owner_index() != Some(project) {
                    continue;
                }
                let to = match node.text() {
                    Some(text) => match text.box_size {
                        Some(size) => {
                            box_center(text.anchor, screen_pos(scene, index).to_vec2(), size)
                                .to_pos2()
                        }
                        None => continue,
                    },
                    None => screen_pos(scene, index),
                };
                self.link_to(project, to, 1.0);
            }
        }

        for &index in &content {
            if matches!(scene.nodes[index].kind, NodeKind::Description(_)) {
                self.node(index, node_alpha(scene, index));
            }
        }
        for index in draw_order(scene) {
            if matches!(scene.nodes[index].kind, NodeKind::Media { .. }) {
                self.node(index, node_alpha(scene, index));
            }
        }
    }

    fn node(&mut self, index: usize, alpha: f32) {
        let scene = self.scene;
        let Some(node) = scene.nodes.get(index) else {
            return;
        };

        match &node.kind {
            NodeKind::Main { .. } | NodeKind::Child { .. } | NodeKind::Grandchild { .. } => {
                if let (Some(geometry), Some(label)) =
                    (plain_geometry(scene, index, self.measure), node.label())
                {
                    self.plan.items.push(DrawItem::Plain {
                        geometry,
                        label: label.to_owned(),
                        alpha,
                    });
                }
            }
            NodeKind::Description(text)
            | NodeKind::AboutDescription(text)
            | NodeKind::TextContent(text) => {
                let Some(measured) = self.measured.get(index).and_then(Option::as_ref) else {
                    return;
                };
                if measured.first_frame || measured.layout.lines.iter().all(String::is_empty) {
                    return;
                }
                let size = text.box_size.unwrap_or(measured.layout.size);
                let origin = box_origin(text.anchor, screen_pos(scene, index).to_vec2(), size);
                self.plan.items.push(DrawItem::Text {
                    origin: origin.to_pos2(),
                    token_lines: measured.layout.token_lines.clone(),
                    style: measured.style,
                    alpha,
                });
            }
            NodeKind::Media {
                source, z_index, ..
            } => match media_rect(scene, index) {
                Some(rect) => self.plan.items.push(DrawItem::Media {
                    id: node.id,
                    rect,
                    alpha,
                    z_index: *z_index,
                    placeholder: source.kind != MediaKind::Image,
                }),
                None => self.plan.items.push(DrawItem::HiddenMedia { id: node.id }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::super::scene::TextNode;
    use super::super::scene::tests::{child, media, test_scene};
    use super::super::text_layout::tests::Monospace;
    use super::*;
    use crate::config::AnchorPoint;

    fn is_link(item: &DrawItem) -> bool {
        matches!(item, DrawItem::Link { .. })
    }

    #[test]
    fn home_draws_three_links_then_three_nodes() {
        let mut scene = test_scene();
        let plan = compose(&mut scene, &Monospace);
        assert_eq!(plan.items.len(), 6);
        assert!(plan.items[..3].iter().all(is_link));
        assert_eq!(plan.count_where(|item| matches!(item, DrawItem::Plain { .. })), 3);
    }

    #[test]
    fn text_nodes_skip_their_first_frame() {
        let mut scene = test_scene();
        scene.mode = Mode::Content;
        scene.focus_key = Some(MainKey::About);
        scene.selected_content = Some(0);
        scene.push(
            vec2(720.0, 460.0),
            NodeKind::AboutDescription(TextNode::new(
                "hello ==there==".to_owned(),
                AnchorPoint::Center,
                Some(0),
            )),
        );
        let is_text = |item: &DrawItem| matches!(item, DrawItem::Text { .. });

        let first = compose(&mut scene, &Monospace);
        assert_eq!(first.count_where(is_text), 0);
        assert!(scene.nodes[3].text().unwrap().box_size.is_some());

        let second = compose(&mut scene, &Monospace);
        assert_eq!(second.count_where(is_text), 1);
        assert_eq!(second.count_where(is_link), 4);
        assert!(matches!(second.items.last(), Some(DrawItem::Text { .. })));
    }

    #[test]
    fn blank_text_is_never_drawn() {
        let mut scene = test_scene();
        scene.push(
            vec2(400.0, 300.0),
            NodeKind::TextContent(TextNode::new(" \n ".to_owned(), AnchorPoint::TopLeft, Some(0))),
        );
        let is_text = |item: &DrawItem| matches!(item, DrawItem::Text { .. });

        compose(&mut scene, &Monospace);
        let plan = compose(&mut scene, &Monospace);
        assert_eq!(plan.count_where(is_text), 0);
    }

    #[test]
    fn project_mode_draws_active_path_after_dim_nodes() {
        let mut scene = test_scene();
        let category = scene.push(vec2(900.0, 300.0), child("visuals", Some(MainKey::Projects)));
        scene.push(vec2(900.0, 500.0), child("algolab", Some(MainKey::Projects)));
        let project = scene.push(
            vec2(1000.0, 300.0),
            NodeKind::Grandchild {
                label: "DRIFT".to_owned(),
                hash: "#/projects/visuals/drift".to_owned(),
                parent_index: Some(category),
                category: "visuals".to_owned(),
                slug: "drift".to_owned(),
            },
        );
        scene.push(vec2(800.0, 400.0), media(project));
        scene.config.project.dim_alpha = 0.25;
        scene.mode = Mode::Project;
        scene.focus_key = Some(MainKey::Projects);
        scene.selected_category = Some(category);
        scene.selected_project = Some(project);

        let plan = compose(&mut scene, &Monospace);
        let labels: Vec<(&str, f32)> = plan
            .items
            .iter()
            .filter_map(|item| match item {
                DrawItem::Plain { label, alpha, .. } => Some((label.as_str(), *alpha)),
                _ => None,
            })
            .collect();

        assert_eq!(labels.len(), 6);
        assert_eq!(labels[3], ("PROJECTS", 1.0));
        assert_eq!(labels[4], ("VISUALS", 1.0));
        assert_eq!(labels[5], ("DRIFT", 1.0));
        assert!(labels[..3].iter().all(|(_, alpha)| *alpha == 0.25));
        let dim_links = plan.count_where(|item| {
            matches!(item, DrawItem::Link { alpha, .. } if *alpha == 0.25)
        });
        assert!(dim_links >= 3);
        assert!(labels[..3].iter().any(|(label, _)| *label == "ALGOLAB"));
        assert!(matches!(plan.items.last(), Some(DrawItem::HiddenMedia { .. })));
    }
}
