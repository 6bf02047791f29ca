use eframe::egui::{Vec2, vec2};
use rand::rngs::StdRng;

use crate::config::{AnchorPoint, BoundsConfig, EngineConfig, SpawnLayout};
use crate::content::{MediaKind, MediaRecord};
use crate::util::{between, jitter, lerp};

pub(in crate::app) const FROZEN_TIMER: f32 = 1e9;
const FROZEN_THRESHOLD: f32 = 1e8;
pub(in crate::app) const RESUME_TIMER: f32 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MainKey {
    About,
    Projects,
    Contacts,
}

impl MainKey {
    pub const ALL: [MainKey; 3] = [MainKey::About, MainKey::Projects, MainKey::Contacts];

    pub fn index(self) -> usize {
        match self {
            MainKey::About => 0,
            MainKey::Projects => 1,
            MainKey::Contacts => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MainKey::About => "ABOUT",
            MainKey::Projects => "PROJECTS",
            MainKey::Contacts => "CONTACTS",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Home,
    Focus,
    Category,
    Project,
    Content,
}

/// What a media node shows. `natural_size` comes from record metadata when
/// the content file carries it.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaSource {
    pub kind: MediaKind,
    pub src: String,
    pub alt: String,
    pub natural_size: Option<Vec2>,
}

impl MediaSource {
    pub fn from_record(record: &MediaRecord) -> Self {
        let natural_size = match (record.width, record.height) {
            (Some(width), Some(height)) if width > 0.0 && height > 0.0 => {
                Some(vec2(width, height))
            }
            _ => None,
        };

        Self {
            kind: record.kind.unwrap_or(MediaKind::Other),
            src: record.src.clone(),
            alt: record.alt.clone(),
            natural_size,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextNode {
    pub text: String,
    pub anchor: AnchorPoint,
    pub owner: Option<usize>,
    pub box_size: Option<Vec2>,
}

impl TextNode {
    pub fn new(text: String, anchor: AnchorPoint, owner: Option<usize>) -> Self {
        Self {
            text,
            anchor,
            owner,
            box_size: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Main {
        key: MainKey,
    },
    Child {
        label: String,
        label_raw: String,
        hash: String,
        parent: Option<MainKey>,
        url: Option<String>,
    },
    Grandchild {
        label: String,
        hash: String,
        parent_index: Option<usize>,
        category: String,
        slug: String,
    },
    Media {
        source: MediaSource,
        project_index: Option<usize>,
        media_index: usize,
        scale: f32,
        z_index: i32,
        display_size: Option<Vec2>,
        manually_moved: bool,
    },
    Description(TextNode),
    AboutDescription(TextNode),
    TextContent(TextNode),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub target: Vec2,
    pub target_timer: f32,
    pub kind: NodeKind,
}

impl Node {
    fn new(id: NodeId, pos: Vec2, kind: NodeKind) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            target: pos,
            target_timer: 0.0,
            kind,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.target_timer > FROZEN_THRESHOLD
    }

    pub fn freeze(&mut self) {
        self.vel = Vec2::ZERO;
        self.target = self.pos;
        self.target_timer = FROZEN_TIMER;
    }

    pub fn rearm(&mut self, timer: f32) {
        self.target_timer = timer;
    }

    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Main { key } => Some(key.label()),
            NodeKind::Child { label, .. } | NodeKind::Grandchild { label, .. } => Some(label),
            _ => None,
        }
    }

    pub fn is_main(&self) -> bool {
        matches!(self.kind, NodeKind::Main { .. })
    }

    pub fn text(&self) -> Option<&TextNode> {
        match &self.kind {
            NodeKind::Description(text)
            | NodeKind::AboutDescription(text)
            | NodeKind::TextContent(text) => Some(text),
            _ => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut TextNode> {
        match &mut self.kind {
            NodeKind::Description(text)
            | NodeKind::AboutDescription(text)
            | NodeKind::TextContent(text) => Some(text),
            _ => None,
        }
    }

    /// Index of the node this one hangs off, for kinds that track it by index.
    pub fn owner_index(&self) -> Option<usize> {
        match &self.kind {
            NodeKind::Grandchild { parent_index, .. } => *parent_index,
            NodeKind::Media { project_index, .. } => *project_index,
            NodeKind::Description(text)
            | NodeKind::AboutDescription(text)
            | NodeKind::TextContent(text) => text.owner,
            _ => None,
        }
    }

    fn owner_index_mut(&mut self) -> Option<&mut Option<usize>> {
        match &mut self.kind {
            NodeKind::Grandchild { parent_index, .. } => Some(parent_index),
            NodeKind::Media { project_index, .. } => Some(project_index),
            NodeKind::Description(text)
            | NodeKind::AboutDescription(text)
            | NodeKind::TextContent(text) => Some(&mut text.owner),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    inset: f32,
}

impl Bounds {
    pub fn for_canvas(canvas: Vec2, config: &BoundsConfig) -> Self {
        let x_pad = canvas.x * config.x_pad;
        let y_pad = canvas.y * config.y_pad;
        Self {
            left: x_pad,
            right: canvas.x - x_pad,
            top: y_pad,
            bottom: canvas.y - y_pad,
            inset: config.clamp_inset,
        }
    }

    pub fn center(&self) -> Vec2 {
        vec2(
            (self.left + self.right) * 0.5,
            (self.top + self.bottom) * 0.5,
        )
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn clamp_inside(&self, point: Vec2) -> Vec2 {
        vec2(
            clamp_soft(point.x, self.left + self.inset, self.right - self.inset),
            clamp_soft(point.y, self.top + self.inset, self.bottom - self.inset),
        )
    }

    pub fn random_point(&self, rng: &mut StdRng) -> Vec2 {
        vec2(
            lerp(self.left, self.right, between(rng, 0.0, 1.0)),
            lerp(self.top, self.bottom, between(rng, 0.0, 1.0)),
        )
    }
}

/// Clamp that tolerates an inverted range by preferring the lower bound.
pub(in crate::app) fn clamp_soft(value: f32, low: f32, high: f32) -> f32 {
    value.min(high).max(low)
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Camera {
    pub depth: f32,
    pub depth_target: f32,
    pub offset_x: f32,
    pub target_offset_x: f32,
}

impl Camera {
    pub fn ease(&mut self, canvas_width: f32, shift_per_depth: f32, ease: f32) {
        self.depth += (self.depth_target - self.depth) * ease;
        self.target_offset_x = -canvas_width * shift_per_depth * self.depth;
        self.offset_x += (self.target_offset_x - self.offset_x) * ease;
    }

    pub fn snap_home(&mut self) {
        *self = Self::default();
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
    pub index: usize,
    pub offset: Vec2,
}

pub struct SceneState {
    pub nodes: Vec<Node>,
    pub mode: Mode,
    pub focus_key: Option<MainKey>,
    pub selected_category: Option<usize>,
    pub selected_project: Option<usize>,
    pub selected_content: Option<usize>,
    pub main_anchors: [Vec2; 3],
    pub camera: Camera,
    pub canvas: Vec2,
    pub generation: u64,
    pub hovered: Option<usize>,
    pub drag: Option<DragState>,
    pub released_media: Vec<NodeId>,
    pub rng: StdRng,
    pub config: EngineConfig,
    next_id: u64,
}

impl SceneState {
    pub fn new(canvas: Vec2, config: EngineConfig, rng: StdRng) -> Self {
        let mut scene = Self {
            nodes: Vec::new(),
            mode: Mode::Home,
            focus_key: None,
            selected_category: None,
            selected_project: None,
            selected_content: None,
            main_anchors: [Vec2::ZERO; 3],
            camera: Camera::default(),
            canvas,
            generation: 0,
            hovered: None,
            drag: None,
            released_media: Vec::new(),
            rng,
            config,
            next_id: 0,
        };
        scene.main_anchors = compute_main_anchors(scene.bounds());

        let wander = scene.config.main.wander_radius;
        for key in MainKey::ALL {
            let anchor = scene.main_anchors[key.index()];
            let offset = vec2(
                jitter(&mut scene.rng, wander * 0.15),
                jitter(&mut scene.rng, wander * 0.15),
            );
            let pos = anchor + offset;
            let sign = if key.index() % 2 == 0 { 1.0 } else { -1.0 };
            let speed = vec2(
                between(&mut scene.rng, 0.06, 0.18),
                between(&mut scene.rng, 0.06, 0.18),
            );

            let index = scene.push(pos, NodeKind::Main { key });
            scene.nodes[index].vel = vec2(speed.x * sign, -speed.y * sign);
        }

        scene
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::for_canvas(self.canvas, &self.config.bounds)
    }

    pub fn spawn_layout(&self) -> SpawnLayout {
        SpawnLayout::for_width(self.canvas.x, &self.config)
    }

    /// Positions already in flight are left alone; only anchors and future
    /// targets follow the new size.
    pub fn resize(&mut self, canvas: Vec2) {
        self.canvas = canvas;
        self.main_anchors = compute_main_anchors(self.bounds());
    }

    pub fn push(&mut self, pos: Vec2, kind: NodeKind) -> usize {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.push(Node::new(id, pos, kind));
        self.nodes.len() - 1
    }

    pub fn node(&self, index: Option<usize>) -> Option<&Node> {
        index.and_then(|index| self.nodes.get(index))
    }

    pub fn count_where(&self, predicate: impl Fn(&Node) -> bool) -> usize {
        self.nodes.iter().filter(|node| predicate(node)).count()
    }

    pub fn freeze_where(&mut self, predicate: impl Fn(&Node) -> bool) {
        for node in self.nodes.iter_mut().filter(|node| predicate(node)) {
            node.freeze();
        }
    }

    pub fn rearm_where(&mut self, timer: f32, predicate: impl Fn(&Node) -> bool) {
        for node in self.nodes.iter_mut().filter(|node| predicate(node)) {
            node.rearm(timer);
        }
    }

    /// Removes every non-main node matching `predicate` and rewrites all
    /// index references. References to removed nodes become `None`.
    pub fn remove_where(&mut self, predicate: impl Fn(&Node) -> bool) {
        let mut remap = Vec::with_capacity(self.nodes.len());
        let mut next = 0usize;
        for node in &self.nodes {
            if !node.is_main() && predicate(node) {
                remap.push(None);
            } else {
                remap.push(Some(next));
                next += 1;
            }
        }

        if next == self.nodes.len() {
            return;
        }

        let old_nodes = std::mem::take(&mut self.nodes);
        for (node, slot) in old_nodes.into_iter().zip(&remap) {
            if slot.is_some() {
                self.nodes.push(node);
            } else if matches!(node.kind, NodeKind::Media { .. }) {
                self.released_media.push(node.id);
            }
        }

        let map = |index: Option<usize>| index.and_then(|index| remap.get(index).copied().flatten());
        for node in &mut self.nodes {
            if let Some(owner) = node.owner_index_mut() {
                *owner = map(*owner);
            }
        }

        self.selected_category = map(self.selected_category);
        self.selected_project = map(self.selected_project);
        self.selected_content = map(self.selected_content);
        self.hovered = map(self.hovered);
        self.drag = self.drag.and_then(|drag| {
            map(Some(drag.index)).map(|index| DragState { index, ..drag })
        });
    }

    pub fn truncate_to_mains(&mut self) {
        self.remove_where(|_| true);
    }

    pub fn set_natural_size(&mut self, id: NodeId, natural: Vec2) {
        let size = self.config.media.size;
        for node in &mut self.nodes {
            if node.id != id {
                continue;
            }
            if let NodeKind::Media { display_size, .. } = &mut node.kind {
                *display_size = Some(fit_long_edge(natural, size));
            }
        }
    }

    pub fn take_released_media(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.released_media)
    }
}

fn compute_main_anchors(bounds: Bounds) -> [Vec2; 3] {
    let center = bounds.center();
    let radius = bounds.width().min(bounds.height()) * 0.35;
    let angles = [
        -std::f32::consts::FRAC_PI_2,
        3.0 * std::f32::consts::FRAC_PI_4,
        -std::f32::consts::FRAC_PI_6,
    ];
    angles.map(|angle| center + vec2(angle.cos(), angle.sin()) * radius)
}

/// Scales `natural` so its longer edge equals `size`.
pub(in crate::app) fn fit_long_edge(natural: Vec2, size: f32) -> Vec2 {
    if natural.x <= 0.0 || natural.y <= 0.0 {
        return vec2(size, size);
    }

    let aspect = natural.x / natural.y;
    if aspect > 1.0 {
        vec2(size, size / aspect)
    } else {
        vec2(size * aspect, size)
    }
}

#[cfg(test)]
pub(in crate::app) mod tests {
    use rand::SeedableRng;

    use super::*;

    pub(in crate::app) fn test_scene() -> SceneState {
        SceneState::new(
            vec2(1440.0, 920.0),
            EngineConfig::default(),
            StdRng::seed_from_u64(42),
        )
    }

    pub(in crate::app) fn child(label: &str, parent: Option<MainKey>) -> NodeKind {
        NodeKind::Child {
            label: label.to_uppercase(),
            label_raw: label.to_string(),
            hash: format!("#/projects/{label}"),
            parent,
            url: None,
        }
    }

    pub(in crate::app) fn media(project_index: usize) -> NodeKind {
        NodeKind::Media {
            source: MediaSource {
                kind: MediaKind::Image,
                src: "a.png".to_string(),
                alt: String::new(),
                natural_size: None,
            },
            project_index: Some(project_index),
            media_index: 0,
            scale: 1.0,
            z_index: 0,
            display_size: None,
            manually_moved: false,
        }
    }

    #[test]
    fn new_scene_has_three_mains_in_label_order() {
        let scene = test_scene();
        let labels: Vec<_> = scene.nodes.iter().filter_map(Node::label).collect();
        assert_eq!(labels, vec!["ABOUT", "PROJECTS", "CONTACTS"]);
        for node in &scene.nodes {
            assert_eq!(node.target, node.pos);
        }
    }

    #[test]
    fn remove_where_remaps_and_invalidates_references() {
        let mut scene = test_scene();
        let first = scene.push(vec2(10.0, 10.0), child("a", Some(MainKey::Projects)));
        let second = scene.push(vec2(20.0, 20.0), child("b", Some(MainKey::Projects)));
        let media_index = scene.push(vec2(30.0, 30.0), media(second));
        let media_id = scene.nodes[media_index].id;
        scene.selected_category = Some(second);
        scene.selected_project = Some(first);

        scene.remove_where(|node| node.label() == Some("A"));

        assert_eq!(scene.nodes.len(), 5);
        assert_eq!(scene.selected_category, Some(3));
        assert_eq!(scene.selected_project, None);
        assert_eq!(scene.nodes[4].owner_index(), Some(3));
        assert!(scene.released_media.is_empty());

        scene.truncate_to_mains();
        assert_eq!(scene.nodes.len(), 3);
        assert_eq!(scene.selected_category, None);
        assert_eq!(scene.take_released_media(), vec![media_id]);
    }

    #[test]
    fn natural_sizes_fit_the_long_edge() {
        assert_eq!(fit_long_edge(vec2(800.0, 400.0), 300.0), vec2(300.0, 150.0));
        assert_eq!(fit_long_edge(vec2(400.0, 800.0), 300.0), vec2(150.0, 300.0));
        assert_eq!(fit_long_edge(Vec2::ZERO, 300.0), vec2(300.0, 300.0));
    }

    #[test]
    fn resize_moves_anchors_but_not_nodes() {
        let mut scene = test_scene();
        let before: Vec<_> = scene.nodes.iter().map(|node| node.pos).collect();
        let anchors = scene.main_anchors;

        scene.resize(vec2(700.0, 500.0));

        let after: Vec<_> = scene.nodes.iter().map(|node| node.pos).collect();
        assert_eq!(before, after);
        assert_ne!(anchors, scene.main_anchors);
    }
}
