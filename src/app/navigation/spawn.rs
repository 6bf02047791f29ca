use eframe::egui::{Vec2, vec2};
use rand::Rng;
use rand::rngs::StdRng;

use super::super::physics::point_in_area;
use super::super::scene::{
    Bounds, MainKey, MediaSource, NodeKind, SceneState, TextNode, clamp_soft,
};
use crate::config::{AnchorPoint, MediaConfig};
use crate::content::{AboutRecord, ContactRecord, ProjectRecord};
use crate::util::{between, jitter, label_case};

/// Evenly spaced points on an arc of `±half_angle` around `anchor`.
pub(super) fn fan_positions(
    anchor: Vec2,
    count: usize,
    half_angle: f32,
    radius: f32,
    bounds: &Bounds,
) -> Vec<Vec2> {
    let step = if count > 1 {
        2.0 * half_angle / (count - 1) as f32
    } else {
        2.0 * half_angle
    };

    (0..count)
        .map(|index| {
            let angle = -half_angle + index as f32 * step;
            bounds.clamp_inside(anchor + vec2(angle.cos(), angle.sin()) * radius)
        })
        .collect()
}

/// Fewer items get bigger frames: `scale_max` at the low threshold down to
/// `scale_min` at the high one, jittered and clamped.
pub(super) fn media_scale(count: usize, config: &MediaConfig, rng: &mut StdRng) -> f32 {
    let low = config.scale_threshold_min as f32;
    let high = config.scale_threshold_max as f32;
    let t = if high > low {
        ((count as f32 - low) / (high - low)).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let base = config.scale_max - (config.scale_max - config.scale_min) * t;
    (base + jitter(rng, config.scale_variation)).clamp(config.scale_min, config.scale_max)
}

struct ChildEntry {
    label: String,
    label_raw: String,
    hash: String,
    url: Option<String>,
}

fn spawn_children(scene: &mut SceneState, key: MainKey, entries: Vec<ChildEntry>) {
    let anchor = scene.nodes[key.index()].pos;
    let child = scene.config.child;
    let positions = fan_positions(
        anchor,
        entries.len(),
        child.sector_half_angle,
        child.ring_radius,
        &scene.bounds(),
    );

    for (entry, pos) in entries.into_iter().zip(positions) {
        scene.push(
            pos,
            NodeKind::Child {
                label: entry.label,
                label_raw: entry.label_raw,
                hash: entry.hash,
                parent: Some(key),
                url: entry.url,
            },
        );
    }
}

pub(super) fn spawn_categories(scene: &mut SceneState, categories: &[String]) {
    let entries = categories
        .iter()
        .map(|category| ChildEntry {
            label: label_case(category),
            label_raw: category.clone(),
            hash: format!("#/projects/{category}"),
            url: None,
        })
        .collect();
    spawn_children(scene, MainKey::Projects, entries);
}

pub(super) fn spawn_contacts(scene: &mut SceneState, contacts: &[ContactRecord]) {
    let entries = contacts
        .iter()
        .map(|contact| ChildEntry {
            label: label_case(&contact.name),
            label_raw: contact.name.to_lowercase(),
            hash: format!("#/contacts/{}", contact.slug),
            url: contact.url.clone().filter(|url| !url.trim().is_empty()),
        })
        .collect();
    spawn_children(scene, MainKey::Contacts, entries);
}

pub(super) fn spawn_grandchildren(
    scene: &mut SceneState,
    category_index: usize,
    category: &str,
    projects: &[ProjectRecord],
) {
    let Some(anchor) = scene.nodes.get(category_index).map(|node| node.pos) else {
        return;
    };
    let radius = scene
        .config
        .child
        .min_distance
        .max(scene.config.grandchild.wander_radius);
    let positions = fan_positions(
        anchor,
        projects.len(),
        scene.config.grandchild.sector_half_angle,
        radius,
        &scene.bounds(),
    );

    for (project, pos) in projects.iter().zip(positions) {
        scene.push(
            pos,
            NodeKind::Grandchild {
                label: label_case(&project.title),
                hash: format!("#/projects/{category}/{}", project.slug),
                parent_index: Some(category_index),
                category: category.to_owned(),
                slug: project.slug.clone(),
            },
        );
    }
}

/// One description box plus one media node per usable media entry.
pub(super) fn spawn_project_content(
    scene: &mut SceneState,
    project_index: usize,
    project: &ProjectRecord,
) {
    let layout = scene.spawn_layout();
    let canvas = scene.canvas;
    let placement = layout.description;
    let margin = scene.config.description.edge_margin;

    let y = between(&mut scene.rng, placement.y_min, placement.y_max) * canvas.y;
    let pos = vec2(
        clamp_soft(placement.x_fixed * canvas.x, margin, canvas.x - margin),
        clamp_soft(y, margin, canvas.y - margin),
    );
    scene.push(
        pos,
        NodeKind::Description(TextNode::new(
            project.description.to_text(),
            placement.anchor,
            Some(project_index),
        )),
    );

    let media = project.valid_media();
    let config = scene.config.media;
    for (media_index, record) in media.iter().enumerate() {
        let scale = media_scale(media.len(), &config, &mut scene.rng);
        let z_index = scene.rng.gen_range(0..1000);
        let pos = point_in_area(
            layout.media_area,
            canvas,
            config.size * scale * 0.5,
            &mut scene.rng,
        );
        scene.push(
            pos,
            NodeKind::Media {
                source: MediaSource::from_record(record),
                project_index: Some(project_index),
                media_index,
                scale,
                z_index,
                display_size: None,
                manually_moved: false,
            },
        );
    }
}

const PLACEHOLDER_TEXT: &str = "Nothing here yet.";

/// Stand-in text hung off a main whose content could not be shown.
pub(super) fn spawn_placeholder(scene: &mut SceneState, main_index: usize) {
    let Some(anchor) = scene.nodes.get(main_index).map(|node| node.pos) else {
        return;
    };
    let pos = scene
        .bounds()
        .clamp_inside(anchor + vec2(scene.config.child.ring_radius, 0.0));
    scene.push(
        pos,
        NodeKind::TextContent(TextNode::new(
            PLACEHOLDER_TEXT.to_owned(),
            AnchorPoint::TopLeft,
            Some(main_index),
        )),
    );
}

pub(super) fn spawn_about(scene: &mut SceneState, main_index: usize, about: &AboutRecord) {
    if about.text.trim().is_empty() {
        spawn_placeholder(scene, main_index);
        return;
    }

    let center = scene.canvas * 0.5;
    let index = scene.push(
        center,
        NodeKind::AboutDescription(TextNode::new(
            about.text.clone(),
            AnchorPoint::Center,
            Some(main_index),
        )),
    );
    scene.nodes[index].freeze();
}
