use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};
use rand::rngs::StdRng;

use super::super::scene::{Bounds, Mode, Node, NodeKind, clamp_soft};
use crate::config::{EngineConfig, SpawnRect};
use crate::util::between;

pub(super) struct TargetContext<'a> {
    pub(super) mode: Mode,
    pub(super) selected_category: Option<usize>,
    pub(super) selected_project: Option<usize>,
    pub(super) main_anchors: &'a [Vec2; 3],
    pub(super) canvas: Vec2,
    pub(super) bounds: Bounds,
    pub(super) media_area: SpawnRect,
    pub(super) config: &'a EngineConfig,
}

/// Picks the next wander destination for `nodes[index]`. `None` keeps the
/// current target.
pub(super) fn pick_target(
    nodes: &[Node],
    index: usize,
    context: &TargetContext<'_>,
    rng: &mut StdRng,
) -> Option<Vec2> {
    let node = &nodes[index];
    let config = context.config;

    match &node.kind {
        NodeKind::Main { key } => {
            let anchor = context.main_anchors[key.index()];
            let angle = between(rng, 0.0, TAU);
            let radius = config.main.wander_radius * between(rng, 0.4, 1.0);
            Some(context.bounds.clamp_inside(anchor + polar(angle, radius)))
        }
        NodeKind::Child {
            parent: Some(parent),
            ..
        } => {
            let anchor = nodes.get(parent.index())?.pos;
            let sector = Sector {
                anchor,
                radius: config.child.min_distance.max(config.child.wander_radius),
                half_angle: config.child.sector_half_angle,
                x_offset: config.child.x_offset,
                separation: config.child.separation,
            };
            Some(spread_target(nodes, index, &sector, context, rng, |kind| {
                matches!(kind, NodeKind::Child { .. })
            }))
        }
        NodeKind::Grandchild { .. } => {
            let Some(anchor) = context
                .selected_category
                .and_then(|category| nodes.get(category))
                .map(|category| category.pos)
            else {
                return Some(context.bounds.random_point(rng));
            };
            let sector = Sector {
                anchor,
                radius: config.grandchild.wander_radius,
                half_angle: config.grandchild.sector_half_angle,
                x_offset: config.grandchild.x_offset,
                separation: config.grandchild.separation,
            };
            Some(spread_target(nodes, index, &sector, context, rng, |kind| {
                matches!(kind, NodeKind::Grandchild { .. })
            }))
        }
        NodeKind::Description(_) | NodeKind::AboutDescription(_) | NodeKind::TextContent(_) => {
            None
        }
        NodeKind::Media {
            scale,
            display_size,
            manually_moved,
            ..
        } if context.mode == Mode::Project && context.selected_project.is_some() => {
            let size = display_size.unwrap_or(vec2(config.media.size, config.media.size));
            let margin = size.x * scale * 0.5;

            if *manually_moved {
                let angle = between(rng, 0.0, TAU);
                let radius = between(rng, 0.0, config.media.dragged_wander_radius);
                let target = node.pos + polar(angle, radius);
                Some(vec2(
                    clamp_soft(target.x, margin, context.canvas.x - margin),
                    clamp_soft(target.y, margin, context.canvas.y - margin),
                ))
            } else {
                Some(point_in_area(context.media_area, context.canvas, margin, rng))
            }
        }
        _ => Some(context.bounds.random_point(rng)),
    }
}

/// Uniform point inside `area` (canvas fractions), inset by `margin` points.
pub(in crate::app) fn point_in_area(
    area: SpawnRect,
    canvas: Vec2,
    margin: f32,
    rng: &mut StdRng,
) -> Vec2 {
    let min_x = area.x_min * canvas.x + margin;
    let max_x = area.x_max * canvas.x - margin;
    let min_y = area.y_min * canvas.y + margin;
    let max_y = area.y_max * canvas.y - margin;
    vec2(between(rng, min_x, max_x), between(rng, min_y, max_y))
}

fn polar(angle: f32, radius: f32) -> Vec2 {
    vec2(angle.cos(), angle.sin()) * radius
}

struct Sector {
    anchor: Vec2,
    radius: f32,
    half_angle: f32,
    x_offset: f32,
    separation: f32,
}

/// Samples up to `target_attempts` points in the sector and keeps the one
/// farthest from its nearest sibling, stopping early once one clears the
/// separation distance.
fn spread_target(
    nodes: &[Node],
    index: usize,
    sector: &Sector,
    context: &TargetContext<'_>,
    rng: &mut StdRng,
    is_sibling: impl Fn(&NodeKind) -> bool,
) -> Vec2 {
    let mut best = nodes[index].target;
    let mut best_clearance = f32::NEG_INFINITY;

    for _ in 0..context.config.physics.target_attempts.max(1) {
        let angle = between(rng, -sector.half_angle, sector.half_angle);
        let candidate = context.bounds.clamp_inside(
            sector.anchor + polar(angle, sector.radius) + vec2(sector.x_offset, 0.0),
        );

        let clearance = nodes
            .iter()
            .enumerate()
            .filter(|(other_index, other)| *other_index != index && is_sibling(&other.kind))
            .map(|(_, other)| (candidate - other.pos).length())
            .fold(f32::INFINITY, f32::min);

        if clearance > best_clearance {
            best_clearance = clearance;
            best = candidate;
        }

        if clearance >= sector.separation {
            break;
        }
    }

    best
}
