use eframe::egui::Vec2;

use super::super::scene::{Mode, Node, NodeKind};
use crate::config::EngineConfig;

const MIN_DISTANCE: f32 = 0.0001;

#[derive(Clone, Copy)]
pub(super) struct Separation {
    pub(super) distance: f32,
    pub(super) strength: f32,
}

/// Soft-core push of `point` away from `other`: linear in the overlap and
/// zero at or beyond `separation.distance`.
pub(super) fn soft_repulsion(point: Vec2, other: Vec2, separation: Separation) -> Vec2 {
    let delta = point - other;
    let distance = delta.length().max(MIN_DISTANCE);
    if distance >= separation.distance {
        return Vec2::ZERO;
    }

    (delta / distance) * ((separation.distance - distance) * separation.strength)
}

pub(super) fn anchor_spring(point: Vec2, anchor: Vec2, strength: f32) -> Vec2 {
    (anchor - point) * strength
}

fn sibling_repulsion(
    nodes: &[Node],
    index: usize,
    separation: Separation,
    is_sibling: impl Fn(&NodeKind) -> bool,
) -> Vec2 {
    let point = nodes[index].pos;
    nodes
        .iter()
        .enumerate()
        .filter(|(other_index, other)| *other_index != index && is_sibling(&other.kind))
        .fold(Vec2::ZERO, |force, (_, other)| {
            force + soft_repulsion(point, other.pos, separation)
        })
}

/// Velocity impulse applied to `nodes[index]` this step.
pub(super) fn node_impulse(
    nodes: &[Node],
    index: usize,
    mode: Mode,
    main_anchors: &[Vec2; 3],
    config: &EngineConfig,
) -> Vec2 {
    let node = &nodes[index];
    let mut impulse = Vec2::ZERO;

    match &node.kind {
        NodeKind::Main { key } => {
            let separation = Separation {
                distance: config.main.separation,
                strength: config.main.repulsion_strength,
            };
            impulse += anchor_spring(
                node.pos,
                main_anchors[key.index()],
                config.main.return_strength,
            );
            impulse += sibling_repulsion(nodes, index, separation, |kind| {
                matches!(kind, NodeKind::Main { .. })
            });
        }
        NodeKind::Child { .. }
            if matches!(mode, Mode::Focus | Mode::Category | Mode::Project) =>
        {
            let separation = Separation {
                distance: config.child.separation,
                strength: config.child.repulsion_strength,
            };
            impulse += sibling_repulsion(nodes, index, separation, |kind| {
                matches!(kind, NodeKind::Child { .. })
            });
        }
        NodeKind::Grandchild { .. } if matches!(mode, Mode::Category | Mode::Project) => {
            let separation = Separation {
                distance: config.grandchild.separation,
                strength: config.grandchild.repulsion_strength,
            };
            impulse += sibling_repulsion(nodes, index, separation, |kind| {
                matches!(kind, NodeKind::Grandchild { .. })
            });
        }
        NodeKind::Media { .. } if mode == Mode::Project => {
            let separation = Separation {
                distance: config.media.separation,
                strength: config.media.repulsion_strength,
            };
            impulse += sibling_repulsion(nodes, index, separation, |kind| {
                matches!(kind, NodeKind::Media { .. })
            });
        }
        _ => {}
    }

    impulse
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    const SEPARATION: Separation = Separation {
        distance: 150.0,
        strength: 0.00001,
    };

    #[test]
    fn repulsion_points_away_and_vanishes_at_threshold() {
        let force = soft_repulsion(vec2(0.0, 0.0), vec2(100.0, 0.0), SEPARATION);
        assert!(force.x < 0.0);
        assert_eq!(force.y, 0.0);
        assert!((force.x + 50.0 * 0.00001).abs() < 1e-7);

        assert_eq!(
            soft_repulsion(vec2(0.0, 0.0), vec2(150.0, 0.0), SEPARATION),
            Vec2::ZERO
        );
        assert_eq!(
            soft_repulsion(vec2(0.0, 0.0), vec2(400.0, 300.0), SEPARATION),
            Vec2::ZERO
        );
    }

    #[test]
    fn coincident_points_stay_finite() {
        let force = soft_repulsion(vec2(5.0, 5.0), vec2(5.0, 5.0), SEPARATION);
        assert!(force.x.is_finite() && force.y.is_finite());
    }

    #[test]
    fn repulsion_never_pulls_close_pairs_together() {
        for step in 1..150 {
            let distance = step as f32;
            let a = vec2(0.0, 0.0);
            let b = vec2(distance * 0.6, distance * 0.8);
            let force_a = soft_repulsion(a, b, SEPARATION);
            let force_b = soft_repulsion(b, a, SEPARATION);
            let next = ((b + force_b) - (a + force_a)).length();
            assert!(next >= (a - b).length() - 1e-4);
        }
    }
}
