mod forces;
mod targets;

use eframe::egui::{Vec2, vec2};

use super::scene::{Mode, NodeKind, SceneState};
use crate::util::between;
pub(in crate::app) use targets::point_in_area;
use targets::{TargetContext, pick_target};

/// Advances the camera and every unfrozen node by `dt` seconds.
pub(in crate::app) fn advance(scene: &mut SceneState, dt: f32) {
    let dt = dt.clamp(0.0, scene.config.physics.max_step);
    let camera_config = scene.config.camera;
    scene
        .camera
        .ease(scene.canvas.x, camera_config.shift_per_depth, camera_config.ease);

    let bounds = scene.bounds();
    let layout = scene.spawn_layout();
    let SceneState {
        nodes,
        mode,
        selected_category,
        selected_project,
        main_anchors,
        canvas,
        rng,
        config,
        ..
    } = scene;
    let mode = *mode;
    let canvas = *canvas;
    let physics = config.physics;

    for index in 0..nodes.len() {
        if nodes[index].is_frozen() {
            nodes[index].vel = Vec2::ZERO;
            continue;
        }

        let impulse = forces::node_impulse(nodes, index, mode, main_anchors, config);
        nodes[index].vel += impulse;

        nodes[index].target_timer -= dt;
        if nodes[index].target_timer <= 0.0 {
            nodes[index].target_timer = between(rng, physics.retarget_min, physics.retarget_max);
            let context = TargetContext {
                mode,
                selected_category: *selected_category,
                selected_project: *selected_project,
                main_anchors,
                canvas,
                bounds,
                media_area: layout.media_area,
                config,
            };
            if let Some(target) = pick_target(nodes, index, &context, rng) {
                nodes[index].target = target;
            }
        }

        let node = &mut nodes[index];
        let speed_scale = match &node.kind {
            NodeKind::Description(_) | NodeKind::AboutDescription(_) => continue,
            NodeKind::Child { .. } => config.child.speed_scale,
            NodeKind::Grandchild { .. } => config.grandchild.speed_scale,
            NodeKind::Media { .. } => config.media.oscillation_speed,
            NodeKind::Main { .. } | NodeKind::TextContent(_) => 1.0,
        };

        let limit = physics.max_velocity * speed_scale;
        let seek = (node.target - node.pos) * physics.seek_gain;
        node.vel = vec2(
            (node.vel.x + seek.x).clamp(-limit, limit),
            (node.vel.y + seek.y).clamp(-limit, limit),
        );
        node.pos += node.vel * physics.integration_scale * dt;

        if let NodeKind::Media {
            scale,
            display_size,
            manually_moved: false,
            ..
        } = &node.kind
            && mode == Mode::Project
        {
            let size = display_size.unwrap_or(vec2(config.media.size, config.media.size));
            let margin = size * *scale * 0.5;
            let area = layout.media_area;
            reflect_into(
                &mut node.pos.x,
                &mut node.vel.x,
                area.x_min * canvas.x + margin.x,
                area.x_max * canvas.x - margin.x,
            );
            reflect_into(
                &mut node.pos.y,
                &mut node.vel.y,
                area.y_min * canvas.y + margin.y,
                area.y_max * canvas.y - margin.y,
            );
        }

        let steer = config.bounds.steer_margin;
        let nudge = physics.steer_nudge;
        if node.pos.x < bounds.left + steer {
            node.vel.x += nudge;
        }
        if node.pos.x > bounds.right - steer {
            node.vel.x -= nudge;
        }
        if node.pos.y < bounds.top + steer {
            node.vel.y += nudge;
        }
        if node.pos.y > bounds.bottom - steer {
            node.vel.y -= nudge;
        }
    }
}

/// Hard clamp into `[low, high]`, bouncing half the velocity back inward.
fn reflect_into(position: &mut f32, velocity: &mut f32, low: f32, high: f32) {
    if *position < low {
        *position = low;
        *velocity = velocity.abs() * 0.5;
    }
    if *position > high {
        *position = high;
        *velocity = -velocity.abs() * 0.5;
    }
}

#[cfg(test)]
mod tests {
    use super::super::scene::tests::{child, media, test_scene};
    use super::super::scene::{MainKey, Mode};
    use super::*;

    #[test]
    fn frozen_nodes_never_move() {
        let mut scene = test_scene();
        scene.nodes[0].freeze();
        scene.nodes[0].vel = vec2(3.0, 3.0);
        let before = scene.nodes[0].pos;

        for _ in 0..120 {
            advance(&mut scene, 0.016);
            assert_eq!(scene.nodes[0].vel, Vec2::ZERO);
        }
        assert_eq!(scene.nodes[0].pos, before);
    }

    #[test]
    fn every_frozen_node_reports_zero_velocity() {
        let mut scene = test_scene();
        scene.mode = Mode::Focus;
        for offset in 0..4 {
            scene.push(
                vec2(700.0 + offset as f32 * 5.0, 400.0),
                child("cat", Some(MainKey::Projects)),
            );
        }
        for _ in 0..30 {
            advance(&mut scene, 0.02);
        }
        scene.freeze_where(|node| node.label() == Some("CAT"));
        for node in &mut scene.nodes {
            node.vel += vec2(0.1, -0.1);
        }

        advance(&mut scene, 0.02);

        for node in scene.nodes.iter().filter(|node| node.is_frozen()) {
            assert_eq!(node.vel, Vec2::ZERO);
        }
    }

    #[test]
    fn crowded_mains_drift_apart() {
        let mut scene = test_scene();
        let placements = [vec2(600.0, 400.0), vec2(660.0, 400.0), vec2(1200.0, 700.0)];
        for (index, pos) in placements.into_iter().enumerate() {
            scene.main_anchors[index] = pos;
            let node = &mut scene.nodes[index];
            node.pos = pos;
            node.target = pos;
            node.vel = Vec2::ZERO;
            node.target_timer = 100.0;
        }
        let separation = scene.config.main.separation;
        let distance = |scene: &SceneState| (scene.nodes[0].pos - scene.nodes[1].pos).length();
        let mut before = distance(&scene);
        assert!(before < separation);

        for _ in 0..20 {
            for node in &mut scene.nodes {
                node.target = node.pos;
            }
            advance(&mut scene, 0.016);
            let after = distance(&scene);
            assert!(after >= before, "{after} < {before}");
            before = after;
        }
        assert!(before > 60.0);
    }

    #[test]
    fn oversized_steps_are_clamped() {
        let mut scene = test_scene();
        for node in &mut scene.nodes {
            node.target_timer = 100.0;
            node.vel = vec2(0.2, 0.0);
        }
        let before = scene.nodes[2].pos;

        advance(&mut scene, 10.0);

        let moved = scene.nodes[2].pos.x - before.x;
        let max_step = scene.config.physics.max_step;
        let integration = scene.config.physics.integration_scale;
        assert!(moved <= scene.config.physics.max_velocity * integration * max_step + 1e-3);
    }

    #[test]
    fn camera_eases_toward_depth_target() {
        let mut scene = test_scene();
        scene.camera.depth_target = 2.0;

        advance(&mut scene, 0.016);
        let first = scene.camera.depth;
        advance(&mut scene, 0.016);

        assert!(first > 0.0 && scene.camera.depth > first && scene.camera.depth < 2.0);
        assert!(scene.camera.offset_x < 0.0);
    }

    #[test]
    fn undragged_media_stay_inside_the_spawn_area() {
        let mut scene = test_scene();
        scene.mode = Mode::Project;
        scene.selected_project = Some(1);
        let index = scene.push(vec2(0.0, 0.0), media(1));
        scene.nodes[index].target_timer = 100.0;

        advance(&mut scene, 0.016);

        let area = scene.spawn_layout().media_area;
        let pos = scene.nodes[index].pos;
        assert!(pos.x >= area.x_min * scene.canvas.x);
        assert!(pos.y >= area.y_min * scene.canvas.y);
        assert!(scene.nodes[index].vel.x >= 0.0);
    }
}
