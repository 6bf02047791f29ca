use eframe::egui::{Painter, Pos2, Rect, Stroke, Vec2, pos2, vec2};

use super::render::FOREGROUND;
use super::render_utils::rect_to_screen;

const BRACKET_OFFSET: f32 = 2.0;
const BRACKET_MAX_LENGTH: f32 = 8.0;
const CURSOR_LENGTH: f32 = 5.0;
const CURSOR_GAP: f32 = 1.5;
const CURSOR_SPREAD_DEGREES: f32 = 100.0;
const GROW_PER_SECOND: f32 = 8.0;

/// Receives the canvas-space rectangle of whatever the pointer is over.
pub(in crate::app) trait HoverOverlay {
    fn set_hover_box(&mut self, rect: Rect);
    fn clear_hover_box(&mut self);
}

/// Corner brackets around the hovered node, or a three-armed cursor when
/// nothing is hovered.
#[derive(Debug, Default)]
pub(in crate::app) struct BracketOverlay {
    hover: Option<Rect>,
    grow: f32,
}

impl HoverOverlay for BracketOverlay {
    fn set_hover_box(&mut self, rect: Rect) {
        if self.hover.is_none() {
            self.grow = 0.0;
        }
        self.hover = Some(rect);
    }

    fn clear_hover_box(&mut self) {
        self.hover = None;
        self.grow = 0.0;
    }
}

impl BracketOverlay {
    pub(in crate::app) fn new() -> Self {
        Self::default()
    }

    /// `pointer` is in screen space; the hover box is canvas-relative.
    pub(in crate::app) fn paint(
        &mut self,
        painter: &Painter,
        origin: Vec2,
        pointer: Option<Pos2>,
        dt: f32,
        line_width: f32,
    ) {
        let stroke = Stroke::new(line_width, FOREGROUND);

        let Some(hover) = self.hover else {
            if let Some(pointer) = pointer {
                for segment in cursor_segments(pointer) {
                    painter.line_segment(segment, stroke);
                }
            }
            return;
        };

        self.grow = (self.grow + dt * GROW_PER_SECOND).min(1.0);
        let rect = rect_to_screen(origin, hover);
        for segment in bracket_segments(rect, self.grow) {
            painter.line_segment(segment, stroke);
        }
    }
}

/// One arm straight up and two splayed downward, each starting a small gap
/// away from the pointer.
fn cursor_segments(pointer: Pos2) -> [[Pos2; 2]; 3] {
    let half_spread = (CURSOR_SPREAD_DEGREES * 0.5).to_radians();
    let arms = [
        vec2(0.0, -1.0),
        vec2(-half_spread.sin(), half_spread.cos()),
        vec2(half_spread.sin(), half_spread.cos()),
    ];
    arms.map(|arm| {
        [
            pointer + arm * CURSOR_GAP,
            pointer + arm * (CURSOR_GAP + CURSOR_LENGTH),
        ]
    })
}

/// Two strokes per corner, pushed out by the bracket offset. `grow` scales
/// the stroke length from nothing to full.
fn bracket_segments(rect: Rect, grow: f32) -> Vec<[Pos2; 2]> {
    let rect = rect.expand(BRACKET_OFFSET);
    let length = BRACKET_MAX_LENGTH.min(rect.width().min(rect.height()) / 3.0) * grow;
    let corners = [
        (rect.left_top(), vec2(1.0, 1.0)),
        (rect.right_top(), vec2(-1.0, 1.0)),
        (rect.left_bottom(), vec2(1.0, -1.0)),
        (rect.right_bottom(), vec2(-1.0, -1.0)),
    ];

    corners
        .into_iter()
        .flat_map(|(corner, inward)| {
            [
                [corner, pos2(corner.x + inward.x * length, corner.y)],
                [corner, pos2(corner.x, corner.y + inward.y * length)],
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brackets_are_capped_and_offset() {
        let rect = Rect::from_min_size(pos2(10.0, 10.0), vec2(100.0, 60.0));
        let segments = bracket_segments(rect, 1.0);

        assert_eq!(segments.len(), 8);
        assert_eq!(segments[0][0], pos2(8.0, 8.0));
        assert_eq!(segments[0][1], pos2(16.0, 8.0));
    }

    #[test]
    fn idle_cursor_has_three_arms_clear_of_the_pointer() {
        let pointer = pos2(50.0, 50.0);
        let [up, left, right] = cursor_segments(pointer);

        assert_eq!(up[0], pos2(50.0, 50.0 - CURSOR_GAP));
        assert_eq!(up[1], pos2(50.0, 50.0 - CURSOR_GAP - CURSOR_LENGTH));
        for arm in [up, left, right] {
            assert!((arm[0].distance(pointer) - CURSOR_GAP).abs() < 1e-4);
            assert!((arm[0].distance(arm[1]) - CURSOR_LENGTH).abs() < 1e-4);
        }

        let left_dir = left[1] - pointer;
        let right_dir = right[1] - pointer;
        assert!((left_dir.x + right_dir.x).abs() < 1e-4);
        assert!(left_dir.y > 0.0 && (left_dir.y - right_dir.y).abs() < 1e-4);
        let spread = (left_dir.angle() - right_dir.angle()).abs().to_degrees();
        assert!((spread - CURSOR_SPREAD_DEGREES).abs() < 1e-2);
    }

    #[test]
    fn small_boxes_get_short_brackets() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(8.0, 8.0));
        let segments = bracket_segments(rect, 1.0);
        let length = segments[0][0].distance(segments[0][1]);
        assert!((length - 4.0).abs() < 1e-4);
    }

    #[test]
    fn new_hover_restarts_the_grow_animation() {
        let mut overlay = BracketOverlay::new();
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(20.0, 20.0));
        overlay.set_hover_box(rect);
        overlay.grow = 1.0;
        overlay.set_hover_box(rect.translate(vec2(1.0, 0.0)));
        assert_eq!(overlay.grow, 1.0);

        overlay.clear_hover_box();
        assert_eq!(overlay.hover, None);
        overlay.set_hover_box(rect);
        assert_eq!(overlay.grow, 0.0);
    }
}
