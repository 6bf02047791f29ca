use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, StrokeKind, Vec2, pos2, vec2};

use super::super::presenter::{MediaPlacement, MediaPresenter};
use super::super::render_utils::{faded, rect_to_screen, segment_visible, to_screen};
use super::super::text_layout::{TextStyle, TextToken};
use super::style::PlainGeometry;
use super::{DrawItem, FramePlan};

pub(in crate::app) const FOREGROUND: Color32 = Color32::from_rgb(0, 255, 102);
pub(in crate::app) const BACKGROUND: Color32 = Color32::from_rgb(8, 10, 9);

const HIDDEN_MEDIA_ALPHA: f32 = 0.1;
const HIGHLIGHT_PAD: f32 = 1.5;

/// Paints `plan` with the canvas top-left at `origin`.
pub(in crate::app) fn paint(
    plan: &FramePlan,
    painter: &Painter,
    origin: Vec2,
    presenter: &mut dyn MediaPresenter,
) {
    let clip = painter.clip_rect();

    for item in &plan.items {
        match item {
            DrawItem::Link { from, to, alpha } => {
                let from = to_screen(origin, *from);
                let to = to_screen(origin, *to);
                if segment_visible(clip, from, to, plan.line_width) {
                    painter.line_segment(
                        [from, to],
                        Stroke::new(plan.line_width, faded(FOREGROUND, *alpha)),
                    );
                }
            }
            DrawItem::Plain {
                geometry,
                label,
                alpha,
            } => paint_plain(painter, origin, geometry, label, *alpha),
            DrawItem::Text {
                origin: text_origin,
                token_lines,
                style,
                alpha,
            } => paint_text(
                painter,
                to_screen(origin, *text_origin),
                token_lines,
                style,
                *alpha,
            ),
            DrawItem::Media {
                id,
                rect,
                alpha,
                z_index,
                placeholder,
            } => {
                let rect = rect_to_screen(origin, *rect);
                if *placeholder {
                    let color = faded(FOREGROUND, *alpha);
                    painter.rect_filled(rect, 0.0, faded(FOREGROUND, alpha * 0.1));
                    painter.rect_stroke(
                        rect,
                        0.0,
                        Stroke::new(plan.border_width, color),
                        StrokeKind::Inside,
                    );
                } else if *alpha <= HIDDEN_MEDIA_ALPHA {
                    presenter.hide(*id);
                } else {
                    presenter.show(MediaPlacement {
                        id: *id,
                        rect,
                        alpha: *alpha,
                        z_index: *z_index,
                    });
                }
            }
            DrawItem::HiddenMedia { id } => presenter.hide(*id),
        }
    }

    presenter.present(painter);
}

fn paint_plain(painter: &Painter, origin: Vec2, geometry: &PlainGeometry, label: &str, alpha: f32) {
    let marker = rect_to_screen(origin, geometry.marker);
    let label_pos = to_screen(origin, geometry.label_pos);
    let font = FontId::proportional(geometry.font_size);

    if alpha < 1.0 {
        let bounds = rect_to_screen(origin, geometry.bounds);
        let label_area = Rect::from_min_max(
            pos2(label_pos.x, label_pos.y - geometry.font_size * 0.5),
            pos2(bounds.right(), label_pos.y + geometry.font_size * 0.5),
        );
        painter.rect_filled(marker.expand(1.0), 0.0, BACKGROUND);
        painter.rect_filled(label_area.expand(2.0), 0.0, BACKGROUND);
    }

    let color = faded(FOREGROUND, alpha);
    painter.rect_filled(marker, 0.0, color);
    painter.text(label_pos, Align2::LEFT_CENTER, label, font, color);
}

fn paint_text(
    painter: &Painter,
    origin: Pos2,
    token_lines: &[Vec<TextToken>],
    style: &TextStyle,
    alpha: f32,
) {
    let font = FontId::proportional(style.font_size);
    let plain = faded(FOREGROUND, alpha);
    let marked_fill = faded(FOREGROUND, alpha);
    let marked_text = faded(Color32::BLACK, alpha);
    let space_width = painter
        .layout_no_wrap(" ".to_owned(), font.clone(), plain)
        .size()
        .x;

    for (row, tokens) in token_lines.iter().enumerate() {
        let y = origin.y + style.padding + row as f32 * style.line_height;
        let mut x = origin.x + style.padding;

        for token in tokens {
            if token.is_space() {
                x += space_width;
                continue;
            }
            let color = if token.highlighted { marked_text } else { plain };
            let galley = painter.layout_no_wrap(token.text.clone(), font.clone(), color);
            let width = galley.size().x;

            if token.highlighted {
                let backdrop = Rect::from_min_size(
                    pos2(x - HIGHLIGHT_PAD, y - HIGHLIGHT_PAD),
                    vec2(width + HIGHLIGHT_PAD * 2.0, style.font_size + HIGHLIGHT_PAD * 2.0),
                );
                painter.rect_filled(backdrop, 0.0, marked_fill);
            }
            painter.galley(pos2(x, y), galley, color);
            x += width;
        }
    }
}
