use eframe::egui::{Color32, Painter, Pos2, Rect, Vec2};

/// `color` with its alpha multiplied by `alpha`.
pub(super) fn faded(color: Color32, alpha: f32) -> Color32 {
    color.gamma_multiply(alpha.clamp(0.0, 1.0))
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;
    let mix = |a: u8, b: u8| ((a as f32 * inverse) + (b as f32 * amount)).round() as u8;

    Color32::from_rgba_unmultiplied(
        mix(base.r(), overlay.r()),
        mix(base.g(), overlay.g()),
        mix(base.b(), overlay.b()),
        mix(base.a(), overlay.a()),
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, color: Color32) {
    painter.rect_filled(rect, 0.0, color);
}

pub(super) fn to_screen(origin: Vec2, point: Pos2) -> Pos2 {
    point + origin
}

pub(super) fn rect_to_screen(origin: Vec2, rect: Rect) -> Rect {
    rect.translate(origin)
}

/// Cheap bounding-box cull for a segment against the visible canvas.
pub(super) fn segment_visible(canvas: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let bounds = Rect::from_two_pos(start, end).expand(padding);
    canvas.intersects(bounds)
}
