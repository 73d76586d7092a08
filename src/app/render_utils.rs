use eframe::egui::{Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, Vec2};

use contact_graph::engine::routing::TextMeasure;

pub(super) const LABEL_FONT_SIZE: f32 = 11.0;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

/// Grid anchored at the world origin, so it scrolls with the camera.
pub(super) fn draw_background(painter: &Painter, rect: Rect, world_origin: Pos2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (world_origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (world_origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

/// Filled triangle with its tip at `tip`, pointing along `direction`.
pub(super) fn draw_arrowhead(
    painter: &Painter,
    tip: Pos2,
    direction: Vec2,
    size: f32,
    color: Color32,
) {
    if size <= 0.5 || direction.length_sq() <= f32::EPSILON {
        return;
    }

    let direction = direction.normalized();
    let normal = direction.rot90();
    let base = tip - direction * size;
    let half_width = size * 0.45;

    painter.add(Shape::convex_polygon(
        vec![tip, base + normal * half_width, base - normal * half_width],
        color,
        Stroke::NONE,
    ));
}

/// Measures label text with the painter's fonts at the base label size.
pub(super) struct PainterTextMeasure<'a> {
    painter: &'a Painter,
}

impl<'a> PainterTextMeasure<'a> {
    pub(super) fn new(painter: &'a Painter) -> Self {
        Self { painter }
    }
}

impl TextMeasure for PainterTextMeasure<'_> {
    fn measure(&self, text: &str) -> Vec2 {
        self.painter
            .layout_no_wrap(
                text.to_owned(),
                FontId::proportional(LABEL_FONT_SIZE),
                Color32::WHITE,
            )
            .size()
    }
}
