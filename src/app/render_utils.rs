use eframe::egui::{
    Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, StrokeKind, Vec2, pos2, vec2,
};

use super::graph::interaction::Tooltip;
use super::graph::scene::NodeBox;

pub(super) const CANVAS_COLOR: Color32 = Color32::from_rgb(17, 24, 39);
pub(super) const EDGE_COLOR: Color32 = Color32::from_rgb(136, 136, 136);
const NODE_FILL: Color32 = Color32::from_rgb(30, 58, 138);
const NODE_STROKE: Color32 = Color32::from_rgb(96, 165, 250);
const HEADLINE_COLOR: Color32 = Color32::from_rgb(249, 250, 251);
const DETAIL_COLOR: Color32 = Color32::from_rgb(147, 197, 253);

#[derive(Clone, Copy, Default)]
pub(super) struct NodeEmphasis {
    pub hovered: bool,
    pub search_match: bool,
    pub dimmed: bool,
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;
    let mix = |a: u8, b: u8| ((a as f32 * inverse) + (b as f32 * amount)) as u8;

    Color32::from_rgba_unmultiplied(
        mix(base.r(), overlay.r()),
        mix(base.g(), overlay.g()),
        mix(base.b(), overlay.b()),
        mix(base.a(), overlay.a()),
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

/// Grid that moves with the pan and stretches with the zoom.
pub(super) fn draw_background(painter: &Painter, rect: Rect, translation: Vec2, scale: f32) {
    painter.rect_filled(rect, 0.0, CANVAS_COLOR);

    let step = (56.0 * scale.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.min + translation;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([pos2(x, rect.top()), pos2(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([pos2(rect.left(), y), pos2(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let bounds = Rect::from_two_pos(start, end).expand(padding);
    if !bounds.intersects(rect) {
        return false;
    }

    if rect.contains(start) || rect.contains(end) {
        return true;
    }

    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ];
    (0..4).any(|side| segments_intersect(start, end, corners[side], corners[(side + 1) % 4]))
}

fn segments_intersect(a1: Pos2, a2: Pos2, b1: Pos2, b2: Pos2) -> bool {
    fn cross(o: Pos2, a: Pos2, b: Pos2) -> f32 {
        let oa = a - o;
        let ob = b - o;
        (oa.x * ob.y) - (oa.y * ob.x)
    }

    fn straddles(first: f32, second: f32) -> bool {
        (first <= 0.0 && second >= 0.0) || (first >= 0.0 && second <= 0.0)
    }

    if !Rect::from_two_pos(a1, a2).intersects(Rect::from_two_pos(b1, b2)) {
        return false;
    }

    straddles(cross(a1, a2, b1), cross(a1, a2, b2)) && straddles(cross(b1, b2, a1), cross(b1, b2, a2))
}

pub(super) fn paint_edge(painter: &Painter, from: Pos2, to: Pos2, scale: f32) {
    let width = (1.5 * scale.sqrt()).clamp(0.6, 3.4);
    painter.line_segment([from, to], Stroke::new(width, EDGE_COLOR));
}

/// Rounded box with the headline on top and the method/URL line below. Text is
/// skipped when zoomed out far enough that it would not be legible.
pub(super) fn paint_node(painter: &Painter, node: &NodeBox<'_>, scale: f32, emphasis: NodeEmphasis) {
    let corner = 12.0 * scale;
    let mut fill = NODE_FILL;
    let mut stroke_color = NODE_STROKE;
    let mut stroke_width = 2.0 * scale.sqrt();

    if node.pinned {
        stroke_color = Color32::from_rgb(245, 206, 93);
        stroke_width *= 1.5;
    } else if emphasis.hovered {
        fill = blend_color(NODE_FILL, NODE_STROKE, 0.25);
        stroke_color = Color32::from_rgb(255, 164, 101);
    } else if emphasis.search_match {
        fill = blend_color(NODE_FILL, Color32::from_rgb(103, 196, 255), 0.45);
        stroke_color = Color32::from_rgb(103, 196, 255);
        stroke_width *= 1.4;
    }
    if emphasis.dimmed {
        fill = dim_color(fill, 0.45);
        stroke_color = dim_color(stroke_color, 0.45);
    }

    painter.rect_filled(node.rect, corner, fill);
    painter.rect_stroke(
        node.rect,
        corner,
        Stroke::new(stroke_width, stroke_color),
        StrokeKind::Inside,
    );

    if scale < 0.35 {
        return;
    }

    let wrap_width = node.rect.width() - (10.0 * scale);
    let headline = painter.layout(
        node.headline.to_owned(),
        FontId::proportional(12.0 * scale),
        HEADLINE_COLOR,
        wrap_width,
    );
    let detail = (!node.detail.is_empty()).then(|| {
        painter.layout(
            node.detail.clone(),
            FontId::proportional(11.0 * scale),
            DETAIL_COLOR,
            wrap_width,
        )
    });

    let gap = 4.0 * scale;
    let detail_height = detail.as_ref().map_or(0.0, |galley| galley.size().y + gap);
    let total_height = (headline.size().y + detail_height).min(node.rect.height());
    let mut top = node.rect.center().y - total_height * 0.5;

    let headline_height = headline.size().y;
    let headline_pos = pos2(node.rect.center().x - headline.size().x * 0.5, top);
    painter.with_clip_rect(node.rect).galley(headline_pos, headline, HEADLINE_COLOR);
    top += headline_height + gap;

    if let Some(detail) = detail {
        let detail_pos = pos2(node.rect.center().x - detail.size().x * 0.5, top);
        painter.with_clip_rect(node.rect).galley(detail_pos, detail, DETAIL_COLOR);
    }
}

/// Frame next to the pointer listing the hovered node's metadata.
pub(super) fn paint_tooltip(painter: &Painter, canvas: Rect, tooltip: &Tooltip<'_>) {
    let font = FontId::proportional(12.5);
    let mut text = tooltip.title.to_owned();
    for line in &tooltip.lines {
        text.push('\n');
        text.push_str(line);
    }
    if tooltip.title != tooltip.node_id {
        text.push_str(&format!("\nid: {}", tooltip.node_id));
    }

    let galley = painter.layout(text, font, Color32::from_gray(238), 320.0);
    let padding = vec2(8.0, 6.0);
    let size = galley.size() + padding * 2.0;

    let anchor = canvas.min + tooltip.anchor.to_vec2() + vec2(14.0, 14.0);
    let mut frame = Rect::from_min_size(anchor, size);
    if frame.right() > canvas.right() {
        frame = frame.translate(vec2(-(size.x + 28.0), 0.0));
    }
    if frame.bottom() > canvas.bottom() {
        frame = frame.translate(vec2(0.0, -(size.y + 28.0)));
    }

    painter.rect_filled(frame, 6.0, Color32::from_rgba_unmultiplied(15, 18, 24, 235));
    painter.rect_stroke(
        frame,
        6.0,
        Stroke::new(1.0, Color32::from_rgba_unmultiplied(96, 165, 250, 160)),
        StrokeKind::Inside,
    );
    painter.galley(frame.min + padding, galley, Color32::from_gray(238));
}

pub(super) fn paint_empty_hint(painter: &Painter, rect: Rect) {
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        "This graph has no nodes.",
        FontId::proportional(14.0),
        Color32::from_gray(160),
    );
}
