use std::collections::HashMap;

use anyhow::Result;
use eframe::egui::{
    self, Align2, Color32, ColorImage, Context, FontId, Painter, Pos2, Rect, Stroke, TextureHandle,
    TextureOptions, Vec2, pos2, vec2,
};
use graph_spotlight::model::{EdgeRecord, NodeRecord};
use graph_spotlight::overlay::{EdgeOverlay, NodeOverlay, ViewTransform, VisualStyle};
use graph_spotlight::surface::{PixelSurfaces, with_surface};

const CARD_CORNER: f32 = 10.0;
// Zooming with scaled cards produces a new size almost every frame.
const MAX_CACHED_CARDS: usize = 64;
const EDGE_COLOR: Color32 = Color32::from_rgb(120, 132, 148);
const EDGE_HIGHLIGHT: Color32 = Color32::from_rgb(229, 72, 77);

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let opacity = opacity.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (color.a() as f32 * opacity) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, transform: &ViewTransform) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * transform.zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = transform.world_to_screen(Vec2::ZERO);
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

/// Blur has no native egui primitive; a wide translucent under-stroke stands in for it.
pub(super) fn draw_edge(painter: &Painter, edge: &EdgeOverlay) {
    let color = if edge.highlighted {
        EDGE_HIGHLIGHT
    } else {
        EDGE_COLOR
    };
    let width = if edge.highlighted { 2.4 } else { 1.4 };
    let VisualStyle {
        opacity,
        blur_radius,
    } = edge.style;

    if blur_radius > 0.0 {
        painter.line_segment(
            [edge.from, edge.to],
            Stroke::new(width + blur_radius * 2.0, with_opacity(color, opacity * 0.35)),
        );
    }
    painter.line_segment([edge.from, edge.to], Stroke::new(width, with_opacity(color, opacity)));
}

pub(super) fn draw_edge_labels(painter: &Painter, edge: &EdgeOverlay, record: &EdgeRecord) {
    let Some(anchor) = edge.label_anchor else {
        return;
    };
    let opacity = edge.style.opacity;
    let labels = [
        (record.label.as_deref(), anchor),
        (
            record.reverse_label.as_deref(),
            anchor.translate(vec2(0.0, anchor.height() + 4.0)),
        ),
    ];

    for (text, rect) in labels {
        let Some(text) = text else {
            continue;
        };
        painter.rect_filled(
            rect,
            4.0,
            with_opacity(Color32::from_rgb(32, 38, 47), opacity * 0.9),
        );
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            text,
            FontId::proportional(11.0),
            with_opacity(Color32::from_gray(220), opacity),
        );
    }
}

pub(super) fn draw_card(
    painter: &Painter,
    node: &NodeOverlay,
    record: &NodeRecord,
    texture: Option<&TextureHandle>,
    text_scale: f32,
) {
    let VisualStyle {
        opacity,
        blur_radius,
    } = node.style;
    let body = node.anchor.expand(blur_radius.ceil());

    match texture {
        Some(texture) => {
            painter.image(
                texture.id(),
                body,
                Rect::from_min_max(Pos2::ZERO, pos2(1.0, 1.0)),
                with_opacity(Color32::WHITE, opacity),
            );
        }
        None => {
            painter.rect_filled(
                node.anchor,
                CARD_CORNER,
                with_opacity(Color32::from_rgb(40, 47, 58), opacity),
            );
        }
    }

    if node.hovered {
        painter.rect_stroke(
            node.anchor,
            CARD_CORNER,
            Stroke::new(2.0, EDGE_HIGHLIGHT),
            egui::StrokeKind::Outside,
        );
    }

    let inset = vec2(12.0, 10.0) * text_scale;
    painter.text(
        node.anchor.min + inset,
        Align2::LEFT_TOP,
        &record.title,
        FontId::proportional(15.0 * text_scale),
        with_opacity(Color32::from_gray(240), opacity),
    );
    painter.text(
        node.anchor.min + inset + vec2(0.0, 24.0 * text_scale),
        Align2::LEFT_TOP,
        &record.content,
        FontId::proportional(12.0 * text_scale),
        with_opacity(Color32::from_gray(170), opacity),
    );
}

fn rounded_coverage(point: Pos2, rect: Rect, radius: f32) -> f32 {
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return 0.0;
    }
    let radius = radius.clamp(0.0, rect.width().min(rect.height()) * 0.5);
    let inner = rect.shrink(radius);
    let nearest = pos2(
        point.x.clamp(inner.left(), inner.right()),
        point.y.clamp(inner.top(), inner.bottom()),
    );
    let distance = point.distance(nearest) - radius;
    (0.5 - distance).clamp(0.0, 1.0)
}

/// Paints a card body (vertical gradient, hairline border) inset by `padding` pixels.
fn rasterize_card(image: &mut ColorImage, padding: usize) {
    let [width, height] = image.size;
    let card = Rect::from_min_max(
        pos2(padding as f32, padding as f32),
        pos2((width - padding) as f32, (height - padding) as f32),
    );
    let border = Color32::from_rgb(86, 98, 116);

    for y in 0..height {
        let t = ((y as f32 - card.top()) / card.height().max(1.0)).clamp(0.0, 1.0);
        let fill = Color32::from_rgb(
            (46.0 - 12.0 * t) as u8,
            (54.0 - 14.0 * t) as u8,
            (67.0 - 17.0 * t) as u8,
        );
        for x in 0..width {
            let point = pos2(x as f32 + 0.5, y as f32 + 0.5);
            let outer = rounded_coverage(point, card, CARD_CORNER);
            if outer <= 0.0 {
                continue;
            }
            let inner = rounded_coverage(point, card.shrink(1.5), CARD_CORNER - 1.5);
            let color = if inner >= outer { fill } else { border };
            image.pixels[y * width + x] = with_opacity(color, outer);
        }
    }
}

/// Separable box blur over premultiplied pixels.
fn box_blur(image: &mut ColorImage, radius: usize) {
    if radius == 0 {
        return;
    }
    let [width, height] = image.size;
    let mut scratch = image.pixels.clone();
    blur_pass(&image.pixels, &mut scratch, radius, (width, 1), (height, width));
    blur_pass(&scratch, &mut image.pixels, radius, (height, width), (width, 1));
}

/// One blur direction: `(len, stride)` walks a line, `(lines, step)` moves between lines.
fn blur_pass(
    source: &[Color32],
    target: &mut [Color32],
    radius: usize,
    (len, stride): (usize, usize),
    (lines, step): (usize, usize),
) {
    let window = (radius * 2 + 1) as u32;
    for line in 0..lines {
        let base = line * step;
        for index in 0..len {
            let mut sum = [0u32; 4];
            for offset in index.saturating_sub(radius)..(index + radius + 1).min(len) {
                let channels = source[base + offset * stride].to_array();
                for (total, channel) in sum.iter_mut().zip(channels) {
                    *total += channel as u32;
                }
            }
            let [r, g, b, a] = sum.map(|total| (total / window) as u8);
            target[base + index * stride] = Color32::from_rgba_premultiplied(r, g, b, a);
        }
    }
}

/// Card bodies rasterized off-screen once per size and blur, then reused as textures.
pub(super) struct CardTextures {
    surfaces: PixelSurfaces,
    cache: HashMap<(u32, u32, u32), TextureHandle>,
}

impl CardTextures {
    pub(super) fn new() -> Self {
        Self {
            surfaces: PixelSurfaces::default(),
            cache: HashMap::new(),
        }
    }

    pub(super) fn get(&mut self, ctx: &Context, size: Vec2, blur: f32) -> Option<TextureHandle> {
        let padding = blur.ceil().max(0.0) as u32;
        let key = (size.x.round() as u32, size.y.round() as u32, padding);
        if let Some(texture) = self.cache.get(&key) {
            return Some(texture.clone());
        }

        if self.cache.len() >= MAX_CACHED_CARDS {
            self.cache.clear();
        }
        match self.rasterize(ctx, key) {
            Ok(texture) => {
                self.cache.insert(key, texture.clone());
                Some(texture)
            }
            Err(error) => {
                log::warn!("card rasterization failed: {error:#}");
                None
            }
        }
    }

    fn rasterize(&mut self, ctx: &Context, (width, height, padding): (u32, u32, u32)) -> Result<TextureHandle> {
        let size = [
            (width + padding * 2) as usize,
            (height + padding * 2) as usize,
        ];
        with_surface(&mut self.surfaces, size, |image| {
            rasterize_card(image, padding as usize);
            box_blur(image, padding as usize);
            Ok(ctx.load_texture(
                format!("card-{width}x{height}-{padding}"),
                image.clone(),
                TextureOptions::LINEAR,
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_corners_stay_transparent() {
        let mut image = ColorImage::filled([60, 40], Color32::TRANSPARENT);
        rasterize_card(&mut image, 4);
        assert_eq!(image.pixels[0], Color32::TRANSPARENT);
        assert_eq!(image.pixels[5 * 60 + 5].a(), 0);
        assert_eq!(image.pixels[20 * 60 + 30].a(), 255);
    }

    #[test]
    fn cards_smaller_than_their_corners_still_rasterize() {
        for size in [[10, 6], [19, 19], [2, 2]] {
            let mut image = ColorImage::filled(size, Color32::TRANSPARENT);
            rasterize_card(&mut image, 0);
            let center = image.pixels[(size[1] / 2) * size[0] + size[0] / 2];
            assert!(center.a() > 0, "empty card at {size:?}");
        }
    }

    #[test]
    fn blur_keeps_flat_regions_and_softens_edges() {
        let mut image = ColorImage::filled([9, 9], Color32::TRANSPARENT);
        image.pixels[4 * 9 + 4] = Color32::WHITE;
        box_blur(&mut image, 1);
        let center = image.pixels[4 * 9 + 4];
        assert!(center.a() > 0 && center.a() < 255);
        assert_eq!(image.pixels[0], Color32::TRANSPARENT);

        let mut flat = ColorImage::filled([5, 5], Color32::from_gray(90));
        box_blur(&mut flat, 2);
        assert_eq!(flat.pixels[12], Color32::from_gray(90));
    }
}
