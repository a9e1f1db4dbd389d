/// Software rasterizer for paint commands

use crate::rendering::paint::PaintCommand;
use crate::rendering::palette::Rgba;
use crate::rendering::ImageCache;
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::imageops::FilterType;
use image::{Rgba as Pixel, RgbaImage};

const BACKGROUND: Rgba = (0xFF, 0xFF, 0xFF, 0xFF);

/// Rasterize `commands` onto a white canvas. Deterministic: identical inputs
/// give identical pixels.
pub fn rasterize(width: u32, height: u32, commands: &[PaintCommand], images: &ImageCache) -> RgbaImage {
    let (r, g, b, a) = BACKGROUND;
    let mut canvas = RgbaImage::from_pixel(width, height, Pixel([r, g, b, a]));
    for cmd in commands {
        match cmd {
            PaintCommand::SolidRect { x, y, width, height, rgba } => {
                fill_rect(&mut canvas, *x, *y, *width, *height, *rgba)
            }
            PaintCommand::VerticalGradient { x, y, width, height, top, bottom } => {
                fill_gradient(&mut canvas, *x, *y, *width, *height, *top, *bottom)
            }
            PaintCommand::Disc { cx, cy, radius, rgba } => fill_disc(&mut canvas, *cx, *cy, *radius, *rgba, false),
            PaintCommand::HalfDisc { cx, cy, radius, rgba } => fill_disc(&mut canvas, *cx, *cy, *radius, *rgba, true),
            PaintCommand::Image { uri, x, y, width, height, circular } => {
                if let Some(img) = images.get(uri) {
                    draw_image(&mut canvas, img, *x, *y, *width, *height, *circular);
                }
            }
            PaintCommand::Text { x, y, text, scale, rgba } => draw_text(&mut canvas, *x, *y, text, *scale, *rgba),
        }
    }
    canvas
}

fn blend(dst: Pixel<u8>, (r, g, b, a): Rgba) -> Pixel<u8> {
    if a == 255 {
        return Pixel([r, g, b, 255]);
    }
    if a == 0 {
        return dst;
    }
    let alpha = a as u32;
    let inv = 255 - alpha;
    let mix = |s: u8, d: u8| ((s as u32 * alpha + d as u32 * inv + 127) / 255) as u8;
    let out_a = (alpha + dst[3] as u32 * inv / 255).min(255) as u8;
    Pixel([mix(r, dst[0]), mix(g, dst[1]), mix(b, dst[2]), out_a])
}

fn put(canvas: &mut RgbaImage, x: i32, y: i32, rgba: Rgba) {
    if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
        return;
    }
    let dst = *canvas.get_pixel(x as u32, y as u32);
    canvas.put_pixel(x as u32, y as u32, blend(dst, rgba));
}

/// Clip a box to the canvas, returning (x0, y0, x1, y1) exclusive
fn clip(canvas: &RgbaImage, x: i32, y: i32, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + width as i32).min(canvas.width() as i32);
    let y1 = (y + height as i32).min(canvas.height() as i32);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}

fn fill_rect(canvas: &mut RgbaImage, x: i32, y: i32, width: u32, height: u32, rgba: Rgba) {
    let Some((x0, y0, x1, y1)) = clip(canvas, x, y, width, height) else {
        return;
    };
    for py in y0..y1 {
        for px in x0..x1 {
            let dst = *canvas.get_pixel(px, py);
            canvas.put_pixel(px, py, blend(dst, rgba));
        }
    }
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8
}

fn fill_gradient(canvas: &mut RgbaImage, x: i32, y: i32, width: u32, height: u32, top: Rgba, bottom: Rgba) {
    let span = height.saturating_sub(1).max(1) as f32;
    for row in 0..height {
        let t = row as f32 / span;
        let rgba = (
            lerp(top.0, bottom.0, t),
            lerp(top.1, bottom.1, t),
            lerp(top.2, bottom.2, t),
            lerp(top.3, bottom.3, t),
        );
        fill_rect(canvas, x, y + row as i32, width, 1, rgba);
    }
}

fn fill_disc(canvas: &mut RgbaImage, cx: f32, cy: f32, radius: f32, rgba: Rgba, upper_half: bool) {
    if radius <= 0.0 {
        return;
    }
    let r2 = radius * radius;
    let y_max = if upper_half { cy } else { cy + radius };
    let y0 = (cy - radius).floor() as i32;
    let y1 = y_max.ceil() as i32;
    let x0 = (cx - radius).floor() as i32;
    let x1 = (cx + radius).ceil() as i32;
    for py in y0..y1 {
        let fy = py as f32 + 0.5;
        if fy > y_max {
            continue;
        }
        for px in x0..x1 {
            let fx = px as f32 + 0.5;
            let dx = fx - cx;
            let dy = fy - cy;
            if dx * dx + dy * dy <= r2 {
                put(canvas, px, py, rgba);
            }
        }
    }
}

fn draw_image(
    canvas: &mut RgbaImage,
    img: &image::DynamicImage,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    circular: bool,
) {
    if width == 0 || height == 0 {
        return;
    }
    // cover: scale to fill then centre-crop
    let scaled = img.resize_to_fill(width, height, FilterType::Lanczos3).to_rgba8();
    let radius = width.min(height) as f32 / 2.0;
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    for (sx, sy, p) in scaled.enumerate_pixels() {
        if circular {
            let dx = sx as f32 + 0.5 - cx;
            let dy = sy as f32 + 0.5 - cy;
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
        }
        put(canvas, x + sx as i32, y + sy as i32, (p[0], p[1], p[2], p[3]));
    }
}

fn draw_text(canvas: &mut RgbaImage, x: i32, y: i32, text: &str, scale: u32, rgba: Rgba) {
    let scale = scale.max(1) as i32;
    let mut cursor_x = x;
    for ch in text.chars() {
        let glyph = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?'));
        if let Some(glyph) = glyph {
            for (row_idx, row) in glyph.iter().enumerate() {
                for col_idx in 0..8 {
                    if (*row >> col_idx) & 1 == 0 {
                        continue;
                    }
                    let gx = cursor_x + col_idx * scale;
                    let gy = y + row_idx as i32 * scale;
                    fill_rect(canvas, gx, gy, scale as u32, scale as u32, rgba);
                }
            }
        }
        cursor_x += 8 * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_commands_give_white_canvas() {
        let img = rasterize(16, 8, &[], &ImageCache::default());
        assert_eq!(img.dimensions(), (16, 8));
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn rects_are_clipped_to_canvas() {
        let cmds = [PaintCommand::SolidRect {
            x: -4,
            y: 6,
            width: 8,
            height: 10,
            rgba: (255, 0, 0, 255),
        }];
        let img = rasterize(8, 8, &cmds, &ImageCache::default());
        assert_eq!(img.get_pixel(0, 7).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(4, 7).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(0, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn gradient_runs_top_to_bottom() {
        let cmds = [PaintCommand::VerticalGradient {
            x: 0,
            y: 0,
            width: 2,
            height: 11,
            top: (0, 0, 0, 255),
            bottom: (200, 0, 0, 255),
        }];
        let img = rasterize(2, 11, &cmds, &ImageCache::default());
        assert_eq!(img.get_pixel(0, 0)[0], 0);
        assert_eq!(img.get_pixel(0, 5)[0], 100);
        assert_eq!(img.get_pixel(1, 10)[0], 200);
    }

    #[test]
    fn half_disc_leaves_lower_half_untouched() {
        let cmds = [PaintCommand::HalfDisc {
            cx: 10.0,
            cy: 10.0,
            radius: 8.0,
            rgba: (0, 0, 0, 255),
        }];
        let img = rasterize(20, 20, &cmds, &ImageCache::default());
        assert_eq!(img.get_pixel(10, 5).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(10, 14).0, [255, 255, 255, 255]);
    }

    #[test]
    fn circular_images_are_clipped() {
        let mut cache = ImageCache::default();
        cache.insert(
            "red",
            image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Pixel([255, 0, 0, 255]))),
        );
        let cmds = [PaintCommand::Image {
            uri: "red".into(),
            x: 0,
            y: 0,
            width: 20,
            height: 20,
            circular: true,
        }];
        let img = rasterize(20, 20, &cmds, &cache);
        let centre = img.get_pixel(10, 10);
        assert!(centre[0] > 240 && centre[1] < 15);
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn text_draws_glyph_pixels() {
        let cmds = [PaintCommand::Text {
            x: 0,
            y: 0,
            text: "H".into(),
            scale: 2,
            rgba: (0, 0, 0, 255),
        }];
        let img = rasterize(16, 16, &cmds, &ImageCache::default());
        assert!(img.pixels().any(|p| p.0 == [0, 0, 0, 255]));
    }

    #[test]
    fn half_alpha_blends() {
        let out = blend(Pixel([255, 255, 255, 255]), (0, 0, 0, 128));
        assert!(out[0] > 120 && out[0] < 135);
        assert_eq!(out[3], 255);
    }
}
