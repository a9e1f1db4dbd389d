//! Paint command set and the layout -> paint translation

use crate::icon::IconKind;
use crate::rendering::layout::{text_scale, text_width, fit_text, ElementType, PosterLayout, Rect, GLYPH_SIZE};
use crate::rendering::palette::{Palette, Rgba};
use crate::rendering::ImageCache;

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: Rgba,
    },
    VerticalGradient {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        top: Rgba,
        bottom: Rgba,
    },
    Disc {
        cx: f32,
        cy: f32,
        radius: f32,
        rgba: Rgba,
    },
    /// Upper half of a disc (shoulders, domes)
    HalfDisc {
        cx: f32,
        cy: f32,
        radius: f32,
        rgba: Rgba,
    },
    /// Decoded image scaled to cover the box, optionally clipped to a circle
    Image {
        uri: String,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        circular: bool,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        scale: u32,
        rgba: Rgba,
    },
}

/// Translate a layout into paint commands, back to front.
/// Image nodes whose image is not in `images` paint their placeholder.
pub fn paint_layout(layout: &PosterLayout, palette: &Palette, images: &ImageCache) -> Vec<PaintCommand> {
    let mut cmds = Vec::new();

    for node in &layout.nodes {
        let r = node.rect;
        match &node.elem_type {
            ElementType::BannerImage { uri } if images.contains(uri) => cmds.push(image(uri, r, false)),
            ElementType::BannerImage { .. } | ElementType::BannerPlaceholder => {
                paint_banner_placeholder(&mut cmds, r, &layout.title, palette)
            }
            ElementType::CampaignStrip => cmds.push(solid(r, palette.campaign_strip)),
            ElementType::Headline => cmds.extend(text_lines(r, &node.text, node.scale, palette.headline_text)),
            ElementType::Tagline => cmds.extend(text_lines(r, &node.text, node.scale, palette.tagline_text)),
            ElementType::DetailsBackground => cmds.push(PaintCommand::VerticalGradient {
                x: r.x,
                y: r.y,
                width: r.width,
                height: r.height,
                top: palette.details_top,
                bottom: palette.details_bottom,
            }),
            ElementType::ProfilePhoto { uri } if images.contains(uri) => {
                let ring = ring_width(r);
                cmds.push(disc(r, 0, palette.photo_ring));
                cmds.push(image(uri, inset(r, ring), true));
            }
            ElementType::ProfilePhoto { .. } | ElementType::ProfilePlaceholder => {
                let ring = ring_width(r);
                cmds.push(disc(r, 0, palette.photo_ring));
                cmds.push(disc(r, ring, palette.photo_background));
                cmds.extend(IconKind::Account.paint(inset(r, ring), palette.silhouette));
            }
            ElementType::Role => cmds.extend(text_lines(r, &node.text, node.scale, palette.role_text)),
            ElementType::Name => cmds.extend(text_lines(r, &node.text, node.scale, palette.name_text)),
            ElementType::Description => {
                cmds.extend(text_lines(r, &node.text, node.scale, palette.description_text))
            }
            ElementType::ContactIcon { icon } => cmds.extend(icon.paint(r, palette.role_text)),
            ElementType::Mobile | ElementType::Address | ElementType::Social => {
                cmds.extend(text_lines(r, &node.text, node.scale, palette.description_text))
            }
            ElementType::PrimaryStripe => cmds.push(solid(r, palette.stripe_primary)),
            ElementType::SecondaryStripe => cmds.push(solid(r, palette.stripe_secondary)),
        }
    }

    cmds
}

fn paint_banner_placeholder(cmds: &mut Vec<PaintCommand>, r: Rect, title: &str, palette: &Palette) {
    cmds.push(PaintCommand::VerticalGradient {
        x: r.x,
        y: r.y,
        width: r.width,
        height: r.height,
        top: palette.placeholder_top,
        bottom: palette.placeholder_bottom,
    });
    let scale = text_scale(r.width, 120);
    let max_w = r.width.saturating_sub(r.width / 10);
    let title = fit_text(title, scale, max_w);
    let w = text_width(&title, scale);
    let x = r.x + (r.width.saturating_sub(w) / 2) as i32;
    let y = r.y + (r.height / 3) as i32 - (GLYPH_SIZE * scale / 2) as i32;
    cmds.push(PaintCommand::Text {
        x,
        y,
        text: title,
        scale,
        rgba: palette.headline_text,
    });
}

fn text_lines(r: Rect, text: &str, scale: u32, rgba: Rgba) -> Vec<PaintCommand> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return Vec::new();
    }
    let line_h = (r.height / lines.len() as u32).max(GLYPH_SIZE * scale);
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| PaintCommand::Text {
            x: r.x,
            y: r.y + (i as u32 * line_h) as i32,
            text: line.to_string(),
            scale,
            rgba,
        })
        .collect()
}

fn solid(r: Rect, rgba: Rgba) -> PaintCommand {
    PaintCommand::SolidRect {
        x: r.x,
        y: r.y,
        width: r.width,
        height: r.height,
        rgba,
    }
}

fn image(uri: &str, r: Rect, circular: bool) -> PaintCommand {
    PaintCommand::Image {
        uri: uri.to_string(),
        x: r.x,
        y: r.y,
        width: r.width,
        height: r.height,
        circular,
    }
}

fn disc(r: Rect, inset_by: u32, rgba: Rgba) -> PaintCommand {
    PaintCommand::Disc {
        cx: r.x as f32 + r.width as f32 / 2.0,
        cy: r.y as f32 + r.height as f32 / 2.0,
        radius: (r.width.min(r.height) as f32 / 2.0 - inset_by as f32).max(0.0),
        rgba,
    }
}

fn ring_width(r: Rect) -> u32 {
    (r.width / 40).max(2)
}

fn inset(r: Rect, by: u32) -> Rect {
    Rect::new(
        r.x + by as i32,
        r.y + by as i32,
        r.width.saturating_sub(by * 2),
        r.height.saturating_sub(by * 2),
    )
}
