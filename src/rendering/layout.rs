//! Poster layout: a banner region stacked above a user-details region
//!
//! Text sizes are expressed as integer glyph scales; every glyph is an 8x8
//! cell, so a line of `n` chars at scale `s` is `8 * n * s` pixels wide.

use crate::icon::IconKind;
use crate::resolver::{MAX_ASPECT_RATIO, MIN_ASPECT_RATIO};
use crate::session::CustomizationSession;
use crate::CampaignText;

pub const GLYPH_SIZE: u32 = 8;

/// Widest canvas the layout will produce; wider requests are narrowed
pub const MAX_CANVAS_WIDTH: u32 = 4096;

/// Details region height as a fraction of the canvas width
pub const DETAILS_HEIGHT_FACTOR: f64 = 0.34;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    /// Template photo covering the banner
    BannerImage { uri: String },
    /// Gradient with the template title, for templates without an image
    BannerPlaceholder,
    CampaignStrip,
    Headline,
    Tagline,
    DetailsBackground,
    ProfilePhoto { uri: String },
    ProfilePlaceholder,
    Role,
    Name,
    Description,
    /// Icon in front of a contact line
    ContactIcon { icon: IconKind },
    Mobile,
    Address,
    Social,
    PrimaryStripe,
    SecondaryStripe,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub rect: Rect,
    pub text: String,
    pub elem_type: ElementType,
    pub scale: u32,
}

impl LayoutNode {
    fn block(rect: Rect, elem_type: ElementType) -> Self {
        Self {
            rect,
            text: String::new(),
            elem_type,
            scale: 0,
        }
    }

    fn text(rect: Rect, text: String, elem_type: ElementType, scale: u32) -> Self {
        Self {
            rect,
            text,
            elem_type,
            scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PosterLayout {
    pub width: u32,
    pub height: u32,
    pub banner_height: u32,
    /// Template title, shown on the placeholder banner
    pub title: String,
    pub nodes: Vec<LayoutNode>,
}

impl PosterLayout {
    pub fn find(&self, pred: impl Fn(&ElementType) -> bool) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| pred(&n.elem_type))
    }
}

/// Banner height for a canvas width and aspect ratio (never below one pixel).
/// The ratio is held to `MIN_ASPECT_RATIO..=MAX_ASPECT_RATIO`.
pub fn banner_height(canvas_width: u32, aspect_ratio: f64) -> u32 {
    if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
        return canvas_width.max(1);
    }
    let ratio = aspect_ratio.clamp(MIN_ASPECT_RATIO, MAX_ASPECT_RATIO);
    ((canvas_width as f64 / ratio).round() as u32).max(1)
}

/// Glyph scale so that roughly `divisor` pixels of width give one unit of scale
pub fn text_scale(canvas_width: u32, divisor: u32) -> u32 {
    (canvas_width / divisor).max(1)
}

pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * scale
}

/// Cut `text` so it fits in `max_width`, marking the cut with '.'
pub fn fit_text(text: &str, scale: u32, max_width: u32) -> String {
    let cell = GLYPH_SIZE * scale.max(1);
    let max_chars = (max_width / cell) as usize;
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    if max_chars <= 2 {
        return text.chars().take(max_chars).collect();
    }
    let mut out: String = text.chars().take(max_chars - 2).collect();
    out.push_str("..");
    out
}

/// Greedy word wrap into lines of at most `chars_per_line` characters
pub fn wrap_text(text: &str, chars_per_line: usize) -> Vec<String> {
    let chars_per_line = chars_per_line.max(1);
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        if cur.chars().count() + word.chars().count() + 1 > chars_per_line && !cur.is_empty() {
            lines.push(cur);
            cur = String::new();
        }
        if word.chars().count() > chars_per_line {
            // hard-break words longer than a line
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(chars_per_line) {
                if !cur.is_empty() {
                    lines.push(std::mem::take(&mut cur));
                }
                cur = chunk.iter().collect();
            }
            continue;
        }
        if !cur.is_empty() {
            cur.push(' ');
        }
        cur.push_str(word);
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

/// Compute the full poster layout for the session's current state
pub fn layout_poster(session: &CustomizationSession, canvas_width: u32, campaign: &CampaignText) -> PosterLayout {
    let width = canvas_width.clamp(1, MAX_CANVAS_WIDTH);
    let state = session.state();
    let template = session.template();
    let banner_h = banner_height(width, state.resolved_aspect_ratio);
    let details_h = ((width as f64 * DETAILS_HEIGHT_FACTOR).round() as u32).max(1);
    let mut nodes = Vec::new();

    // Banner
    let banner = Rect::new(0, 0, width, banner_h);
    match template.image_url() {
        Some(uri) => nodes.push(LayoutNode::block(banner, ElementType::BannerImage { uri: uri.to_string() })),
        None => nodes.push(LayoutNode::block(banner, ElementType::BannerPlaceholder)),
    }

    let pad = (width / 30).max(2);
    let headline_scale = text_scale(width, 180);
    let tagline_scale = text_scale(width, 270);
    let strip_h = (GLYPH_SIZE * (headline_scale + tagline_scale) + pad).min(banner_h);
    let strip = Rect::new(0, banner_h as i32 - strip_h as i32, width, strip_h);
    nodes.push(LayoutNode::block(strip, ElementType::CampaignStrip));

    let text_w = width.saturating_sub(pad * 2);
    let gap = pad / 4;
    let headline_y = strip.y + (pad / 2) as i32;
    nodes.push(LayoutNode::text(
        Rect::new(pad as i32, headline_y, text_w, GLYPH_SIZE * headline_scale),
        fit_text(&campaign.headline, headline_scale, text_w),
        ElementType::Headline,
        headline_scale,
    ));
    nodes.push(LayoutNode::text(
        Rect::new(
            pad as i32,
            headline_y + (GLYPH_SIZE * headline_scale + gap) as i32,
            text_w,
            GLYPH_SIZE * tagline_scale,
        ),
        fit_text(&campaign.tagline, tagline_scale, text_w),
        ElementType::Tagline,
        tagline_scale,
    ));

    // Details
    let top = banner_h as i32;
    nodes.push(LayoutNode::block(Rect::new(0, top, width, details_h), ElementType::DetailsBackground));

    let stripe_h = (details_h / 14).max(2);
    let content_h = details_h.saturating_sub(stripe_h * 2);
    let photo_d = ((content_h as f64) * 0.75).round() as u32;
    let photo = Rect::new(
        pad as i32,
        top + (content_h.saturating_sub(photo_d) / 2) as i32,
        photo_d,
        photo_d,
    );
    match state.profile_image_uri.as_deref() {
        Some(uri) => nodes.push(LayoutNode::block(photo, ElementType::ProfilePhoto { uri: uri.to_string() })),
        None => nodes.push(LayoutNode::block(photo, ElementType::ProfilePlaceholder)),
    }

    let col_x = pad * 2 + photo_d;
    let col_w = width.saturating_sub(col_x + pad);
    let role_scale = text_scale(width, 270);
    let name_scale = text_scale(width, 160);
    let desc_scale = text_scale(width, 360);
    let mut y = top + pad as i32;

    let role = fit_text(session.display_role(), role_scale, col_w);
    nodes.push(LayoutNode::text(
        Rect::new(col_x as i32, y, col_w, GLYPH_SIZE * role_scale),
        role,
        ElementType::Role,
        role_scale,
    ));
    y += (GLYPH_SIZE * role_scale + gap) as i32;

    let name = fit_text(session.display_name(), name_scale, col_w);
    nodes.push(LayoutNode::text(
        Rect::new(col_x as i32, y, col_w, GLYPH_SIZE * name_scale),
        name,
        ElementType::Name,
        name_scale,
    ));
    y += (GLYPH_SIZE * name_scale + gap * 2) as i32;

    let line_h = GLYPH_SIZE * desc_scale + gap / 2;
    let content_bottom = top + content_h as i32;

    // Contact lines sit at the foot of the column; the description gets what is left
    let contacts = [
        (IconKind::Phone, session.display_mobile(), ElementType::Mobile),
        (IconKind::MapMarker, session.display_address(), ElementType::Address),
        (IconKind::At, session.display_social(), ElementType::Social),
    ];
    let room = (content_bottom - y).max(0) as u32;
    let contact_count = contacts.len().min((room / line_h.max(1)) as usize);
    let limit = content_bottom - (line_h * contact_count as u32) as i32;
    let icon_size = GLYPH_SIZE * desc_scale;
    let contact_x = col_x + icon_size + gap;
    let contact_w = col_w.saturating_sub(icon_size + gap);
    for (i, (icon, text, elem_type)) in contacts.into_iter().take(contact_count).enumerate() {
        let line_y = limit + (line_h * i as u32) as i32;
        nodes.push(LayoutNode::block(
            Rect::new(col_x as i32, line_y, icon_size, icon_size),
            ElementType::ContactIcon { icon },
        ));
        nodes.push(LayoutNode::text(
            Rect::new(contact_x as i32, line_y, contact_w, icon_size),
            fit_text(text, desc_scale, contact_w),
            elem_type,
            desc_scale,
        ));
    }

    let available = (limit - y).max(0) as u32;
    let max_lines = (available / line_h.max(1)) as usize;
    let chars_per_line = (col_w / (GLYPH_SIZE * desc_scale)) as usize;
    let mut lines = wrap_text(session.display_description(), chars_per_line);
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            *last = fit_text(&format!("{}..", last), desc_scale, col_w);
        }
    }
    if !lines.is_empty() {
        let h = line_h * lines.len() as u32;
        nodes.push(LayoutNode::text(
            Rect::new(col_x as i32, y, col_w, h),
            lines.join("\n"),
            ElementType::Description,
            desc_scale,
        ));
    }

    let stripes_y = content_bottom;
    nodes.push(LayoutNode::block(
        Rect::new(0, stripes_y, width, stripe_h),
        ElementType::PrimaryStripe,
    ));
    nodes.push(LayoutNode::block(
        Rect::new(
            0,
            stripes_y + stripe_h as i32,
            width,
            details_h.saturating_sub(content_h + stripe_h),
        ),
        ElementType::SecondaryStripe,
    ));

    let height = banner_h.saturating_add(details_h);
    log::debug!(
        "layout: {}x{} banner={} ratio={:.3} nodes={}",
        width,
        height,
        banner_h,
        state.resolved_aspect_ratio,
        nodes.len()
    );

    PosterLayout {
        width,
        height,
        banner_height: banner_h,
        title: template.title.clone(),
        nodes,
    }
}
