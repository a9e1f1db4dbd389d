//! Customization session: the state behind one open poster editor
//!
//! A session owns exactly one [`CustomizationState`]. It is created when the
//! user opens a template and dropped when the editor closes; nothing is shared
//! between sessions.

use crate::catalog::PosterTemplate;
use crate::rendering::palette::FrameStyle;
use crate::resolver::{Dimensions, Resolution};
use serde::Serialize;

pub const NAME_PLACEHOLDER: &str = "Your Name";
pub const ROLE_PLACEHOLDER: &str = "MLA";
pub const DESCRIPTION_PLACEHOLDER: &str = "Write a few words about yourself";
pub const MOBILE_PLACEHOLDER: &str = "+91 98765 43210";
pub const ADDRESS_PLACEHOLDER: &str = "Lucknow, Uttar Pradesh";
pub const SOCIAL_PLACEHOLDER: &str = "@samajwadiparty";

/// User-entered poster details plus the resolved banner ratio
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomizationState {
    pub name: String,
    pub role: String,
    pub description: String,
    /// Contact lines; empty ones print their placeholder
    pub mobile: String,
    pub address: String,
    pub social: String,
    pub profile_image_uri: Option<String>,
    pub resolved_aspect_ratio: f64,
    pub frame: FrameStyle,
}

impl CustomizationState {
    fn new(fallback_ratio: f64) -> Self {
        Self {
            name: String::new(),
            role: String::new(),
            description: String::new(),
            mobile: String::new(),
            address: String::new(),
            social: String::new(),
            profile_image_uri: None,
            resolved_aspect_ratio: fallback_ratio,
            frame: FrameStyle::default(),
        }
    }
}

/// Key for one template load; results for any other key are stale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionTicket {
    pub url: String,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct CustomizationSession {
    template: PosterTemplate,
    state: CustomizationState,
    fallback_ratio: f64,
    generation: u64,
    resolved: bool,
}

impl CustomizationSession {
    /// Open a session for `template`; the ratio starts at `fallback_ratio`
    pub fn open(template: PosterTemplate, fallback_ratio: f64) -> Self {
        Self {
            template,
            state: CustomizationState::new(fallback_ratio),
            fallback_ratio,
            generation: 0,
            resolved: false,
        }
    }

    pub fn template(&self) -> &PosterTemplate {
        &self.template
    }

    pub fn state(&self) -> &CustomizationState {
        &self.state
    }

    pub fn fallback_ratio(&self) -> f64 {
        self.fallback_ratio
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.state.name = name.into();
    }

    pub fn set_role(&mut self, role: impl Into<String>) {
        self.state.role = role.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.state.description = description.into();
    }

    pub fn set_mobile(&mut self, mobile: impl Into<String>) {
        self.state.mobile = mobile.into();
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.state.address = address.into();
    }

    pub fn set_social(&mut self, social: impl Into<String>) {
        self.state.social = social.into();
    }

    pub fn set_frame(&mut self, frame: FrameStyle) {
        self.state.frame = frame;
    }

    /// Explicit user image selection; the only writer of `profile_image_uri`
    pub fn select_profile_image(&mut self, uri: impl Into<String>) {
        self.state.profile_image_uri = Some(uri.into());
    }

    pub fn clear_profile_image(&mut self) {
        self.state.profile_image_uri = None;
    }

    /// Switch template. Starts a new load: the ratio falls back and any
    /// in-flight resolution for the previous template becomes stale.
    pub fn select_template(&mut self, template: PosterTemplate) -> Option<ResolutionTicket> {
        self.template = template;
        self.generation += 1;
        self.resolved = false;
        self.state.resolved_aspect_ratio = self.fallback_ratio;
        self.pending_ticket()
    }

    /// Ticket for the current template, unless it has no image or is already resolved
    pub fn pending_ticket(&self) -> Option<ResolutionTicket> {
        if self.resolved {
            return None;
        }
        self.template.image_url().map(|url| ResolutionTicket {
            url: url.to_string(),
            generation: self.generation,
        })
    }

    /// Apply a resolution result. Stale, duplicate, failed or degenerate
    /// results leave the ratio untouched. Returns true when the ratio changed.
    pub fn apply_resolution(&mut self, resolution: Resolution) -> bool {
        let Resolution { ticket, outcome } = resolution;
        if ticket.generation != self.generation || self.template.image_url() != Some(ticket.url.as_str()) {
            log::debug!(
                "session: ignoring stale resolution for {} (generation {}, current {})",
                ticket.url,
                ticket.generation,
                self.generation
            );
            return false;
        }
        if self.resolved {
            return false;
        }
        match outcome {
            Ok(dims) => self.apply_dimensions(dims),
            Err(e) => {
                log::warn!("session: resolution failed for {}: {}", ticket.url, e);
                false
            }
        }
    }

    fn apply_dimensions(&mut self, dims: Dimensions) -> bool {
        match dims.aspect_ratio() {
            Some(ratio) => {
                self.state.resolved_aspect_ratio = ratio;
                self.resolved = true;
                true
            }
            None => {
                log::warn!(
                    "session: degenerate template size {}x{}, keeping fallback ratio",
                    dims.width,
                    dims.height
                );
                false
            }
        }
    }

    pub fn display_name(&self) -> &str {
        non_empty_or(&self.state.name, NAME_PLACEHOLDER)
    }

    pub fn display_role(&self) -> &str {
        non_empty_or(&self.state.role, ROLE_PLACEHOLDER)
    }

    pub fn display_description(&self) -> &str {
        non_empty_or(&self.state.description, DESCRIPTION_PLACEHOLDER)
    }

    pub fn display_mobile(&self) -> &str {
        non_empty_or(&self.state.mobile, MOBILE_PLACEHOLDER)
    }

    pub fn display_address(&self) -> &str {
        non_empty_or(&self.state.address, ADDRESS_PLACEHOLDER)
    }

    pub fn display_social(&self) -> &str {
        non_empty_or(&self.state.social, SOCIAL_PLACEHOLDER)
    }
}

fn non_empty_or<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}
