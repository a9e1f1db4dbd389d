//! Live composition view: layout -> paint -> raster
//!
//! The view renders exactly the pixels that get exported. Nothing outside
//! the poster itself (buttons, selection borders, modals) is ever laid out.

pub mod layout;
pub mod paint;
pub mod palette;
pub mod raster;

use crate::loader::AssetLoader;
use crate::session::CustomizationSession;
use crate::{CampaignText, Error, Result};
use image::{DynamicImage, RgbaImage};
use std::collections::HashMap;

pub use layout::{ElementType, LayoutNode, PosterLayout, Rect};
pub use paint::PaintCommand;
pub use palette::{FrameStyle, Palette};

/// Decoded images keyed by the URI they were loaded from
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    images: HashMap<String, DynamicImage>,
}

impl ImageCache {
    pub fn insert(&mut self, uri: &str, image: DynamicImage) {
        self.images.insert(uri.to_string(), image);
    }

    pub fn get(&self, uri: &str) -> Option<&DynamicImage> {
        self.images.get(uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.images.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    fn retain_only(&mut self, keep: &[&str]) {
        self.images.retain(|k, _| keep.contains(&k.as_str()));
    }
}

/// The on-screen poster; previewed and captured from the same tree
pub struct CompositionView {
    canvas_width: u32,
    campaign: CampaignText,
    images: ImageCache,
    layout: Option<PosterLayout>,
    palette: Palette,
}

impl CompositionView {
    pub fn new(canvas_width: u32, campaign: CampaignText) -> Self {
        Self {
            canvas_width,
            campaign,
            images: ImageCache::default(),
            layout: None,
            palette: Palette::default(),
        }
    }

    /// Re-layout from the session; call after any field or ratio change
    pub fn update(&mut self, session: &CustomizationSession) {
        self.layout = Some(layout::layout_poster(session, self.canvas_width, &self.campaign));
        self.palette = session.state().frame.palette();
    }

    /// Load and decode the banner and profile images the session refers to.
    /// Failures are logged; the view then paints the placeholder instead.
    /// Returns the number of images available afterwards.
    pub async fn load_assets(&mut self, session: &CustomizationSession, loader: &dyn AssetLoader) -> usize {
        let banner = session.template().image_url().map(str::to_string);
        let profile = session.state().profile_image_uri.clone();

        let wanted: Vec<&str> = [banner.as_deref(), profile.as_deref()].into_iter().flatten().collect();
        self.images.retain_only(&wanted);

        let fetch = |uri: Option<String>| {
            let cached = uri.as_deref().map(|u| self.images.contains(u)).unwrap_or(true);
            async move {
                match uri {
                    Some(uri) if !cached => {
                        let decoded = decode_asset(loader, &uri).await;
                        Some((uri, decoded))
                    }
                    _ => None,
                }
            }
        };
        let (banner_res, profile_res) = futures::join!(fetch(banner), fetch(profile));

        for (uri, decoded) in [banner_res, profile_res].into_iter().flatten() {
            match decoded {
                Ok(img) => self.images.insert(&uri, img),
                Err(e) => log::warn!("composition: could not load {}: {}", uri, e),
            }
        }
        self.images.len()
    }

    /// Attach an already-decoded image (e.g. a background-removed photo)
    pub fn insert_image(&mut self, uri: &str, image: DynamicImage) {
        self.images.insert(uri, image);
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    pub fn layout(&self) -> Option<&PosterLayout> {
        self.layout.as_ref()
    }

    /// True once laid out with a non-empty size
    pub fn is_mounted(&self) -> bool {
        self.layout
            .as_ref()
            .map(|l| l.width > 0 && l.height > 0)
            .unwrap_or(false)
    }

    pub fn paint_commands(&self) -> Result<Vec<PaintCommand>> {
        let layout = self.mounted_layout()?;
        Ok(paint::paint_layout(layout, &self.palette, &self.images))
    }

    /// Rasterize the current composition
    pub fn render(&self) -> Result<RgbaImage> {
        let layout = self.mounted_layout()?;
        let commands = paint::paint_layout(layout, &self.palette, &self.images);
        Ok(raster::rasterize(layout.width, layout.height, &commands, &self.images))
    }

    fn mounted_layout(&self) -> Result<&PosterLayout> {
        match &self.layout {
            Some(l) if l.width > 0 && l.height > 0 => Ok(l),
            _ => Err(Error::RenderError("composition view is not mounted".into())),
        }
    }
}

async fn decode_asset(loader: &dyn AssetLoader, uri: &str) -> Result<DynamicImage> {
    let bytes = loader.fetch(uri).await?;
    image::load_from_memory(&bytes).map_err(|e| Error::DecodeError(format!("{}: {}", uri, e)))
}
