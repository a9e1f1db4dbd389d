//! Closed icon set
//!
//! Every icon the poster can draw is a variant here with its own painter, so a
//! misspelt icon name fails at parse time instead of drawing nothing.

use crate::rendering::layout::Rect;
use crate::rendering::paint::PaintCommand;
use crate::rendering::palette::Rgba;
use crate::Error;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconKind {
    Account,
    Bell,
    Calendar,
    Camera,
    Download,
    Phone,
    MapMarker,
    At,
}

impl IconKind {
    pub const ALL: [IconKind; 8] = [
        IconKind::Account,
        IconKind::Bell,
        IconKind::Calendar,
        IconKind::Camera,
        IconKind::Download,
        IconKind::Phone,
        IconKind::MapMarker,
        IconKind::At,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IconKind::Account => "account",
            IconKind::Bell => "bell",
            IconKind::Calendar => "calendar",
            IconKind::Camera => "camera",
            IconKind::Download => "download",
            IconKind::Phone => "phone",
            IconKind::MapMarker => "map-marker",
            IconKind::At => "at",
        }
    }

    /// Paint commands drawing this icon inside `rect`
    pub fn paint(&self, rect: Rect, color: Rgba) -> Vec<PaintCommand> {
        let x = rect.x as f32;
        let y = rect.y as f32;
        let w = rect.width as f32;
        let h = rect.height as f32;
        let cx = x + w / 2.0;
        let px = |fx: f32| (x + w * fx).round() as i32;
        let py = |fy: f32| (y + h * fy).round() as i32;
        let sw = |fw: f32| (w * fw).round().max(1.0) as u32;
        let sh = |fh: f32| (h * fh).round().max(1.0) as u32;
        let solid = |fx: f32, fy: f32, fw: f32, fh: f32| PaintCommand::SolidRect {
            x: px(fx),
            y: py(fy),
            width: sw(fw),
            height: sh(fh),
            rgba: color,
        };

        match self {
            IconKind::Account => vec![
                PaintCommand::Disc {
                    cx,
                    cy: y + h * 0.36,
                    radius: w.min(h) * 0.18,
                    rgba: color,
                },
                PaintCommand::HalfDisc {
                    cx,
                    cy: y + h * 0.9,
                    radius: w.min(h) * 0.32,
                    rgba: color,
                },
            ],
            IconKind::Bell => vec![
                PaintCommand::HalfDisc {
                    cx,
                    cy: y + h * 0.55,
                    radius: w.min(h) * 0.3,
                    rgba: color,
                },
                solid(0.2, 0.55, 0.6, 0.15),
                PaintCommand::Disc {
                    cx,
                    cy: y + h * 0.78,
                    radius: w.min(h) * 0.07,
                    rgba: color,
                },
            ],
            IconKind::Calendar => vec![
                solid(0.15, 0.22, 0.7, 0.12),
                solid(0.15, 0.4, 0.7, 0.45),
                solid(0.3, 0.12, 0.08, 0.15),
                solid(0.62, 0.12, 0.08, 0.15),
            ],
            IconKind::Camera => vec![
                solid(0.1, 0.32, 0.8, 0.5),
                solid(0.35, 0.22, 0.3, 0.12),
                PaintCommand::Disc {
                    cx,
                    cy: y + h * 0.57,
                    radius: w.min(h) * 0.16,
                    rgba: (255, 255, 255, 200),
                },
            ],
            IconKind::Download => vec![
                solid(0.44, 0.12, 0.12, 0.4),
                solid(0.3, 0.52, 0.4, 0.08),
                solid(0.37, 0.6, 0.26, 0.08),
                solid(0.15, 0.8, 0.7, 0.08),
            ],
            // handset: earpiece and mouthpiece joined by a slanted grip
            IconKind::Phone => vec![
                solid(0.15, 0.12, 0.3, 0.2),
                solid(0.15, 0.3, 0.18, 0.4),
                solid(0.25, 0.62, 0.25, 0.14),
                solid(0.45, 0.68, 0.35, 0.2),
            ],
            IconKind::MapMarker => vec![
                PaintCommand::Disc {
                    cx,
                    cy: y + h * 0.38,
                    radius: w.min(h) * 0.28,
                    rgba: color,
                },
                solid(0.4, 0.5, 0.2, 0.25),
                solid(0.46, 0.75, 0.08, 0.13),
                PaintCommand::Disc {
                    cx,
                    cy: y + h * 0.38,
                    radius: w.min(h) * 0.1,
                    rgba: (255, 255, 255, 220),
                },
            ],
            IconKind::At => vec![
                PaintCommand::Disc {
                    cx,
                    cy: y + h * 0.5,
                    radius: w.min(h) * 0.38,
                    rgba: color,
                },
                PaintCommand::Disc {
                    cx,
                    cy: y + h * 0.5,
                    radius: w.min(h) * 0.26,
                    rgba: (255, 255, 255, 220),
                },
                PaintCommand::Disc {
                    cx,
                    cy: y + h * 0.5,
                    radius: w.min(h) * 0.12,
                    rgba: color,
                },
                solid(0.62, 0.5, 0.1, 0.3),
            ],
        }
    }
}

impl FromStr for IconKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IconKind::ALL
            .into_iter()
            .find(|k| k.name() == s.trim())
            .ok_or_else(|| Error::UnknownIcon(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names_only() {
        assert_eq!("bell".parse::<IconKind>().unwrap(), IconKind::Bell);
        assert_eq!(" camera ".parse::<IconKind>().unwrap(), IconKind::Camera);
        assert_eq!("map-marker".parse::<IconKind>().unwrap(), IconKind::MapMarker);
        assert_eq!("phone".parse::<IconKind>().unwrap(), IconKind::Phone);
        assert!(matches!("calender".parse::<IconKind>(), Err(Error::UnknownIcon(_))));
    }

    #[test]
    fn every_icon_paints_inside_its_box() {
        let rect = Rect::new(10, 20, 100, 100);
        for kind in IconKind::ALL {
            let cmds = kind.paint(rect, (0, 0, 0, 255));
            assert!(!cmds.is_empty(), "{:?} painted nothing", kind);
            for cmd in cmds {
                if let PaintCommand::SolidRect { x, y, width, height, .. } = cmd {
                    assert!(x >= 10 && y >= 20);
                    assert!(x + width as i32 <= 110 && y + height as i32 <= 120);
                }
            }
        }
    }
}
