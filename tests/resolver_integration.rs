//! Template resolution against a local HTTP server

#![cfg(feature = "remote")]

use image::{ImageFormat, RgbaImage};
use posterkit::catalog::PosterTemplate;
use posterkit::loader::DefaultAssetLoader;
use posterkit::rendering::ElementType;
use posterkit::resolver::{DecodingProbe, TemplateResolver};
use posterkit::{CampaignText, CompositionView, CustomizationSession, StudioConfig};
use std::io::Cursor;
use std::sync::{Arc, Once};
use tiny_http::{Response, Server};

static INIT: Once = Once::new();
const BASE: &str = "http://127.0.0.1:18190";

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, image::Rgba([200, 30, 30, 255]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn start_test_server() -> &'static str {
    INIT.call_once(|| {
        std::thread::spawn(|| {
            let server = Server::http("127.0.0.1:18190").unwrap();
            for request in server.incoming_requests() {
                let response = match request.url() {
                    "/wide.png" => Response::from_data(png(400, 200)),
                    "/tall.png" => Response::from_data(png(200, 400)),
                    "/sliver.png" => Response::from_data(png(1, 60_000)),
                    "/garbage.png" => Response::from_data(b"not an image".to_vec()),
                    _ => Response::from_string("Not Found").with_status_code(404),
                };
                let _ = request.respond(response);
            }
        });
        std::thread::sleep(std::time::Duration::from_millis(100));
    });
    BASE
}

fn resolver() -> (TemplateResolver, Arc<DefaultAssetLoader>) {
    let loader = Arc::new(DefaultAssetLoader::new(&StudioConfig::default()).unwrap());
    (TemplateResolver::new(Arc::new(DecodingProbe::new(loader.clone()))), loader)
}

fn template(id: &str, url: &str) -> PosterTemplate {
    PosterTemplate::new(id, "Rally", "Events", 0, Some(url))
}

#[tokio::test]
async fn ratio_comes_from_the_template_image() {
    let base = start_test_server();
    let (resolver, _) = resolver();
    let mut session = CustomizationSession::open(template("wide", &format!("{}/wide.png", base)), 1.5);

    assert!(resolver.refresh(&mut session).await);
    assert_eq!(session.state().resolved_aspect_ratio, 2.0);
    // already resolved: nothing pending
    assert!(!resolver.refresh(&mut session).await);
}

#[tokio::test]
async fn missing_image_keeps_fallback_and_placeholder() {
    let base = start_test_server();
    let (resolver, loader) = resolver();
    let mut session = CustomizationSession::open(template("gone", &format!("{}/missing.png", base)), 1.5);

    assert!(!resolver.refresh(&mut session).await);
    assert_eq!(session.state().resolved_aspect_ratio, 1.5);

    let mut view = CompositionView::new(300, CampaignText::default());
    assert_eq!(view.load_assets(&session, loader.as_ref()).await, 0);
    view.update(&session);
    let layout = view.layout().unwrap();
    assert!(layout.find(|e| matches!(e, ElementType::BannerImage { .. })).is_some());
    // the banner paints the placeholder gradient rather than an image
    assert!(view.images().is_empty());
    assert_eq!(view.render().unwrap().height(), 200 + 102);
}

#[tokio::test]
async fn undecodable_image_keeps_fallback() {
    let base = start_test_server();
    let (resolver, _) = resolver();
    let mut session = CustomizationSession::open(template("bad", &format!("{}/garbage.png", base)), 1.5);
    assert!(!resolver.refresh(&mut session).await);
    assert_eq!(session.state().resolved_aspect_ratio, 1.5);
}

#[tokio::test]
async fn sliver_template_keeps_fallback_and_bounded_canvas() {
    let base = start_test_server();
    let (resolver, _) = resolver();
    let mut session = CustomizationSession::open(template("sliver", &format!("{}/sliver.png", base)), 1.5);

    assert!(!resolver.refresh(&mut session).await);
    assert_eq!(session.state().resolved_aspect_ratio, 1.5);

    let mut view = CompositionView::new(1080, CampaignText::default());
    view.update(&session);
    let layout = view.layout().unwrap();
    assert_eq!(layout.banner_height, 720);
    assert_eq!(layout.height, 720 + 367);
}

#[tokio::test]
async fn late_result_for_previous_template_is_ignored() {
    let base = start_test_server();
    let (resolver, _) = resolver();
    let mut session = CustomizationSession::open(template("wide", &format!("{}/wide.png", base)), 1.5);

    let stale = resolver.spawn(session.pending_ticket().unwrap());
    let ticket = session
        .select_template(template("tall", &format!("{}/tall.png", base)))
        .unwrap();
    let current = resolver.spawn(ticket);

    let current = current.await.unwrap();
    assert!(session.apply_resolution(current));
    assert_eq!(session.state().resolved_aspect_ratio, 0.5);

    let stale = stale.await.unwrap();
    assert!(stale.outcome.is_ok());
    assert!(!session.apply_resolution(stale));
    assert_eq!(session.state().resolved_aspect_ratio, 0.5);
}

#[tokio::test]
async fn banner_is_loaded_for_composition() {
    let base = start_test_server();
    let (resolver, loader) = resolver();
    let url = format!("{}/wide.png", base);
    let mut session = CustomizationSession::open(template("wide", &url), 1.5);
    resolver.refresh(&mut session).await;

    let mut view = CompositionView::new(400, CampaignText::default());
    assert_eq!(view.load_assets(&session, loader.as_ref()).await, 1);
    assert!(view.images().contains(&url));
    view.update(&session);
    let pixels = view.render().unwrap();
    assert_eq!(pixels.width(), 400);
    // banner is 400 / 2.0 tall and shows the served red image
    let p = pixels.get_pixel(200, 100);
    assert!(p[0] > 150 && p[1] < 80, "unexpected banner pixel {:?}", p);
}
