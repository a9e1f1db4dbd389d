//! Poster API catalog and background removal services against a local HTTP server

#![cfg(feature = "remote")]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, RgbaImage};
use posterkit::catalog::{HttpCatalog, TemplateSource};
use posterkit::loader::DefaultAssetLoader;
use posterkit::platform::{BackgroundRemover, DataUrlRemover, Platform, PlatformKind, RembgServiceRemover};
use posterkit::{Error, StudioConfig};
use std::io::{Cursor, Read};
use std::sync::{Arc, Once};
use tiny_http::{Response, Server};

static INIT: Once = Once::new();
const BASE: &str = "http://127.0.0.1:18191";

fn png() -> Vec<u8> {
    let img = RgbaImage::from_pixel(3, 2, image::Rgba([0, 0, 0, 0]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn json(body: String) -> Response<Cursor<Vec<u8>>> {
    Response::from_string(body).with_header(
        "Content-Type: application/json"
            .parse::<tiny_http::Header>()
            .unwrap(),
    )
}

fn start_test_server() -> &'static str {
    INIT.call_once(|| {
        std::thread::spawn(|| {
            let server = Server::http("127.0.0.1:18191").unwrap();
            for mut request in server.incoming_requests() {
                let mut body = Vec::new();
                let _ = request.as_reader().read_to_end(&mut body);
                let authorized = request
                    .headers()
                    .iter()
                    .any(|h| h.field.equiv("Authorization") && h.value.as_str() == "Bearer secret");
                let url = request.url().to_string();
                let response = match url.as_str() {
                    "/posters" => json(
                        r#"{"posters":[
                            {"_id":"p1","title":"Holi Greetings","category":"Festivals","downloadCount":12,"imageUrl":"https://cdn/holi.jpg"},
                            {"_id":"p2","title":"Sampark","category":"Events","imageUrl":""}
                        ]}"#
                        .to_string(),
                    ),
                    "/bare/posters" => json(r#"[{"id":"b1","title":"Bare"}]"#.to_string()),
                    "/remove-bg" => {
                        let has_field = String::from_utf8_lossy(&body).contains("name=\"image\"");
                        if !authorized {
                            Response::from_string("unauthorized").with_status_code(401)
                        } else if has_field {
                            Response::from_data(png())
                        } else {
                            Response::from_string("No image file provided").with_status_code(400)
                        }
                    }
                    "/ai/remove-background" => {
                        let sent_data_url = String::from_utf8_lossy(&body).contains("data:image/jpeg;base64,");
                        json(format!(
                            r#"{{"success":{},"image":"data:image/png;base64,{}"}}"#,
                            sent_data_url,
                            STANDARD.encode(png())
                        ))
                    }
                    "/ai/remove-background-link" => json(format!(
                        r#"{{"success":true,"image":"{}/result.png"}}"#,
                        BASE
                    )),
                    "/result.png" => Response::from_data(png()),
                    "/ai/offline" => json(r#"{"success":false,"error":"model offline"}"#.to_string()),
                    _ => Response::from_string("Not Found").with_status_code(404),
                };
                let _ = request.respond(response);
            }
        });
        std::thread::sleep(std::time::Duration::from_millis(100));
    });
    BASE
}

fn config(endpoint: &str) -> StudioConfig {
    let mut c = StudioConfig::default();
    c.background_removal.endpoint = Some(endpoint.to_string());
    c
}

fn data_url_remover(endpoint: &str) -> DataUrlRemover {
    let c = config(endpoint);
    let loader = Arc::new(DefaultAssetLoader::new(&c).unwrap());
    DataUrlRemover::new(&c, loader).unwrap()
}

#[tokio::test]
async fn catalog_reads_wrapped_and_bare_lists() {
    let base = start_test_server();
    let c = StudioConfig::default();

    let wrapped = HttpCatalog::new(base, &c).unwrap().templates().await.unwrap();
    assert_eq!(wrapped.len(), 2);
    assert_eq!(wrapped[0].id, "p1");
    assert_eq!(wrapped[0].download_count, 12);
    assert_eq!(wrapped[1].image_url(), None);

    let bare = HttpCatalog::new(&format!("{}/bare/", base), &c)
        .unwrap()
        .templates()
        .await
        .unwrap();
    assert_eq!(bare[0].title, "Bare");
}

#[tokio::test]
async fn catalog_reports_http_errors() {
    let base = start_test_server();
    let err = HttpCatalog::new(&format!("{}/nowhere", base), &StudioConfig::default())
        .unwrap()
        .templates()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NetworkError(_)));
}

#[tokio::test]
async fn data_url_service_returns_decoded_image() {
    let base = start_test_server();
    let remover = data_url_remover(&format!("{}/ai/remove-background", base));
    let out = remover.remove_background(b"\xFF\xD8fake jpeg").await.unwrap();
    assert_eq!(out, png());
}

#[tokio::test]
async fn data_url_service_result_may_be_a_link() {
    let base = start_test_server();
    let remover = data_url_remover(&format!("{}/ai/remove-background-link", base));
    assert_eq!(remover.remove_background(b"jpeg").await.unwrap(), png());
}

#[tokio::test]
async fn data_url_service_error_is_surfaced() {
    let base = start_test_server();
    let remover = data_url_remover(&format!("{}/ai/offline", base));
    match remover.remove_background(b"jpeg").await {
        Err(Error::BackgroundRemovalError(msg)) => assert_eq!(msg, "model offline"),
        other => panic!("expected service error, got {:?}", other.map(|b| b.len())),
    }
}

#[tokio::test]
async fn rembg_service_sends_bearer_token() {
    let base = start_test_server();
    let endpoint = format!("{}/remove-bg", base);

    let anonymous = RembgServiceRemover::new(&config(&endpoint)).unwrap();
    assert!(matches!(
        anonymous.remove_background(b"jpeg").await,
        Err(Error::BackgroundRemovalError(_))
    ));

    let mut c = config(&endpoint);
    c.background_removal.auth_token = Some("secret".into());
    let remover = RembgServiceRemover::new(&c).unwrap();
    let out = remover.remove_background(b"jpeg").await.unwrap();
    assert!(out.starts_with(&[0x89, b'P', b'N', b'G']));
}

#[tokio::test]
async fn web_platform_uses_multipart_service() {
    let base = start_test_server();
    let dir = tempfile::tempdir().unwrap();
    let mut c = config(&format!("{}/remove-bg", base));
    c.background_removal.auth_token = Some("secret".into());
    c.library_root = Some(dir.path().to_path_buf());

    let platform = Platform::for_kind(PlatformKind::Web, &c).unwrap();
    let remover = platform.background_remover.expect("endpoint configured");
    assert!(remover.remove_background(b"jpeg").await.is_ok());
}
