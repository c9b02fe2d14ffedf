pub mod conversion;
pub mod templates;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse},
    routing::{get, post},
};
use uuid::Uuid;

use conversion::{ConvertError, convert_fit_bytes};
use templates::{render_conversion_result, render_landing_page};

/// Converted documents waiting to be downloaded, keyed by the opaque token
/// embedded in the result page. Entries live for the lifetime of the
/// process.
#[derive(Clone, Default)]
pub struct DownloadStore {
    entries: Arc<Mutex<HashMap<Uuid, String>>>,
}

impl DownloadStore {
    fn insert(&self, xml: String) -> Uuid {
        let token = Uuid::new_v4();
        self.entries
            .lock()
            .expect("download store lock")
            .insert(token, xml);
        token
    }

    fn get(&self, token: &Uuid) -> Option<String> {
        self.entries
            .lock()
            .expect("download store lock")
            .get(token)
            .cloned()
    }
}

pub fn build_app() -> Router {
    Router::new()
        .route("/", get(landing_page))
        .route("/upload", post(handle_upload))
        .route("/download/:token", get(handle_download))
        .with_state(DownloadStore::default())
}

async fn landing_page() -> Html<String> {
    Html(render_landing_page())
}

async fn handle_upload(
    State(store): State<DownloadStore>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut uploaded: Option<Vec<u8>> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            match field.bytes().await {
                Ok(bytes) => {
                    uploaded = Some(bytes.to_vec());
                }
                Err(err) => {
                    return (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read uploaded file: {err}"),
                    )
                        .into_response();
                }
            }
        }
    }

    let file_bytes = match uploaded {
        Some(bytes) => bytes,
        None => return (StatusCode::BAD_REQUEST, "No file provided").into_response(),
    };

    match convert_fit_bytes(&file_bytes) {
        Ok(converted) => {
            let token = store.insert(converted.xml.clone());
            tracing::info!(
                sport = converted.document.activity.sport,
                laps = converted.document.activity.laps.len(),
                "converted uploaded FIT file"
            );
            Html(render_conversion_result(
                &converted,
                &format!("/download/{token}"),
            ))
            .into_response()
        }
        Err(err) => render_conversion_error(err),
    }
}

async fn handle_download(
    State(store): State<DownloadStore>,
    Path(token): Path<String>,
) -> impl IntoResponse {
    let token = match Uuid::parse_str(&token) {
        Ok(token) => token,
        Err(_) => return StatusCode::NOT_FOUND.into_response(),
    };

    match store.get(&token) {
        Some(xml) => (
            [
                (header::CONTENT_TYPE, "application/vnd.garmin.tcx+xml"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"activity.tcx\"",
                ),
            ],
            xml,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn render_conversion_error(error: ConvertError) -> axum::response::Response {
    tracing::warn!("conversion failed: {error}");
    (StatusCode::BAD_REQUEST, error.to_string()).into_response()
}
