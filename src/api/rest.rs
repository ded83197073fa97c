// =============================================================================
// HTTP Endpoints — Axum 0.7
// =============================================================================
//
//   GET  /                     ticker picker
//   POST /fetch                run the pipeline, write the export, show results
//   GET  /download/:filename   send a previously written export as attachment
//   GET  /health               liveness probe
//
// Every pipeline failure collapses into the same inline error fragment; the
// cause only shows up in the logs.
// =============================================================================

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Form, Json, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::api::pages::{IndexView, TableView};
use crate::app_state::AppState;
use crate::export::{is_safe_file_name, save_export};
use crate::pipeline::fetch_trailing_window;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full router with request tracing and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/fetch", post(fetch))
        .route("/download/:filename", get(download))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Errors
// =============================================================================

/// Internal failure after the pipeline itself succeeded (template rendering,
/// export I/O). Logged and reported as a bare 500.
pub struct PageError(anyhow::Error);

impl From<anyhow::Error> for PageError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        error!(error = %format!("{:#}", self.0), "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

// =============================================================================
// Home
// =============================================================================

async fn home(State(state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    let html = state.pages.index(&IndexView::form(&state.config.tickers))?;
    Ok(Html(html))
}

// =============================================================================
// Fetch
// =============================================================================

#[derive(Deserialize)]
struct FetchForm {
    ticker: String,
}

async fn fetch(
    State(state): State<Arc<AppState>>,
    Form(form): Form<FetchForm>,
) -> Result<Html<String>, PageError> {
    let ticker = form.ticker.trim();
    let today = chrono::Local::now().date_naive();

    let window = match fetch_trailing_window(
        state.source.as_ref(),
        ticker,
        state.config.lookback_days,
        today,
    )
    .await
    {
        Ok(window) => window,
        Err(e) => {
            warn!(ticker, error = %e, "error while fetching data");
            return Ok(Html(state.pages.fetch_error(ticker)?));
        }
    };

    let export_dir = state.config.export_dir.clone();
    let export_ticker = ticker.to_string();
    let (filename, document) =
        tokio::task::spawn_blocking(move || save_export(&export_dir, &export_ticker, window))
            .await
            .context("export task failed")??;
    let json_data = document.to_pretty_json()?;

    info!(ticker, rows = document.stock_data.len(), file = %filename, "fetch complete");

    let view = IndexView {
        selected: Some(ticker),
        table: Some(TableView::from_rows(&document.stock_data)),
        download_name: Some(filename.as_str()),
        json_data: Some(json_data),
        ..IndexView::form(&state.config.tickers)
    };
    Ok(Html(state.pages.index(&view)?))
}

// =============================================================================
// Download
// =============================================================================

async fn download(State(state): State<Arc<AppState>>, Path(filename): Path<String>) -> Response {
    if !is_safe_file_name(&filename) {
        warn!(filename = %filename, "rejected download outside export dir");
        return (StatusCode::BAD_REQUEST, "Invalid file name").into_response();
    }

    let path = state.config.export_dir.join(&filename);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/json".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "File not found").into_response()
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to read export");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
    uptime_secs: u64,
    tickers: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        tickers: state.config.tickers.len(),
    })
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::runtime_config::RuntimeConfig;
    use crate::test_support::{synthetic_bars, FakeSource};

    struct Harness {
        app: Router,
        dir: tempfile::TempDir,
    }

    fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let config = RuntimeConfig {
            export_dir: dir.path().to_path_buf(),
            ..RuntimeConfig::default()
        };
        let source = Arc::new(FakeSource::with_bars("TCS.NS", synthetic_bars(250)));
        let state = Arc::new(AppState::new(config, source).unwrap());
        Harness {
            app: router(state),
            dir,
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_ticker(ticker: &str) -> Request<Body> {
        let body = format!("ticker={}", ticker.replace('<', "%3C").replace('>', "%3E"));
        Request::builder()
            .method("POST")
            .uri("/fetch")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn home_lists_configured_tickers() {
        let h = harness();
        let (status, _, body) = send(&h.app, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        for t in RuntimeConfig::default().tickers {
            assert!(body.contains(&format!(r#"<option value="{t}">"#)), "missing {t}");
        }
    }

    #[tokio::test]
    async fn fetch_then_download_round_trip() {
        let h = harness();

        let (status, _, body) = send(&h.app, post_ticker("TCS.NS")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.matches(r#"<th scope="row">"#).count(), 5);
        assert!(body.contains(r#"href="/download/TCS.NS_tech_data.json""#));
        assert!(body.contains("&quot;StockData&quot;"));
        assert!(h.dir.path().join("TCS.NS_tech_data.json").exists());

        let (status, headers, body) =
            send(&h.app, get("/download/TCS.NS_tech_data.json")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"TCS.NS_tech_data.json\""
        );
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["StockData"].as_array().unwrap().len(), 5);
        assert!(value["Analysis"].as_str().unwrap().starts_with("Act like"));
    }

    #[tokio::test]
    async fn concurrent_fetches_of_one_ticker_all_succeed() {
        let h = harness();
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..6 {
            let app = h.app.clone();
            tasks.spawn(async move { send(&app, post_ticker("TCS.NS")).await.0 });
        }
        while let Some(status) = tasks.join_next().await {
            assert_eq!(status.unwrap(), StatusCode::OK);
        }
        let text = std::fs::read_to_string(h.dir.path().join("TCS.NS_tech_data.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["StockData"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn unknown_ticker_renders_error_fragment_and_writes_nothing() {
        let h = harness();
        let (status, _, body) = send(&h.app, post_ticker("ZZZZ.NS")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            "<p>Error: Unable to fetch data for ZZZZ.NS. Please try another stock.</p>"
        );
        assert!(!h.dir.path().join("ZZZZ.NS_tech_data.json").exists());
        assert!(std::fs::read_dir(h.dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn error_fragment_escapes_ticker() {
        let h = harness();
        let (_, _, body) = send(&h.app, post_ticker("<script>")).await;
        assert!(body.contains("&lt;script&gt;"));
        assert!(!body.contains("<script>"));
    }

    #[tokio::test]
    async fn missing_download_is_not_found() {
        let h = harness();
        let (status, _, _) = send(&h.app, get("/download/INFY.NS_tech_data.json")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn download_cannot_escape_export_dir() {
        let h = harness();
        let (status, _, _) = send(&h.app, get("/download/..%2Fsecret.json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn fetch_without_ticker_is_rejected() {
        let h = harness();
        let req = Request::builder()
            .method("POST")
            .uri("/fetch")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("other=1"))
            .unwrap();
        let (status, _, _) = send(&h.app, req).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let h = harness();
        let (status, _, body) = send(&h.app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["tickers"], 10);
    }
}
