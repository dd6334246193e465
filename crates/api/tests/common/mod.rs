//! Shared helpers for API integration tests.
//!
//! Builds the real application router (same middleware stack as
//! production via `build_app_router`) over temp directories, with a
//! mock generation service and a stub media fetcher standing in for
//! the network.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use fluxdeck_api::config::ServerConfig;
use fluxdeck_api::router::build_app_router;
use fluxdeck_api::state::AppState;
use fluxdeck_core::params::{ParamBag, SeedPolicy};
use fluxdeck_fal::{FalError, GenerationService, JobOutput, ProgressSink, ProgressUpdate, RemoteFile};
use fluxdeck_media::{GalleryStore, MediaError, MediaFetcher, MediaPersister};

/// Public base URL the test config advertises.
pub const PUBLIC_BASE: &str = "http://localhost:3000";

// ---------------------------------------------------------------------------
// Mock generation service
// ---------------------------------------------------------------------------

/// Mock [`GenerationService`] that pops pre-programmed responses and
/// records what was submitted.
pub struct MockService {
    responses: Mutex<VecDeque<Result<JobOutput, FalError>>>,
    /// Simulated job runtime before a response is produced.
    delay: Option<Duration>,
    /// `(endpoint, input)` pairs in submission order.
    pub submitted: Mutex<Vec<(String, ParamBag)>>,
    /// File names passed to `upload_blob`.
    pub uploaded: Mutex<Vec<String>>,
}

impl MockService {
    pub fn new(responses: Vec<Result<JobOutput, FalError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            delay: None,
            submitted: Mutex::new(Vec::new()),
            uploaded: Mutex::new(Vec::new()),
        }
    }

    /// A service whose jobs take `delay` to complete.
    pub fn delayed(responses: Vec<Result<JobOutput, FalError>>, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(responses)
        }
    }

    /// The normalized input of the only submitted job.
    pub fn single_submission(&self) -> (String, ParamBag) {
        let submitted = self.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1, "expected exactly one submitted job");
        submitted[0].clone()
    }
}

#[async_trait]
impl GenerationService for MockService {
    async fn run_job(
        &self,
        endpoint: &str,
        input: &ParamBag,
        progress: &ProgressSink,
    ) -> Result<JobOutput, FalError> {
        self.submitted
            .lock()
            .unwrap()
            .push((endpoint.to_string(), input.clone()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        (**progress)(ProgressUpdate {
            status: "IN_PROGRESS".to_string(),
            queue_position: None,
            logs: vec!["rendering".to_string()],
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("mock service had no response queued")
    }

    async fn upload_blob(&self, _bytes: Vec<u8>, file_name: &str) -> Result<String, FalError> {
        self.uploaded.lock().unwrap().push(file_name.to_string());
        Ok(format!("https://fal.cdn/{file_name}"))
    }
}

/// Build an image-job output with `count` downloadable artifacts.
pub fn image_output(count: usize, seed: Option<i64>) -> JobOutput {
    JobOutput {
        images: (0..count)
            .map(|i| RemoteFile {
                url: format!("mock://image-{i}.jpeg"),
                content_type: Some("image/jpeg".to_string()),
            })
            .collect(),
        video: None,
        seed,
    }
}

/// Build a video-job output.
pub fn video_output(seed: Option<i64>) -> JobOutput {
    JobOutput {
        images: Vec::new(),
        video: Some(RemoteFile {
            url: "mock://clip.mp4".to_string(),
            content_type: Some("video/mp4".to_string()),
        }),
        seed,
    }
}

// ---------------------------------------------------------------------------
// Stub media fetcher
// ---------------------------------------------------------------------------

/// Serves a small in-memory JPEG for any URL; URLs containing "bad"
/// fail, so tests can exercise partial persistence.
struct StubFetcher;

#[async_trait]
impl MediaFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, MediaError> {
        if url.contains("bad") {
            return Err(MediaError::Fetch {
                url: url.to_string(),
                reason: "stub failure".to_string(),
            });
        }
        Ok(jpeg_bytes())
    }
}

fn jpeg_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb([10, 20, 30]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .unwrap();
    buf
}

// ---------------------------------------------------------------------------
// Test environment
// ---------------------------------------------------------------------------

/// A fully wired app over temp directories plus handles to poke at it.
pub struct TestEnv {
    pub app: Router,
    pub service: Arc<MockService>,
    pub upload_dir: PathBuf,
    pub media_dir: PathBuf,
    _tmp: TempDir,
}

/// Build a test environment whose mock service yields `responses` in order.
pub fn test_env(responses: Vec<Result<JobOutput, FalError>>) -> TestEnv {
    build_env(Arc::new(MockService::new(responses)), 50, 30)
}

/// Same as [`test_env`] with a custom gallery page size.
pub fn test_env_with_page_size(
    responses: Vec<Result<JobOutput, FalError>>,
    gallery_page_size: usize,
) -> TestEnv {
    build_env(Arc::new(MockService::new(responses)), gallery_page_size, 30)
}

/// An environment whose jobs take `job_delay` to complete against a
/// `job_timeout_secs` deadline.
pub fn test_env_with_slow_jobs(
    responses: Vec<Result<JobOutput, FalError>>,
    job_delay: Duration,
    job_timeout_secs: u64,
) -> TestEnv {
    build_env(
        Arc::new(MockService::delayed(responses, job_delay)),
        50,
        job_timeout_secs,
    )
}

fn build_env(
    service: Arc<MockService>,
    gallery_page_size: usize,
    job_timeout_secs: u64,
) -> TestEnv {
    let tmp = TempDir::new().unwrap();
    let upload_dir = tmp.path().join("uploads");
    let media_dir = tmp.path().join("saved_images");
    std::fs::create_dir_all(&upload_dir).unwrap();
    std::fs::create_dir_all(&media_dir).unwrap();

    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        job_timeout_secs,
        fal_queue_url: "http://unused.invalid".to_string(),
        fal_rest_url: "http://unused.invalid".to_string(),
        upload_dir: upload_dir.clone(),
        media_dir: media_dir.clone(),
        public_base_url: PUBLIC_BASE.to_string(),
        gallery_page_size,
        seed_policy: SeedPolicy::ServiceAssigned,
    };

    let persister = Arc::new(MediaPersister::new(
        media_dir.clone(),
        "/saved_images".to_string(),
        Arc::new(StubFetcher),
    ));
    let gallery = Arc::new(GalleryStore::new(
        media_dir.clone(),
        "/saved_images".to_string(),
    ));

    let state = AppState {
        config: Arc::new(config.clone()),
        service: service.clone(),
        persister,
        gallery,
    };

    TestEnv {
        app: build_app_router(state, &config),
        service,
        upload_dir,
        media_dir,
        _tmp: tmp,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Issue a GET request against the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    use http_body_util::BodyExt;
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
