use std::path::PathBuf;

use fluxdeck_core::params::SeedPolicy;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`). Does not apply
    /// to `/generate`, which has its own job deadline.
    pub request_timeout_secs: u64,
    /// Deadline for an external generation job in seconds (default: `600`).
    pub job_timeout_secs: u64,
    /// Base URL of the external queue API.
    pub fal_queue_url: String,
    /// Base URL of the external REST API (blob uploads).
    pub fal_rest_url: String,
    /// Directory browser uploads land in.
    pub upload_dir: PathBuf,
    /// Directory persisted generations land in.
    pub media_dir: PathBuf,
    /// Public base URL of this server, used to recognize self-served
    /// upload URLs and to build absolute upload URLs.
    pub public_base_url: String,
    /// Maximum number of gallery entries returned per listing.
    pub gallery_page_size: usize,
    /// What to do when a request carries no seed.
    pub seed_policy: SeedPolicy,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                       |
    /// |------------------------|-------------------------------|
    /// | `HOST`                 | `0.0.0.0`                     |
    /// | `PORT`                 | `3000`                        |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`       |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                          |
    /// | `JOB_TIMEOUT_SECS`     | `600`                         |
    /// | `FAL_QUEUE_URL`        | `https://queue.fal.run`       |
    /// | `FAL_REST_URL`         | `https://rest.alpha.fal.ai`   |
    /// | `UPLOAD_DIR`           | `uploads`                     |
    /// | `MEDIA_DIR`            | `saved_images`                |
    /// | `PUBLIC_BASE_URL`      | `http://localhost:{PORT}`     |
    /// | `GALLERY_PAGE_SIZE`    | `50`                          |
    /// | `SEED_POLICY`          | `service` (or `local`)        |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let job_timeout_secs: u64 = std::env::var("JOB_TIMEOUT_SECS")
            .unwrap_or_else(|_| "600".into())
            .parse()
            .expect("JOB_TIMEOUT_SECS must be a valid u64");

        let fal_queue_url = std::env::var("FAL_QUEUE_URL")
            .unwrap_or_else(|_| fluxdeck_fal::client::DEFAULT_QUEUE_URL.into());
        let fal_rest_url = std::env::var("FAL_REST_URL")
            .unwrap_or_else(|_| fluxdeck_fal::client::DEFAULT_REST_URL.into());

        let upload_dir = PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()));
        let media_dir =
            PathBuf::from(std::env::var("MEDIA_DIR").unwrap_or_else(|_| "saved_images".into()));

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"));

        let gallery_page_size: usize = std::env::var("GALLERY_PAGE_SIZE")
            .unwrap_or_else(|_| "50".into())
            .parse()
            .expect("GALLERY_PAGE_SIZE must be a valid usize");

        let seed_policy = match std::env::var("SEED_POLICY").as_deref() {
            Ok("local") => SeedPolicy::LocalRandom,
            Ok("service") | Err(_) => SeedPolicy::ServiceAssigned,
            Ok(other) => panic!("SEED_POLICY must be 'service' or 'local', got '{other}'"),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            job_timeout_secs,
            fal_queue_url,
            fal_rest_url,
            upload_dir,
            media_dir,
            public_base_url,
            gallery_page_size,
            seed_policy,
        }
    }
}
