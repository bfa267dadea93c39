#[derive(Clone)]
pub struct Config {
    pub base_url: String,
    pub refresh_secs: u64,
    pub download_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("RISKDASH_BASE")
                .unwrap_or_else(|_| "http://127.0.0.1:5000".to_string()),
            refresh_secs: std::env::var("REFRESH_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(30),
            download_dir: std::env::var("DOWNLOAD_DIR").unwrap_or_else(|_| "downloads".to_string()),
        }
    }
}
