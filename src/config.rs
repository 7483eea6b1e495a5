#[derive(Debug, Clone)]
pub struct Config {
    pub max_file_size: u64,
}

impl Config {
    pub fn from_env() -> Self {
        let max_file_size_mb: u64 = std::env::var("MAX_FILE_SIZE_MB")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(25);

        Self::with_max_file_size_mb(max_file_size_mb)
    }

    pub fn with_max_file_size_mb(max_file_size_mb: u64) -> Self {
        Self {
            max_file_size: max_file_size_mb.saturating_mul(1024 * 1024),
        }
    }
}
