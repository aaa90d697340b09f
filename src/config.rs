use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub max_file_size: usize,
    pub activity_ttl: Duration,
    pub session_idle_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env_or("PORT", 3000);
        let max_file_size_mb: usize = env_or("MAX_FILE_SIZE_MB", 25);
        let activity_ttl_seconds = env_or("ACTIVITY_TTL_SECONDS", 3600);
        let session_idle_ttl_seconds = env_or("SESSION_IDLE_TTL_SECONDS", 6 * 3600);

        Self {
            port,
            max_file_size: max_file_size_mb * 1024 * 1024,
            activity_ttl: Duration::from_secs(activity_ttl_seconds),
            session_idle_ttl: Duration::from_secs(session_idle_ttl_seconds),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
