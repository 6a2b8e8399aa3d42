use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Fraction of the logo reservation disc that is actually cleared.
pub const DEFAULT_EXCLUSION_SHRINK: f32 = 0.85;

const DEFAULT_MAX_CONCURRENT_RENDERS: usize = 4;
const DEFAULT_LOGO_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOGO_MAX_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub max_concurrent_renders: usize,
    pub logo_fetch_timeout: Duration,
    pub logo_max_bytes: usize,
    pub logo_exclusion_shrink: f32,
    pub artifact_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;

        let max_concurrent_renders: usize = match env::var("MAX_CONCURRENT_RENDERS") {
            Ok(val) => val.parse()?,
            Err(_) => DEFAULT_MAX_CONCURRENT_RENDERS,
        };
        if max_concurrent_renders == 0 {
            return Err("MAX_CONCURRENT_RENDERS must be at least 1".into());
        }

        let logo_fetch_timeout_secs: u64 = match env::var("LOGO_FETCH_TIMEOUT_SECS") {
            Ok(val) => val.parse()?,
            Err(_) => DEFAULT_LOGO_FETCH_TIMEOUT_SECS,
        };
        if logo_fetch_timeout_secs == 0 {
            return Err("LOGO_FETCH_TIMEOUT_SECS must be at least 1".into());
        }

        let logo_max_bytes = match env::var("LOGO_MAX_BYTES") {
            Ok(val) => val.parse()?,
            Err(_) => DEFAULT_LOGO_MAX_BYTES,
        };

        let logo_exclusion_shrink = match env::var("LOGO_EXCLUSION_SHRINK") {
            Ok(val) => Self::parse_shrink(&val)?,
            Err(_) => DEFAULT_EXCLUSION_SHRINK,
        };

        let artifact_dir = env::var("ARTIFACT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::temp_dir().join("qr-bot-artifacts"));

        Ok(Config {
            database_url,
            server_host,
            server_port,
            max_concurrent_renders,
            logo_fetch_timeout: Duration::from_secs(logo_fetch_timeout_secs),
            logo_max_bytes,
            logo_exclusion_shrink,
            artifact_dir,
        })
    }

    fn parse_shrink(raw: &str) -> Result<f32, Box<dyn std::error::Error>> {
        let shrink: f32 = raw.trim().parse()?;

        if !(shrink > 0.0 && shrink <= 1.0) {
            return Err("LOGO_EXCLUSION_SHRINK must be in (0, 1]".into());
        }

        Ok(shrink)
    }

    /// Address the HTTP server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
