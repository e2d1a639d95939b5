use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub hf_api_key: String,
    pub upload_dir: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            hf_api_key: sanitize_api_key(&require_env("HF_API_KEY")?),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Trims the key and removes wrapping quotes, which some shells and .env
/// editors leave in place.
fn sanitize_api_key(raw: &str) -> String {
    let key = raw.trim();
    let key = key
        .strip_prefix('"')
        .and_then(|k| k.strip_suffix('"'))
        .or_else(|| key.strip_prefix('\'').and_then(|k| k.strip_suffix('\'')))
        .unwrap_or(key);
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_plain_key() {
        assert_eq!(sanitize_api_key("hf_abc123"), "hf_abc123");
    }

    #[test]
    fn test_sanitize_strips_whitespace_and_double_quotes() {
        assert_eq!(sanitize_api_key("  \"hf_abc123\"\n"), "hf_abc123");
    }

    #[test]
    fn test_sanitize_strips_single_quotes() {
        assert_eq!(sanitize_api_key("'hf_abc123'"), "hf_abc123");
    }

    #[test]
    fn test_sanitize_keeps_unbalanced_quote() {
        assert_eq!(sanitize_api_key("\"hf_abc123"), "\"hf_abc123");
    }
}
