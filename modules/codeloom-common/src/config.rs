use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Proposal source
    pub anthropic_api_key: String,
    pub model: String,

    // Output locations
    pub output_dir: PathBuf,
    pub data_dir: PathBuf,

    // Retry / scheduling
    pub max_retries: u32,
    pub concurrency: usize,

    // "component-call" or "tag-template"
    pub target_style: String,
}

const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
pub const MAX_RETRY_CEILING: u32 = 10;

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            anthropic_api_key: required_env("ANTHROPIC_API_KEY"),
            ..Self::offline_from_env()
        }
    }

    /// Load a config with no proposal-source credentials — enough for
    /// validation/render replays and tests.
    pub fn offline_from_env() -> Self {
        Self {
            anthropic_api_key: String::new(),
            model: env::var("CODELOOM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            output_dir: PathBuf::from(
                env::var("OUTPUT_DIR").unwrap_or_else(|_| "connects".to_string()),
            ),
            data_dir: PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string())),
            max_retries: clamp_retries(
                env::var("MAX_RETRIES")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .expect("MAX_RETRIES must be a number"),
            ),
            concurrency: env::var("CONCURRENCY")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("CONCURRENCY must be a number"),
            target_style: env::var("TARGET_STYLE")
                .unwrap_or_else(|_| "component-call".to_string()),
        }
    }
}

/// `max_retries` is meaningful in 0..=10; anything above is clamped.
pub fn clamp_retries(requested: u32) -> u32 {
    requested.min(MAX_RETRY_CEILING)
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_clamp_to_ceiling() {
        assert_eq!(clamp_retries(0), 0);
        assert_eq!(clamp_retries(2), 2);
        assert_eq!(clamp_retries(99), 10);
    }
}
