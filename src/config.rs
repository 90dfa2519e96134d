use std::time::Duration;

/// Per-session tunables.
#[derive(Clone, Debug)]
pub struct Settings {
    /// How long an empty queue keeps the bot in voice.
    pub idle_timeout: Duration,
    pub page_size: usize,
    /// `None` means unbounded.
    pub max_queue_len: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(180),
            page_size: 5,
            max_queue_len: None,
        }
    }
}

pub struct Config {
    pub discord_token: String,
    pub test_guild_id: Option<u64>,
    pub ytdlp_path: String,
    pub settings: Settings,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Settings::default();
        Self {
            discord_token: std::env::var("DISCORD_TOKEN")
                .expect("DISCORD_TOKEN environment variable is required"),
            test_guild_id: parse_var("TEST_GUILD_ID"),
            ytdlp_path: std::env::var("YTDLP_PATH").unwrap_or_else(|_| "yt-dlp".to_string()),
            settings: Settings {
                idle_timeout: parse_var("JACK_IDLE_TIMEOUT_SECS")
                    .map_or(defaults.idle_timeout, Duration::from_secs),
                page_size: parse_var("JACK_QUEUE_PAGE_SIZE")
                    .filter(|size| *size > 0)
                    .unwrap_or(defaults.page_size),
                max_queue_len: parse_var("JACK_MAX_QUEUE_LEN"),
            },
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.idle_timeout, Duration::from_secs(180));
        assert_eq!(settings.page_size, 5);
        assert!(settings.max_queue_len.is_none());
    }

    #[test]
    fn test_parse_var_ignores_garbage() {
        std::env::set_var("JACK_TEST_PARSE_VAR", "not a number");
        assert_eq!(parse_var::<u64>("JACK_TEST_PARSE_VAR"), None);
        std::env::set_var("JACK_TEST_PARSE_VAR", " 42 ");
        assert_eq!(parse_var::<u64>("JACK_TEST_PARSE_VAR"), Some(42));
        std::env::remove_var("JACK_TEST_PARSE_VAR");
    }
}
