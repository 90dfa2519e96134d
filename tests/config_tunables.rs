use std::env;
use std::time::Duration;

// Lives in its own test binary: it sets DISCORD_TOKEN, which config_test.rs removes.
#[test]
fn test_config_reads_tunables() {
    env::set_var("DISCORD_TOKEN", "token");
    env::set_var("JACK_IDLE_TIMEOUT_SECS", "30");
    env::set_var("JACK_QUEUE_PAGE_SIZE", "0");
    env::set_var("JACK_MAX_QUEUE_LEN", "200");

    let config = jack_music_bot::config::Config::from_env();
    assert_eq!(config.settings.idle_timeout, Duration::from_secs(30));
    // A zero page size falls back to the default.
    assert_eq!(config.settings.page_size, 5);
    assert_eq!(config.settings.max_queue_len, Some(200));

    for var in [
        "JACK_IDLE_TIMEOUT_SECS",
        "JACK_QUEUE_PAGE_SIZE",
        "JACK_MAX_QUEUE_LEN",
    ] {
        env::remove_var(var);
    }
}
