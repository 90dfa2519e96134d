pub mod components;
pub mod embed;
pub mod notifier;

use std::time::Duration;

const PROGRESS_BAR_CELLS: usize = 15;

/// `m:ss` under an hour, `h:mm:ss` otherwise.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

pub fn progress_bar(elapsed: Duration, total_secs: u64) -> String {
    let position = if total_secs == 0 {
        0
    } else {
        let ratio = elapsed.as_secs_f64() / total_secs as f64;
        ((ratio * PROGRESS_BAR_CELLS as f64) as usize).min(PROGRESS_BAR_CELLS - 1)
    };

    (0..PROGRESS_BAR_CELLS)
        .map(|i| if i == position { "🔘" } else { "=" })
        .collect()
}

pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}
