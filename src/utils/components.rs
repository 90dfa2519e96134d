use serenity::builder::{CreateActionRow, CreateButton};
use serenity::model::application::ButtonStyle;

pub const PAUSE: &str = "music_pause";
pub const RESUME: &str = "music_resume";
pub const SKIP: &str = "music_skip";
pub const LEAVE: &str = "music_leave";
pub const QUEUE_PAGE_PREFIX: &str = "queue_page:";

pub fn music_buttons(is_paused: bool) -> CreateActionRow {
    let pause_resume = if is_paused {
        CreateButton::new(RESUME)
            .label("Resume")
            .emoji('▶')
            .style(ButtonStyle::Success)
    } else {
        CreateButton::new(PAUSE)
            .label("Pause")
            .emoji('⏸')
            .style(ButtonStyle::Primary)
    };

    let skip = CreateButton::new(SKIP)
        .label("Vote skip")
        .emoji('⏭')
        .style(ButtonStyle::Secondary);

    let leave = CreateButton::new(LEAVE)
        .label("Leave")
        .emoji('⏹')
        .style(ButtonStyle::Danger);

    CreateActionRow::Buttons(vec![pause_resume, skip, leave])
}

/// Previous/next buttons. Both stay enabled; pressing past either end is
/// answered with an ephemeral notice instead.
pub fn queue_page_buttons(page: usize) -> CreateActionRow {
    let previous = CreateButton::new(format!("{QUEUE_PAGE_PREFIX}{}", page.wrapping_sub(1)))
        .label("Previous page")
        .emoji('⬅')
        .style(ButtonStyle::Secondary);
    let next = CreateButton::new(format!("{QUEUE_PAGE_PREFIX}{}", page + 1))
        .label("Next page")
        .emoji('➡')
        .style(ButtonStyle::Secondary);

    CreateActionRow::Buttons(vec![previous, next])
}

/// Target page of a queue button, or `None` for ids that aren't queue buttons.
/// A press of "previous" on the first page parses as `Some(None)`.
pub fn parse_queue_page(custom_id: &str) -> Option<Option<usize>> {
    let raw = custom_id.strip_prefix(QUEUE_PAGE_PREFIX)?;
    Some(raw.parse::<usize>().ok().filter(|page| *page != usize::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_queue_page() {
        assert_eq!(parse_queue_page("queue_page:3"), Some(Some(3)));
        assert_eq!(parse_queue_page(&format!("queue_page:{}", usize::MAX)), Some(None));
        assert_eq!(parse_queue_page("music_skip"), None);
    }

    #[test]
    fn test_queue_page_buttons_target_neighbours() {
        let _row = queue_page_buttons(0);
        let _row = queue_page_buttons(4);
    }

    #[test]
    fn test_music_buttons_creates() {
        let _playing = music_buttons(false);
        let _paused = music_buttons(true);
    }
}
