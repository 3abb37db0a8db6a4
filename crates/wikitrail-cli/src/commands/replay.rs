use anyhow::{Context as _, Result};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use wikitrail_core::clock::ManualClock;
use wikitrail_core::host::StaticTabs;
use wikitrail_core::navigation::{BrowserEventHandler, HostEvent};

use super::{Context, tab_ids};

/// Parses a JSON-lines event log. Blank lines and `#` comments are skipped.
pub fn parse_events(content: &str) -> Result<Vec<HostEvent>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(number, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Invalid host event on line {}", number + 1))
        })
        .collect()
}

pub async fn run(context: &Context, events_path: &Path, live_tabs: Vec<i64>) -> Result<()> {
    let content = std::fs::read_to_string(events_path)
        .with_context(|| format!("Failed to read '{}'", events_path.display()))?;
    let events = parse_events(&content)?;

    let clock = Arc::new(ManualClock::new(Utc::now()));
    let tracker = context.tracker(clock.clone()).await?;

    if live_tabs.is_empty() {
        tracker.index().load().await?;
    } else {
        let dropped = tracker.startup(&StaticTabs(tab_ids(live_tabs))).await?;
        if !dropped.is_empty() {
            println!("Dropped {} stale tab(s) before replay", dropped.len());
        }
    }

    let total = events.len();
    for event in events {
        clock.set(event.at().unwrap_or_else(Utc::now));
        tracker.dispatch(event).await?;
    }
    tracker.flush_locations().await;

    let open = tracker.index().snapshot().await;
    println!("✅ Replayed {} event(s); {} tab(s) with an open session", total, open.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wikitrail_core::session::SessionStore;
    use wikitrail_core::tab::TabId;

    #[test]
    fn test_parse_events_skips_comments_and_blanks() {
        let content = r#"
# morning session
{"type":"navigation_completed","tab_id":1,"url":"https://en.wikipedia.org/wiki/Cat","at":"2024-05-01T10:00:00Z"}

{"type":"tab_removed","tab_id":1,"at":"2024-05-01T10:05:00Z"}
"#;

        let events = parse_events(content).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].tab_id(), TabId::new(1));
    }

    #[test]
    fn test_parse_events_reports_line_number() {
        let content = "{\"type\":\"tab_created\",\"tab_id\":2}\n{\"type\":\"teleport\"}\n";

        let err = parse_events(content).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[tokio::test]
    async fn test_replay_writes_sessions() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let events_path = temp_dir.path().join("events.jsonl");
        std::fs::write(
            &events_path,
            concat!(
                r#"{"type":"navigation_completed","tab_id":1,"url":"https://en.wikipedia.org/wiki/Cat","at":"2024-05-01T10:00:00Z"}"#,
                "\n",
                r#"{"type":"navigation_completed","tab_id":1,"url":"https://en.wikipedia.org/wiki/Dog","at":"2024-05-01T10:02:00Z"}"#,
                "\n",
            ),
        )
        .unwrap();

        let context = Context::load(
            Some(temp_dir.path().join("config.toml")),
            Some(temp_dir.path().join("data")),
        )
        .unwrap();

        run(&context, &events_path, Vec::new()).await.unwrap();

        let sessions = context.session_store().unwrap().scan_all().await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[1].parent, Some(sessions[0].id));
        assert_eq!(sessions[0].end, Some(sessions[1].begin));
    }
}
