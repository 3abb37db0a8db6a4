use anyhow::Result;
use std::sync::Arc;
use wikitrail_core::clock::SystemClock;
use wikitrail_core::host::StaticTabs;

use super::{Context, tab_ids};

pub async fn run(context: &Context, live_tabs: Vec<i64>) -> Result<()> {
    let tracker = context.tracker(Arc::new(SystemClock)).await?;

    let dropped = tracker.startup(&StaticTabs(tab_ids(live_tabs))).await?;
    let remaining = tracker.index().snapshot().await;

    if dropped.is_empty() {
        println!("No stale entries.");
    } else {
        let dropped: Vec<String> = dropped.iter().map(ToString::to_string).collect();
        println!("Dropped stale tabs: {}", dropped.join(", "));
    }
    for entry in remaining {
        println!(
            "  tab {} -> session {} ({})",
            entry.tab_id, entry.session_id, entry.title
        );
    }

    Ok(())
}
