use anyhow::Result;
use chrono::Duration;
use wikitrail_application::ExportService;
use wikitrail_core::session::Chain;

use super::Context;

pub async fn run(context: &Context, json: bool) -> Result<()> {
    let service = ExportService::new(context.session_store()?);
    let chains = service.chains().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&chains)?);
        return Ok(());
    }

    if chains.is_empty() {
        println!("No sessions recorded yet.");
        return Ok(());
    }

    for (number, chain) in chains.iter().enumerate() {
        print!("{}", render_chain(number + 1, chain));
    }

    Ok(())
}

fn render_chain(number: usize, chain: &Chain) -> String {
    let state = if chain.is_open() { " (open)" } else { "" };
    let mut out = format!(
        "Chain {}{}: {} page(s), {}\n",
        number,
        state,
        chain.len(),
        format_duration(chain.total_duration())
    );

    for session in chain.sessions() {
        let end = session
            .end
            .map(|end| end.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "...".to_string());
        let spent = session
            .duration()
            .map(format_duration)
            .unwrap_or_else(|| "open".to_string());

        out.push_str(&format!(
            "  {} #{} -> {} ({}) {}\n",
            session.begin.format("%Y-%m-%d %H:%M:%S"),
            session.id,
            end,
            spent,
            session.title
        ));
    }

    out
}

fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use wikitrail_core::session::{Session, SessionId, reconstruct_chains};

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::seconds(42)), "42s");
        assert_eq!(format_duration(Duration::seconds(125)), "2m 5s");
        assert_eq!(format_duration(Duration::seconds(3725)), "1h 2m 5s");
        assert_eq!(format_duration(Duration::seconds(-3)), "0s");
    }

    #[test]
    fn test_render_open_chain() {
        let begin = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let cat = Session {
            id: SessionId::new(1),
            title: "Cat".to_string(),
            begin,
            end: Some(begin + Duration::seconds(90)),
            parent: None,
            location: None,
        };
        let dog = Session {
            id: SessionId::new(2),
            title: "Dog".to_string(),
            begin: begin + Duration::seconds(90),
            end: None,
            parent: Some(SessionId::new(1)),
            location: None,
        };

        let chains = reconstruct_chains(vec![dog, cat]);
        let text = render_chain(1, &chains[0]);

        assert!(text.starts_with("Chain 1 (open): 2 page(s), 1m 30s\n"));
        assert!(text.contains("-> 10:01:30 (1m 30s) Cat"));
        assert!(text.contains("-> ... (open) Dog"));
    }
}
