use anyhow::{Context as _, Result};
use std::path::PathBuf;
use wikitrail_application::{EXPORT_FILE_NAME, ExportService};

use super::Context;

pub async fn run(context: &Context, output: Option<PathBuf>) -> Result<()> {
    let service = ExportService::new(context.session_store()?);
    let json = service.to_json_pretty().await?;

    match output {
        None => println!("{}", json),
        Some(path) => {
            let path = if path.is_dir() {
                path.join(EXPORT_FILE_NAME)
            } else {
                path
            };
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write export to '{}'", path.display()))?;
            eprintln!("✅ Exported sessions to {}", path.display());
        }
    }

    Ok(())
}
