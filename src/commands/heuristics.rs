use std::path::PathBuf;

use anyhow::Result;

use brandprobe::HeuristicConfig;

/// Print the effective heuristics, after applying any override file
pub async fn handle_heuristics(path: Option<PathBuf>) -> Result<()> {
    let config = HeuristicConfig::load(path.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
