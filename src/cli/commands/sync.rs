//! Sync command - a single header pass without watching.

use crate::config::Settings;
use crate::header::UpdateOutcome;
use crate::session::Session;

pub fn run(settings: Settings) -> anyhow::Result<()> {
    let session = Session::new(settings)?;
    let results = session.sync()?;

    let count = |wanted: UpdateOutcome| {
        results
            .iter()
            .filter(|(_, outcome)| *outcome == wanted)
            .count()
    };
    let written = count(UpdateOutcome::Written);
    let unchanged = count(UpdateOutcome::Unchanged);
    let failed: Vec<_> = results
        .iter()
        .filter(|(_, outcome)| *outcome == UpdateOutcome::Failed)
        .map(|(entry, _)| entry.as_str())
        .collect();

    println!(
        "Synced {} file(s): {written} updated, {unchanged} already current.",
        results.len()
    );
    if !failed.is_empty() {
        anyhow::bail!("failed to update: {}", failed.join(", "));
    }
    Ok(())
}
