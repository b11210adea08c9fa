mod bootstrap;
mod report;

use anyhow::{Context, Result};
use logbook_core::aircraft_types::AircraftTypeVocabulary;
use logbook_core::settings::Settings;
use logbook_data::{import_logbook_file, ImportOptions};

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Logbook import v{} starting", env!("CARGO_PKG_VERSION"));

    let vocabulary = AircraftTypeVocabulary::builtin();
    if let Some(manufacturer) = &settings.list_types {
        print!("{}", report::render_vocabulary(vocabulary, manufacturer));
        return Ok(());
    }
    let file = settings
        .file
        .as_deref()
        .context("No logbook file given")?;

    let config = settings
        .import_config()
        .context("Invalid import configuration")?;
    let options = ImportOptions {
        filename: None,
        student_pilot: settings.student_pilot,
        config,
    };

    let result = import_logbook_file(file, &options, vocabulary)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    match settings.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print!("{}", report::render_summary(&result, vocabulary)),
    }

    Ok(())
}
