use log::{info, warn};
use orbitwatch::catalog::{filter_catalog, name_matches, TleStore};
use orbitwatch::simulation::{run_batch, RunConfig, ValidationStatus};
use std::env;
use std::error::Error;
use std::fs::{self, File};
use std::path::Path;

// Keep the interactive-scale batch small; the full active catalog is tens of
// thousands of objects.
const MAX_OBJECTS: usize = 50;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let pattern = env::args().nth(1).unwrap_or_else(|| "STARLINK".to_string());

    let store = TleStore::with_default_cache();
    let catalog = store.load()?;
    info!("catalog loaded: {} objects", catalog.len());

    let mut selected = filter_catalog(catalog, |entry| name_matches(entry, &pattern));
    selected.truncate(MAX_OBJECTS);
    if selected.is_empty() {
        warn!("no catalog entries match '{}'", pattern);
        return Ok(());
    }
    info!("validating {} objects matching '{}'", selected.len(), pattern);

    let config = RunConfig::default();
    let result = run_batch(&selected, &config);

    for record in &result.records {
        match record.final_error_km() {
            Some(error_km) => info!(
                "{}: {} ({:.3} km after {} s)",
                record.identity,
                record.status,
                error_km,
                config.num_steps as f64 * config.step_seconds
            ),
            None => info!("{}: {}", record.identity, record.status),
        }
    }

    // Create output directory if it doesn't exist
    let output_dir = Path::new("output");
    fs::create_dir_all(output_dir)?;
    let file = File::create(output_dir.join("validation_results.csv"))?;
    result.write_csv(file)?;

    info!(
        "batch complete: {} nominal, {} drifting, {} reference-unavailable, {} diverged, {} aborted",
        result.count_with_status(ValidationStatus::Nominal),
        result.count_with_status(ValidationStatus::Drifting),
        result.count_with_status(ValidationStatus::ReferenceUnavailable),
        result.count_with_status(ValidationStatus::Diverged),
        result.count_with_status(ValidationStatus::Aborted),
    );
    println!("Validation results have been written to output/validation_results.csv");

    Ok(())
}
