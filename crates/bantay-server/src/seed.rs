use crate::config::LocationsSeedFile;
use bantay_rules::{validate_location, Mode};
use bantay_storage::ConsoleStore;

/// Outcome of a location seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: usize,
    /// Rows that already exist by name within their barangay
    pub skipped: usize,
    /// Rows rejected by the location rules or by storage
    pub invalid: usize,
}

/// Inserts every seed location that passes validation and is not already
/// present. Bad rows are logged and skipped; only a failed duplicate lookup
/// aborts the run.
pub fn init_locations(
    store: &ConsoleStore,
    seed: &LocationsSeedFile,
) -> anyhow::Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for (index, record) in seed.locations.iter().enumerate() {
        let input = match validate_location(record, &Mode::Create) {
            Ok(input) => input,
            Err(errors) => {
                let (field, msg) = errors.first().unwrap_or(("", ""));
                tracing::warn!(
                    row = index,
                    errors = errors.len(),
                    field,
                    message = msg,
                    "Invalid seed location, skipping"
                );
                summary.invalid += 1;
                continue;
            }
        };

        if store.location_exists_named(&input.location_name, &input.barangay)? {
            tracing::warn!(
                name = %input.location_name,
                barangay = %input.barangay,
                "Location already exists, skipping"
            );
            summary.skipped += 1;
            continue;
        }

        match store.insert_location(&input) {
            Ok(location) => {
                tracing::info!(name = %location.location_name, id = %location.id, "Location created");
                summary.created += 1;
            }
            Err(e) => {
                tracing::error!(name = %input.location_name, error = %e, "Failed to create location");
                summary.invalid += 1;
            }
        }
    }

    Ok(summary)
}
