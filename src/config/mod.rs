//! Turning command-line arguments into comparison settings.

mod duration;

pub use duration::parse_duration;

use anyhow::Context;
use assert_verify::{CompareArgs, CompareOptions};

/// Build comparison options from command-line arguments.
pub fn compare_options(args: &CompareArgs) -> anyhow::Result<CompareOptions> {
    if !args.tolerance.is_finite() || args.tolerance < 0.0 {
        anyhow::bail!("Tolerance must be a non-negative number, got {}", args.tolerance);
    }

    let mut options = CompareOptions::default()
        .with_tolerance(args.tolerance)
        .with_ignore_json_key_order(!args.strict_json_key_order)
        .with_ordered_rows(!args.unordered_rows);

    if let Some(granularity) = &args.timestamp_truncate {
        let granularity = parse_duration(granularity)
            .with_context(|| format!("Invalid --timestamp-truncate value '{granularity}'"))?;
        if granularity <= chrono::TimeDelta::zero() {
            anyhow::bail!("Timestamp truncation granularity must be positive");
        }
        options = options.with_timestamp_truncation(granularity);
    }

    Ok(options)
}
