//! Duration parsing utilities.

use anyhow::Context;
use chrono::TimeDelta;

/// Parse a duration string like "1h", "30m", "1s", "500ms", "1us" into a
/// [`TimeDelta`].
/// Supports:
/// - Plain numbers (interpreted as seconds): "300"
/// - Nanoseconds suffix: "100ns"
/// - Microseconds suffix: "1us"
/// - Milliseconds suffix: "500ms"
/// - Seconds suffix: "300s"
/// - Minutes suffix: "30m"
/// - Hours suffix: "1h"
pub fn parse_duration(s: &str) -> anyhow::Result<TimeDelta> {
    let s = s.trim();
    if s.is_empty() {
        anyhow::bail!("Empty duration string");
    }

    // Longer suffixes first: "ms" and "ns" also end in 's'
    let units: [(&str, fn(i64) -> Option<TimeDelta>); 6] = [
        ("ns", |n| Some(TimeDelta::nanoseconds(n))),
        ("us", |n| Some(TimeDelta::microseconds(n))),
        ("ms", TimeDelta::try_milliseconds),
        ("s", TimeDelta::try_seconds),
        ("m", TimeDelta::try_minutes),
        ("h", TimeDelta::try_hours),
    ];

    for (suffix, make) in units {
        if let Some(num_str) = s.strip_suffix(suffix) {
            let value: i64 = num_str
                .trim()
                .parse()
                .with_context(|| format!("Invalid duration value: {s}"))?;
            return make(value).with_context(|| format!("Duration out of range: {s}"));
        }
    }

    // No suffix - treat as seconds
    let secs: i64 = s
        .parse()
        .with_context(|| format!("Invalid duration value: {s}"))?;
    TimeDelta::try_seconds(secs).with_context(|| format!("Duration out of range: {s}"))
}
