//! Number and duration formatting for update payloads and log lines.
//!
//! Loot counters and cooldowns are shown to overlays as short strings; all of
//! that goes through here so European formatting (swapping `.` and `,`) is
//! applied in one place.

fn europeanize(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '.' => ',',
            ',' => '.',
            other => other,
        })
        .collect()
}

#[inline]
fn maybe_eu(s: String, european: bool) -> String {
    if european { europeanize(&s) } else { s }
}

/// Format a loot counter compactly (`950`, `12.5K`, `3.20M`).
///
/// # Examples
/// ```
/// use ornalens_types::formatting::format_loot;
/// assert_eq!(format_loot(950, false), "950");
/// assert_eq!(format_loot(12_500, false), "12.5K");
/// assert_eq!(format_loot(3_200_000, false), "3.20M");
/// assert_eq!(format_loot(12_500, true), "12,5K");
/// ```
pub fn format_loot(n: i64, european: bool) -> String {
    let abs = n.unsigned_abs();
    let s = if abs >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if abs >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    };
    maybe_eu(s, european)
}

/// Format an elapsed duration as `M:SS`, or `H:MM:SS` past the hour.
///
/// # Examples
/// ```
/// use ornalens_types::formatting::format_elapsed;
/// assert_eq!(format_elapsed(125), "2:05");
/// assert_eq!(format_elapsed(3_725), "1:02:05");
/// ```
pub fn format_elapsed(secs: i64) -> String {
    let secs = secs.max(0);
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// Format the time left on a dungeon cooldown.
///
/// Zero or negative values render as `zero_label`.
///
/// # Examples
/// ```
/// use ornalens_types::formatting::format_ready_in;
/// assert_eq!(format_ready_in(0, "Ready"), "Ready");
/// assert_eq!(format_ready_in(59, "Ready"), "<1m");
/// assert_eq!(format_ready_in(5_400, "Ready"), "1h 30m");
/// assert_eq!(format_ready_in(600, "Ready"), "10m");
/// ```
pub fn format_ready_in(secs: i64, zero_label: &str) -> String {
    if secs <= 0 {
        return zero_label.to_string();
    }
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    match (hours, mins) {
        (0, 0) => "<1m".to_string(),
        (0, m) => format!("{m}m"),
        (h, m) => format!("{h}h {m}m"),
    }
}

/// Format an assessment quality ratio as a percentage (`1.15` -> `115%`).
///
/// # Examples
/// ```
/// use ornalens_types::formatting::format_quality;
/// assert_eq!(format_quality(1.15, false), "115%");
/// assert_eq!(format_quality(0.875, true), "87,5%");
/// ```
pub fn format_quality(quality: f64, european: bool) -> String {
    let pct = quality * 100.0;
    let s = if (pct - pct.round()).abs() < 0.05 {
        format!("{:.0}%", pct)
    } else {
        format!("{:.1}%", pct)
    };
    maybe_eu(s, european)
}
