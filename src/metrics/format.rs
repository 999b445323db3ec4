//! Human-readable renderings for uptime and memory sizes

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Render whole seconds as `"1d 1h 0m 0s"`.
///
/// Leading zero components are dropped; everything after the first non-zero
/// component is kept, and the seconds component is always present.
pub fn format_uptime(total_seconds: u64) -> String {
    let days = total_seconds / DAY;
    let hours = (total_seconds % DAY) / HOUR;
    let minutes = (total_seconds % HOUR) / MINUTE;
    let seconds = total_seconds % MINUTE;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if days > 0 || hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if days > 0 || hours > 0 || minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    parts.push(format!("{seconds}s"));

    parts.join(" ")
}

/// Render a byte count as `"<N> MB"`, rounded to the nearest megabyte
pub fn format_megabytes(bytes: u64) -> String {
    const MB: u64 = 1024 * 1024;
    let rounded = bytes.saturating_add(MB / 2) / MB;
    format!("{rounded} MB")
}
