use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;

/// Human-readable duration: `0.500s`, `5s`, `2m 5s`, `1h 0m 5s`, `1w 0d 0h 0m 0s`.
///
/// Every unit below the most significant non-zero one is printed, except that
/// a minute-scale duration omits zero seconds (`2m`).
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let millis = duration.subsec_millis();
    let weeks = total / WEEK;
    let days = (total % WEEK) / DAY;
    let hours = (total % DAY) / HOUR;
    let minutes = (total % HOUR) / MINUTE;
    let secs = total % MINUTE;
    let seconds = format_seconds(secs, millis);

    if weeks > 0 {
        format!("{weeks}w {days}d {hours}h {minutes}m {seconds}")
    } else if days > 0 {
        format!("{days}d {hours}h {minutes}m {seconds}")
    } else if hours > 0 {
        format!("{hours}h {minutes}m {seconds}")
    } else if minutes > 0 {
        if secs > 0 || millis > 0 {
            format!("{minutes}m {seconds}")
        } else {
            format!("{minutes}m")
        }
    } else {
        seconds
    }
}

fn format_seconds(secs: u64, millis: u32) -> String {
    if millis == 0 {
        format!("{secs}s")
    } else {
        format!("{secs}.{millis:03}s")
    }
}
