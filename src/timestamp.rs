use chrono::DateTime;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Formats JMS epoch millis for display. `0` is the JMS "not set" value and renders empty.
/// In long mode the raw millis follow the date, e.g. `2024-01-02 03:04:05.678 (1704164645678)`.
pub fn format_timestamp(millis: i64, long: bool) -> String {
    if millis == 0 {
        return String::new();
    }
    match DateTime::from_timestamp_millis(millis) {
        Some(ts) => {
            let formatted = ts.format(TIMESTAMP_FORMAT).to_string();
            if long {
                format!("{formatted} ({millis})")
            } else {
                formatted
            }
        }
        None => millis.to_string(),
    }
}
