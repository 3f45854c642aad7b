use chrono::{Local, TimeZone};
use quakewatch_rs::aggregator::IntensityPoint;
use quakewatch_rs::StatsSnapshot;

const RULE: &str = "============================================================";

/// Render a device timestamp in local time.
///
/// A zero timestamp means the device has no time reference yet, so the session
/// clock is shown instead.
pub fn format_device_time(device_timestamp_ms: u64, elapsed_secs: f64) -> String {
    if device_timestamp_ms == 0 {
        return format!("{:04}s (No NTP)", elapsed_secs.max(0.0) as u64);
    }

    i64::try_from(device_timestamp_ms)
        .ok()
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| format!("{} ms", device_timestamp_ms))
}

/// One intensity line, labelled with the time the record was dispatched.
pub fn intensity_line(point: &IntensityPoint) -> String {
    format!(
        "[{}] I: {:.2}, a: {:.2} Gal",
        format_device_time(point.device_timestamp_ms, point.elapsed_secs),
        point.intensity,
        point.pga
    )
}

/// Human-readable end-of-session summary.
pub fn render_statistics(stats: &StatsSnapshot) -> String {
    let mut lines = vec![
        RULE.to_string(),
        format!("Run time: {:.1} s", stats.elapsed_secs),
        format!(
            "Sensor packets: {} ({:.1} Hz)",
            stats.sensor_count, stats.sensor_rate_hz
        ),
        format!(
            "Intensity packets: {} ({:.1} Hz)",
            stats.intensity_count, stats.intensity_rate_hz
        ),
        format!(
            "Error packets: {} (unknown tags: {}, I/O failures: {})",
            stats.error_count, stats.unknown_tag_count, stats.io_failure_count
        ),
        String::new(),
    ];

    match (stats.first_timestamp_ms, stats.last_timestamp_ms) {
        (Some(first), Some(last)) => {
            lines.push(format!(
                "First timestamp: {}",
                format_device_time(first, stats.elapsed_secs)
            ));
            lines.push(format!(
                "Latest timestamp: {}",
                format_device_time(last, stats.elapsed_secs)
            ));
            let span_ms = stats.span_ms.unwrap_or(0);
            lines.push(format!("Data time span: {:.2} s", span_ms as f64 / 1000.0));
        }
        _ => lines.push("No valid NTP timestamp received".to_string()),
    }

    lines.push(RULE.to_string());
    lines.join("\n")
}
