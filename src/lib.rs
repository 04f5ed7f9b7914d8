pub mod cmd_args;
pub mod config;
pub mod errors;
pub mod fanout;
pub mod logger;
pub mod server;

/// Render a wall-clock duration as `<days>d HH:MM:SS.mmm`.
pub fn format_duration(duration: &chrono::Duration) -> String {
    let total_ms = duration.num_milliseconds();
    let (days, rest) = (total_ms / 86_400_000, total_ms % 86_400_000);
    let (hours, rest) = (rest / 3_600_000, rest % 3_600_000);
    let (minutes, rest) = (rest / 60_000, rest % 60_000);
    let (seconds, millis) = (rest / 1000, rest % 1000);

    format!(
        "{}d {:02}:{:02}:{:02}.{:03}",
        days, hours, minutes, seconds, millis
    )
}
