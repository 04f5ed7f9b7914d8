use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::cmd_args::{Args, LogFormat};

/// Chatty dependencies, capped unless RUST_LOG says otherwise.
const QUIET_TARGETS: &[(&str, &str)] = &[("tokio_postgres", "warn"), ("tokio_util", "warn")];

/// `RUST_LOG` wins when set; otherwise the command line level applies,
/// with the driver's per-message chatter held back.
fn env_filter(level: Level) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let mut directives = vec![level.to_string().to_lowercase()];
    directives.extend(
        QUIET_TARGETS
            .iter()
            .map(|(target, cap)| format!("{}={}", target, cap)),
    );

    EnvFilter::new(directives.join(","))
}

pub fn init(args: &Args) {
    let trace_sub = tracing_subscriber::fmt()
        .with_env_filter(env_filter(args.log_level))
        .with_ansi(!args.no_color)
        .with_target(false);

    match args.log_format {
        LogFormat::Structured => trace_sub.json().init(),
        LogFormat::Debug => trace_sub.pretty().init(),
        LogFormat::Text => trace_sub.init(),
    };
}
