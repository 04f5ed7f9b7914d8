use clap::{Parser, ValueEnum};
use tracing::Level;

/// Issue the same pgstac search concurrently over one PostgreSQL connection.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file. Built-in defaults are used when omitted.
    #[arg(env)]
    pub config_file: Option<String>,

    #[arg(short, long, default_value_t = tracing::Level::INFO, env)]
    pub log_level: Level,

    #[clap(short='F', long, value_enum, default_value_t=LogFormat::Text, env)]
    pub log_format: LogFormat,

    #[arg(
        short,
        long,
        default_value_t = false,
        env,
        help = "disable colors in the log output"
    )]
    pub no_color: bool,
}

pub fn parse() -> Args {
    Args::parse()
}

#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogFormat {
    Text,
    Structured,
    Debug,
}
