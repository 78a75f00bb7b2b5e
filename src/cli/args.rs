//! CLI argument definitions using clap

use clap::{ArgAction, Parser, ValueEnum};
use std::net::Ipv4Addr;
use std::path::PathBuf;

/// httpterm - An interactive HTTP/1.1 client for the terminal
///
/// Connect to a server, then browse it with GET requests or submit form
/// comments with POST requests from a menu.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "httpterm", version, about, long_about = None)]
pub struct Args {
    /// Server to select at startup
    #[arg(long = "host", value_name = "IP")]
    pub host: Option<Ipv4Addr>,

    /// Port of the server to select at startup
    #[arg(long = "port", value_name = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Connect timeout in milliseconds [default: 5000]
    #[arg(long = "connect-timeout", value_name = "MS")]
    pub connect_timeout: Option<u64>,

    /// Readiness poll timeout in milliseconds [default: 50]
    #[arg(long = "poll-timeout", value_name = "MS")]
    pub poll_timeout: Option<u64>,

    /// How long to wait for more response bytes, in milliseconds [default: 2000]
    #[arg(long = "read-timeout", value_name = "MS")]
    pub read_timeout: Option<u64>,

    /// Config file to use instead of the default location
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Force disable colors and screen clearing
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    pub no_color: bool,

    /// Output format for log lines: text (default) or json (JSON Lines)
    #[arg(long = "log-format", value_name = "FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// Debug mode (log at DEBUG level)
    #[arg(long = "debug", action = ArgAction::SetTrue)]
    pub debug: bool,
}

/// Log format for structured output
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Plain text output (default)
    #[default]
    Text,
    /// JSON Lines format for parsing
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["httpterm"]).unwrap();
        assert!(!args.debug);
        assert!(args.host.is_none());
        assert!(args.port.is_none());
        assert!(args.log_format.is_none());
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "httpterm",
            "--debug",
            "--host",
            "10.0.0.1",
            "--port",
            "8080",
            "--connect-timeout",
            "250",
            "--poll-timeout",
            "10",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert!(args.debug);
        assert_eq!(args.host, Some(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.connect_timeout, Some(250));
        assert_eq!(args.poll_timeout, Some(10));
        assert_eq!(args.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Args::try_parse_from(["httpterm", "--port", "0"]).is_err());
        assert!(Args::try_parse_from(["httpterm", "--port", "70000"]).is_err());
        assert!(Args::try_parse_from(["httpterm", "--host", "example.com"]).is_err());
        assert!(Args::try_parse_from(["httpterm", "--log-format", "xml"]).is_err());
    }
}
