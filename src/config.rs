//! Command line and environment configuration.

use crate::dashboard::DEFAULT_TOP_N;
use crate::data::{TextEncoding, DEFAULT_ENCODINGS};
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// salesboard: product sales dashboard and housing chart API.
///
/// `dashboard` opens an interactive window over a sales CSV; `serve` exposes
/// chart descriptions for a housing CSV over HTTP. Both load their dataset once
/// at startup and refuse to start if it cannot be read.
#[derive(Debug, Parser, Clone)]
#[command(version)]
pub struct Cli {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// RUST_LOG takes precedence when set.
    #[arg(long, global = true, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Open the interactive sales dashboard.
    Dashboard(DashboardArgs),
    /// Serve housing chart descriptions over HTTP.
    Serve(ServeArgs),
}

/// Encoding trial order shared by both subcommands.
#[derive(Debug, Args, Clone)]
pub struct EncodingArgs {
    /// Encodings to try, in order, when decoding the CSV file.
    #[arg(
        long,
        env = "SALESBOARD_ENCODINGS",
        value_delimiter = ',',
        default_values_t = DEFAULT_ENCODINGS
    )]
    encodings: Vec<TextEncoding>,
}

impl EncodingArgs {
    pub fn encodings(&self) -> &[TextEncoding] {
        &self.encodings
    }
}

#[derive(Debug, Args, Clone)]
pub struct DashboardArgs {
    /// Path to the sales CSV file.
    #[arg(long, env = "SALESBOARD_DATA", default_value = "dataset/sales_data.csv")]
    data: PathBuf,

    /// How many of the best-selling product lines to offer in the dropdown.
    #[arg(long, env = "SALESBOARD_TOP_N", default_value_t = DEFAULT_TOP_N)]
    top_n: usize,

    #[command(flatten)]
    encoding: EncodingArgs,
}

impl DashboardArgs {
    pub fn data(&self) -> &PathBuf {
        &self.data
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn encodings(&self) -> &[TextEncoding] {
        self.encoding.encodings()
    }
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Path to the housing CSV file.
    #[arg(long, env = "SALESBOARD_HOUSING_DATA", default_value = "dataset/housing.csv")]
    data: PathBuf,

    /// Address to listen on.
    #[arg(long, env = "SALESBOARD_ADDR", default_value = "127.0.0.1:5000")]
    addr: SocketAddr,

    #[command(flatten)]
    encoding: EncodingArgs,
}

impl ServeArgs {
    pub fn data(&self) -> &PathBuf {
        &self.data
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn encodings(&self) -> &[TextEncoding] {
        self.encoding.encodings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_defaults() {
        let cli = Cli::try_parse_from(["salesboard", "dashboard"]).unwrap();
        assert_eq!(cli.log_level(), LevelFilter::INFO);
        let Command::Dashboard(args) = cli.command() else {
            panic!("expected dashboard");
        };
        assert_eq!(args.data(), &PathBuf::from("dataset/sales_data.csv"));
        assert_eq!(args.top_n(), DEFAULT_TOP_N);
        assert_eq!(args.encodings(), DEFAULT_ENCODINGS);
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from([
            "salesboard",
            "--log-level",
            "debug",
            "serve",
            "--data",
            "/tmp/housing.csv",
            "--addr",
            "0.0.0.0:8080",
            "--encodings",
            "windows-1252,utf-8",
        ])
        .unwrap();
        assert_eq!(cli.log_level(), LevelFilter::DEBUG);
        let Command::Serve(args) = cli.command() else {
            panic!("expected serve");
        };
        assert_eq!(args.addr(), "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(
            args.encodings(),
            [TextEncoding::Windows1252, TextEncoding::Utf8]
        );
    }

    #[test]
    fn test_rejects_unknown_encoding() {
        assert!(Cli::try_parse_from(["salesboard", "serve", "--encodings", "ebcdic"]).is_err());
    }
}
