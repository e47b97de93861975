mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "framelen", version, about = "Frame-length enforcement CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_adjust_subcommand() {
        let cli = Cli::try_parse_from([
            "framelen", "adjust", "--min", "2", "--max", "4", "--frame", "000102", "--frame",
            "00",
        ])
        .expect("adjust args should parse");

        match cli.command {
            Command::Adjust(args) => {
                assert_eq!(args.frames.len(), 2);
                assert_eq!(args.width, 1);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_frames_with_input_file() {
        let err = Cli::try_parse_from([
            "framelen", "adjust", "--min", "0", "--max", "4", "--frame", "00", "--input",
            "in.fl",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn requires_some_frames() {
        let err = Cli::try_parse_from(["framelen", "adjust", "--min", "0", "--max", "4"])
            .expect_err("missing frames should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parses_simulate_with_global_format() {
        let cli = Cli::try_parse_from([
            "framelen", "simulate", "--width", "4", "--seed", "9", "--format", "json",
        ])
        .expect("simulate args should parse");

        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        assert!(matches!(cli.command, Command::Simulate(ref args) if args.seed == 9));
    }
}
