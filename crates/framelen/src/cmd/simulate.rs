use framelen_adjust::{sweep, SweepConfig};
use framelen_transport::WordWidth;
use tracing::{info, warn};

use crate::cmd::SimulateArgs;
use crate::exit::{CliError, CliResult, SUCCESS, USAGE, VERIFICATION_FAILED};
use crate::output::{print_sweep, OutputFormat};

pub fn run(args: SimulateArgs, format: OutputFormat) -> CliResult<i32> {
    let config = sweep_config(&args)?;
    info!(
        lanes = config.width.lanes(),
        seed = config.seed,
        "running sweep"
    );

    let report = sweep(config);
    print_sweep(&report, format);

    if report.passed() {
        Ok(SUCCESS)
    } else {
        warn!(failures = report.failures.len(), "sweep failed");
        Ok(VERIFICATION_FAILED)
    }
}

fn sweep_config(args: &SimulateArgs) -> CliResult<SweepConfig> {
    let width = WordWidth::new(args.width)
        .map_err(|err| CliError::new(USAGE, format!("--width: {err}")))?;
    if args.max_length == 0 {
        return Err(CliError::new(USAGE, "--max-length must be at least 1"));
    }
    if args.watchdog == 0 {
        return Err(CliError::new(USAGE, "--watchdog must be greater than zero"));
    }
    Ok(SweepConfig {
        width,
        max_length: args.max_length,
        max_payload: args.max_payload,
        seed: args.seed,
        watchdog: args.watchdog,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(width: usize) -> SimulateArgs {
        SimulateArgs {
            width,
            seed: 3,
            max_length: 5,
            max_payload: 5,
            watchdog: 1_000,
        }
    }

    #[test]
    fn rejects_bad_width() {
        let err = sweep_config(&args(9)).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn carries_dimensions() {
        let config = sweep_config(&args(4)).unwrap();
        assert_eq!(config.width.lanes(), 4);
        assert_eq!(config.seed, 3);
        assert_eq!(config.watchdog, 1_000);
    }
}
