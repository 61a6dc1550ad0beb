mod console;

use std::path::PathBuf;

use clap::Parser;
use spillway_core::blockfrost::BlockfrostContext;
use spillway_core::builder::UtxoBuilder;
use spillway_core::payout;
use spillway_core::validate::validate_document;
use spillway_core::SpillwayError;

use console::OperatorConsole;

#[derive(Debug, Parser)]
#[command(
    name = "spillway",
    version,
    about = "Batch native-asset payouts from a JSON configuration"
)]
struct Cli {
    /// Path to the payout configuration document.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Suppress progress output.
    #[arg(long)]
    quiet: bool,

    /// Disable colored output.
    #[arg(long = "no-color")]
    no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitCode {
    Success = 0,
    Failure = 1,
}

impl ExitCode {
    const fn as_i32(self) -> i32 {
        self as i32
    }
}

fn run(cli: &Cli, console: &mut OperatorConsole) -> spillway_core::Result<()> {
    let document = std::fs::read_to_string(&cli.config).map_err(|err| {
        SpillwayError::Config {
            message: format!("cannot read {}: {err}", cli.config.display()),
        }
    })?;

    let plan = validate_document(&document, console)?;
    let context = BlockfrostContext::new(plan.network, &plan.project_id);
    let builder = Box::new(UtxoBuilder::new(&context));
    let id = payout::execute(&plan, &context, builder, console)?;

    console.success(&format!("successfully submitted transaction {id}"));
    Ok(())
}

fn report(result: &spillway_core::Result<()>, console: &mut OperatorConsole) -> ExitCode {
    match result {
        Ok(()) => ExitCode::Success,
        Err(err) if err.is_cancellation() => {
            console.notice(&err.to_string());
            ExitCode::Failure
        }
        Err(err) => {
            console.failure(&err.to_string());
            ExitCode::Failure
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let mut console = OperatorConsole::new(cli.quiet, cli.no_color);
    let result = run(&cli, &mut console);
    let code = report(&result, &mut console);
    std::process::exit(code.as_i32());
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use spillway_core::SpillwayError;

    use super::{report, Cli, ExitCode, OperatorConsole};

    #[test]
    fn cli_defaults_to_config_json() {
        let cli = Cli::try_parse_from(["spillway"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert!(!cli.quiet);
        assert!(!cli.no_color);
    }

    #[test]
    fn cli_accepts_all_flags() {
        let cli = Cli::try_parse_from([
            "spillway",
            "--config",
            "payouts/run.json",
            "--quiet",
            "--no-color",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("payouts/run.json"));
        assert!(cli.quiet);
        assert!(cli.no_color);
    }

    #[test]
    fn cli_rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["spillway", "--dry-run"]).is_err());
    }

    #[test]
    fn success_exits_zero() {
        let mut console = OperatorConsole::new(true, true);
        assert_eq!(report(&Ok(()), &mut console), ExitCode::Success);
    }

    #[test]
    fn every_failure_exits_one() {
        let mut console = OperatorConsole::new(true, true);
        let failures = [
            SpillwayError::config("missing field `network`"),
            SpillwayError::cancelled("network selection not confirmed"),
            SpillwayError::CredentialMismatch,
            SpillwayError::build("insufficient funds"),
            SpillwayError::submission("mempool rejected"),
        ];
        for err in failures {
            assert_eq!(report(&Err(err), &mut console), ExitCode::Failure);
        }
    }
}
