//! rpmship CLI entrypoint.
//!
//! Parses arguments, validates the configuration, and runs the packaging
//! pipeline (or prints the plan with `--dry-run`). Errors are printed to
//! stderr and turn into exit code 1.

use clap::Parser;
use log::LevelFilter;
use rpmship::cli::Cli;
use rpmship::config::PackagerConfig;
use rpmship::executor::SystemCommandExecutor;
use rpmship::output::write_stderr_line;
use rpmship::pipeline::{Pipeline, PipelineFailure};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(cli: &Cli) {
    env_logger::Builder::new()
        .filter_level(level_for(cli))
        .parse_env("RUST_LOG")
        .format_timestamp(None)
        .init();
}

const fn level_for(cli: &Cli) -> LevelFilter {
    if cli.quiet {
        return LevelFilter::Error;
    }
    match cli.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<(), PipelineFailure> {
    let config = PackagerConfig::from_cli(cli).map_err(|source| PipelineFailure {
        stage: rpmship::pipeline::Stage::Start,
        source,
    })?;
    let executor = SystemCommandExecutor::with_timeout(config.tool_timeout());
    let pipeline = Pipeline::new(&config, &executor);

    if config.dry_run {
        let plan = pipeline.plan()?;
        write_stderr_line(stderr, plan.display_text());
        return Ok(());
    }

    pipeline.run(stderr)?;
    Ok(())
}

fn exit_code_for_run_result(result: Result<(), PipelineFailure>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpmship::PackagerError;
    use rpmship::pipeline::Stage;
    use rstest::rstest;

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_one() {
        let err = PipelineFailure {
            stage: Stage::Verified,
            source: PackagerError::ArtifactNotBuilt {
                path: "/home/ci/rpmbuild/RPMS/noarch/goputils-1.0.3-42.el6.noarch.rpm".into(),
            },
        };

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.starts_with("error: "));
        assert!(stderr_text.contains("goputils-1.0.3-42.el6.noarch.rpm not found"));
        assert!(stderr_text.contains("while verifying built packages"));
    }

    #[rstest]
    #[case::default(&[], LevelFilter::Warn)]
    #[case::verbose(&["-v"], LevelFilter::Info)]
    #[case::debug(&["-vv"], LevelFilter::Debug)]
    #[case::trace(&["-vvv"], LevelFilter::Trace)]
    #[case::quiet(&["-q"], LevelFilter::Error)]
    fn verbosity_maps_to_log_level(#[case] flags: &[&str], #[case] expected: LevelFilter) {
        let mut args = vec!["rpmship", "goputils"];
        args.extend_from_slice(flags);
        let cli = Cli::parse_from(args);
        assert_eq!(level_for(&cli), expected);
    }

    #[test]
    fn missing_configuration_fails_at_start() {
        let cli = temp_env::with_vars(
            [
                ("WORKSPACE", None::<&str>),
                ("HOME", None),
                ("RELEASEVERSION", None),
                ("RPMSHIP_CONFIG", None),
            ],
            || Cli::parse_from(["rpmship", "goputils"]),
        );

        let err = run(&cli, &mut Vec::new()).expect_err("configuration incomplete");
        assert_eq!(err.stage, Stage::Start);
        assert!(matches!(err.source, PackagerError::Configuration { .. }));
    }
}
