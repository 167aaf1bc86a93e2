use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use miette::Diagnostic;

use kvm_install_sshkey::cli::{self, Cli};
use kvm_install_sshkey::config;
use kvm_install_sshkey::error::InstallError;
use kvm_install_sshkey::install::{self, Environment};
use kvm_install_sshkey::logging;
use kvm_install_sshkey::progress::OutputMode;
use kvm_install_sshkey::runner::SystemRunner;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(_) => {
            print!("{}", cli::usage());
            return ExitCode::from(1);
        }
    };

    logging::init(cli.verbose);

    match run(&cli) {
        Ok(message) => {
            println!("{message}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<String, InstallError> {
    let settings = config::resolve_settings(cli.config.as_deref())?;
    let mode = OutputMode::detect(cli.verbose);
    let outcome = install::run(
        &cli.request(),
        &Environment::from_process(),
        &settings,
        &SystemRunner,
        mode,
    )?;
    Ok(outcome.to_string())
}

/// Failures go to stdout, like every other message this tool prints.
fn report(e: &InstallError) {
    println!("{e}");
    if let Some(help) = e.help() {
        println!("  help: {help}");
    }
    tracing::debug!(error = ?e, "install failed");
}
