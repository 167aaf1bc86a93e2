//! Run-state queries against libvirt via `virsh`.

use crate::config::Settings;
use crate::error::InstallError;
use crate::runner::{CommandRunner, Invocation};

/// Names of currently running domains, one per line of `virsh list --name`.
pub fn parse_vm_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

pub fn running_vms(
    runner: &dyn CommandRunner,
    settings: &Settings,
) -> Result<Vec<String>, InstallError> {
    let mut args = settings.connect_args();
    args.extend(["list", "--name", "--state-running"].map(String::from));
    let invocation = Invocation::privileged(settings, &settings.commands.virsh, args);

    let output = runner.run(&invocation)?;
    if !output.success() {
        return Err(InstallError::CommandFailed {
            command: invocation.tool().to_string(),
            status: output.status_text(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(parse_vm_list(&output.stdout_text()))
}

/// True only when the query succeeds and `name` is not among the running VMs.
///
/// A failed query counts as "not stopped" so the disk image is never
/// modified under a VM whose state is unknown.
pub fn is_vm_stopped(runner: &dyn CommandRunner, settings: &Settings, name: &str) -> bool {
    match running_vms(runner, settings) {
        Ok(running) => {
            let stopped = !running.iter().any(|vm| vm == name);
            tracing::debug!(name, stopped, running = running.len(), "checked VM state");
            stopped
        }
        Err(e) => {
            tracing::warn!(error = %e, "running VM query failed");
            println!("Failed to get list of running VMs: {e}");
            false
        }
    }
}
