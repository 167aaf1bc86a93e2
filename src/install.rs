//! The end-to-end install flow: state check, key, user, customization.

use std::fmt;
use std::path::PathBuf;

use crate::config::Settings;
use crate::customize::{self, KeyInstall};
use crate::error::InstallError;
use crate::progress::OutputMode;
use crate::runner::CommandRunner;
use crate::{hypervisor, key};

/// What the caller asked for.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub vm_name: String,
    pub user: Option<String>,
    pub key: Option<PathBuf>,
}

/// The slice of the process environment the flow reads.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub current_user: Option<String>,
}

impl Environment {
    pub fn from_process() -> Self {
        Self {
            current_user: std::env::var("USER").ok().filter(|u| !u.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub vm_name: String,
    pub username: String,
    pub key_path: PathBuf,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully installed SSH public key for user {} on the VM {}.",
            self.username, self.vm_name
        )
    }
}

pub fn run(
    request: &Request,
    env: &Environment,
    settings: &Settings,
    runner: &dyn CommandRunner,
    mode: OutputMode,
) -> Result<Outcome, InstallError> {
    let vm_name = request.vm_name.as_str();

    if !hypervisor::is_vm_stopped(runner, settings, vm_name) {
        return Err(InstallError::VmNotStopped {
            name: vm_name.to_string(),
        });
    }

    let key_path = key::resolve_key_path(
        request.key.as_deref().filter(|p| !p.as_os_str().is_empty()),
        env.current_user.as_deref(),
        runner,
        settings,
    )?;
    let public_key = key::read_public_key(&key_path)?;
    match key::describe_key(&public_key) {
        Some(summary) => tracing::debug!(path = %key_path.display(), key = %summary, "read public key"),
        None => tracing::debug!(path = %key_path.display(), "read public key (not OpenSSH format)"),
    }

    let username = request
        .user
        .clone()
        .filter(|u| !u.is_empty())
        .or_else(|| env.current_user.clone())
        .ok_or(InstallError::NoUser)?;

    let install = KeyInstall::new(username.clone(), &public_key);
    customize::install_key(runner, settings, mode, vm_name, &install)?;

    Ok(Outcome {
        vm_name: vm_name.to_string(),
        username,
        key_path,
    })
}
