use std::path::PathBuf;

use crate::config::Settings;
use crate::error::InstallError;
use crate::runner::{CommandRunner, Invocation};

/// Extract the home directory (sixth field) from a `passwd(5)` record.
pub fn parse_home(user: &str, record: &str) -> Result<PathBuf, InstallError> {
    let record = record.lines().next().unwrap_or_default();
    let fields: Vec<&str> = record.split(':').collect();
    if fields.len() < 6 {
        return Err(InstallError::MalformedRecord {
            user: user.to_string(),
        });
    }
    Ok(PathBuf::from(fields[5]))
}

/// Resolve `user`'s home directory through `getent passwd`.
pub fn lookup_home(
    runner: &dyn CommandRunner,
    settings: &Settings,
    user: &str,
) -> Result<PathBuf, InstallError> {
    let invocation = Invocation::new(&settings.commands.getent, ["passwd", user]);
    let output = runner.run(&invocation).map_err(|e| InstallError::UserLookup {
        user: user.to_string(),
        message: e.to_string(),
    })?;
    if !output.success() {
        // getent exits 2 for "key not found" with empty output
        return Err(InstallError::UserLookup {
            user: user.to_string(),
            message: format!("failed to get user info: {}", output.status_text()),
        });
    }

    let home = parse_home(user, &output.stdout_text())?;
    tracing::debug!(user, home = %home.display(), "resolved home directory");
    Ok(home)
}
