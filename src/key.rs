use std::path::{Path, PathBuf};

use ssh_key::{HashAlg, PublicKey};

use crate::config::Settings;
use crate::error::InstallError;
use crate::passwd;
use crate::runner::CommandRunner;

/// Path of the public key to install: `explicit` if given, otherwise the
/// configured default key under the invoking user's home directory.
pub fn resolve_key_path(
    explicit: Option<&Path>,
    current_user: Option<&str>,
    runner: &dyn CommandRunner,
    settings: &Settings,
) -> Result<PathBuf, InstallError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let user = current_user.ok_or_else(|| InstallError::UserLookup {
        user: String::new(),
        message: "USER is not set".into(),
    })?;
    let home = passwd::lookup_home(runner, settings, user)?;
    Ok(home.join(&settings.default_key))
}

pub fn read_public_key(path: &Path) -> Result<String, InstallError> {
    let bytes = std::fs::read(path).map_err(|source| InstallError::KeyRead {
        path: path.display().to_string(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Human-readable summary of an OpenSSH public key, `None` if it does not parse.
///
/// Informational only: unparseable keys are still installed as-is.
pub fn describe_key(text: &str) -> Option<String> {
    let key = PublicKey::from_openssh(text.trim()).ok()?;
    let fingerprint = key.fingerprint(HashAlg::Sha256);
    let comment = key.comment();
    if comment.is_empty() {
        Some(format!("{} {fingerprint}", key.algorithm()))
    } else {
        Some(format!("{} {fingerprint} ({comment})", key.algorithm()))
    }
}
