use std::path::{Path, PathBuf};

use facet::Facet;

use crate::error::InstallError;

/// Names (or paths) of the external programs this tool drives.
#[derive(Debug, Clone, Facet)]
#[facet(default)]
pub struct CommandsConfig {
    #[facet(default = "virsh")]
    pub virsh: String,
    #[facet(default = "virt-customize")]
    pub virt_customize: String,
    #[facet(default = "getent")]
    pub getent: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            virsh: "virsh".into(),
            virt_customize: "virt-customize".into(),
            getent: "getent".into(),
        }
    }
}

#[derive(Debug, Clone, Facet)]
#[facet(default)]
pub struct Settings {
    /// Run `virsh` and `virt-customize` through `sudo`.
    #[facet(default = true)]
    pub sudo: bool,
    /// Passed as `-c` to libvirt tools when non-empty.
    #[facet(default)]
    pub libvirt_uri: String,
    /// Key used when `--key` is absent, relative to the invoking user's home.
    #[facet(default = ".ssh/id_rsa.pub")]
    pub default_key: String,
    #[facet(default)]
    pub commands: CommandsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sudo: true,
            libvirt_uri: String::new(),
            default_key: ".ssh/id_rsa.pub".into(),
            commands: CommandsConfig::default(),
        }
    }
}

impl Settings {
    /// `-c URI` arguments for libvirt tools, empty when no URI is configured.
    pub fn connect_args(&self) -> Vec<String> {
        if self.libvirt_uri.is_empty() {
            Vec::new()
        } else {
            vec!["-c".into(), self.libvirt_uri.clone()]
        }
    }
}

/// `~/.config/kvm-install-sshkey/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("kvm-install-sshkey").join("config.toml"))
}

/// Load settings from an explicit path (must exist), or from the default
/// location if present, or fall back to built-in defaults.
pub fn resolve_settings(explicit: Option<&Path>) -> Result<Settings, InstallError> {
    match explicit {
        Some(path) => load_settings(path),
        None => match default_config_path() {
            Some(path) if path.is_file() => load_settings(&path),
            _ => Ok(Settings::default()),
        },
    }
}

pub fn load_settings(path: &Path) -> Result<Settings, InstallError> {
    let contents = std::fs::read_to_string(path).map_err(|source| InstallError::ConfigLoad {
        path: path.display().to_string(),
        source,
    })?;
    let settings = parse_settings(&contents).map_err(|e| match e {
        InstallError::ConfigParse { message, .. } => InstallError::ConfigParse {
            path: path.display().to_string(),
            message,
        },
        other => other,
    })?;
    tracing::debug!(path = %path.display(), "loaded settings");
    Ok(settings)
}

pub fn parse_settings(contents: &str) -> Result<Settings, InstallError> {
    let settings: Settings =
        facet_toml::from_str(contents).map_err(|e| InstallError::ConfigParse {
            path: "<inline>".into(),
            message: e.to_string(),
        })?;
    validate_settings(&settings)?;
    Ok(settings)
}

fn validate_settings(settings: &Settings) -> Result<(), InstallError> {
    let commands = &settings.commands;
    for (field, value) in [
        ("commands.virsh", &commands.virsh),
        ("commands.virt_customize", &commands.virt_customize),
        ("commands.getent", &commands.getent),
    ] {
        if value.trim().is_empty() {
            return Err(InstallError::Validation {
                message: format!("{field} must not be empty"),
            });
        }
    }

    if settings.default_key.is_empty() || Path::new(&settings.default_key).is_absolute() {
        return Err(InstallError::Validation {
            message: format!(
                "default_key must be a path relative to the home directory (got '{}')",
                settings.default_key
            ),
        });
    }
    Ok(())
}
