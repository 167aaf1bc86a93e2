use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum InstallError {
    #[error("The virtual machine {name} is not stopped. Please stop it before proceeding.")]
    #[diagnostic(help("shut it down first, e.g. `virsh shutdown {name}`"))]
    VmNotStopped { name: String },

    #[error("Failed to get home directory for user {user}: {message}")]
    UserLookup { user: String, message: String },

    #[error("Failed to get home directory for user {user}: unexpected output format from getent")]
    MalformedRecord { user: String },

    #[error("Failed to read public key {path}: {source}")]
    #[diagnostic(help("pass an explicit key with --key <path>"))]
    KeyRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to get current user. Please specify a username using the --user flag.")]
    NoUser,

    #[error("Failed to install SSH key: {command} failed ({status}), output: {output}")]
    #[diagnostic(help("virt-customize needs the VM's disk image to be readable and the VM shut off"))]
    Install {
        command: String,
        status: String,
        output: String,
    },

    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config from {path}: {message}")]
    ConfigParse { path: String, message: String },

    #[error("validation error: {message}")]
    Validation { message: String },
}
