use clap::{CommandFactory, Parser};
use std::path::PathBuf;

use crate::install::Request;

#[derive(Parser, Debug)]
#[command(
    name = "kvm-install-sshkey",
    version,
    about = "Install an SSH public key into a stopped libvirt VM"
)]
pub struct Cli {
    /// Username on the virtual machine (default: current user)
    #[arg(long, value_name = "USERNAME")]
    pub user: Option<String>,

    /// Path to the SSH public key file (default: $HOME/.ssh/id_rsa.pub)
    #[arg(long, value_name = "KEYPATH")]
    pub key: Option<PathBuf>,

    /// Path to config file (default: ~/.config/kvm-install-sshkey/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Name of the libvirt domain
    pub vm_name: String,
}

impl Cli {
    pub fn request(&self) -> Request {
        Request {
            vm_name: self.vm_name.clone(),
            user: self.user.clone(),
            key: self.key.clone(),
        }
    }
}

/// Short usage banner followed by the argument and flag list.
pub fn usage() -> String {
    let options = Cli::command()
        .help_template("{all-args}")
        .render_help()
        .to_string();
    format!("Usage: kvm-install-sshkey [options] VM_NAME\n{options}")
}
