//! Writing the key into the guest's disk image with `virt-customize`.

use crate::config::Settings;
use crate::error::InstallError;
use crate::progress::{OutputMode, Spinner};
use crate::runner::{CommandRunner, Invocation};

/// What to install, and for whom, inside the guest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInstall {
    pub username: String,
    pub public_key: String,
}

impl KeyInstall {
    pub fn new(username: impl Into<String>, public_key: &str) -> Self {
        Self {
            username: username.into(),
            public_key: public_key.trim().to_string(),
        }
    }

    pub fn ssh_dir(&self) -> String {
        format!("/home/{}/.ssh", self.username)
    }

    pub fn authorized_keys(&self) -> String {
        format!("{}/authorized_keys", self.ssh_dir())
    }

    /// Shell commands run inside the guest. Order matters: the directory must
    /// exist before the append, and ownership is fixed before modes.
    pub fn commands(&self) -> Vec<String> {
        let user = &self.username;
        let dir = self.ssh_dir();
        let keys = self.authorized_keys();
        vec![
            format!("mkdir -p {dir}"),
            format!("echo {} >> {keys}", single_quote(&self.public_key)),
            format!("chown -R {user}:{user} {dir}"),
            format!("chmod 700 {dir}"),
            format!("chmod 600 {keys}"),
        ]
    }

    /// The commands as one script for `--run-command`.
    pub fn script(&self) -> String {
        let mut script = String::from("\n");
        for line in self.commands() {
            script.push_str(&line);
            script.push('\n');
        }
        script
    }
}

/// Wrap in single quotes; embedded quotes become `'\''`.
fn single_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

pub fn customize_invocation(settings: &Settings, vm_name: &str, request: &KeyInstall) -> Invocation {
    let mut args = settings.connect_args();
    args.extend([
        "-d".to_string(),
        vm_name.to_string(),
        "--run-command".to_string(),
        request.script(),
    ]);
    Invocation::privileged(settings, &settings.commands.virt_customize, args)
}

/// Run the install script against the stopped VM's disk image.
pub fn install_key(
    runner: &dyn CommandRunner,
    settings: &Settings,
    mode: OutputMode,
    vm_name: &str,
    request: &KeyInstall,
) -> Result<(), InstallError> {
    let invocation = customize_invocation(settings, vm_name, request);
    tracing::info!(vm = vm_name, user = %request.username, "installing key into guest image");

    let output = {
        let _spinner = Spinner::start(mode, format!("Customizing {vm_name}..."));
        runner.run(&invocation)?
    };

    if !output.success() {
        return Err(InstallError::Install {
            command: invocation.tool().to_string(),
            status: output.status_text(),
            output: output.combined(),
        });
    }
    tracing::debug!(output = %output.combined().trim(), "virt-customize finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::tests::FakeRunner;

    #[test]
    fn commands_are_in_order() {
        let req = KeyInstall::new("alice", "ssh-ed25519 AAAA... comment\n");
        assert_eq!(
            req.commands(),
            vec![
                "mkdir -p /home/alice/.ssh",
                "echo 'ssh-ed25519 AAAA... comment' >> /home/alice/.ssh/authorized_keys",
                "chown -R alice:alice /home/alice/.ssh",
                "chmod 700 /home/alice/.ssh",
                "chmod 600 /home/alice/.ssh/authorized_keys",
            ]
        );
    }

    #[test]
    fn script_is_newline_delimited() {
        let req = KeyInstall::new("bob", "  ssh-rsa AAAAB3 bob@host  ");
        let script = req.script();
        assert!(script.starts_with("\nmkdir -p /home/bob/.ssh\n"));
        assert!(script.contains("echo 'ssh-rsa AAAAB3 bob@host' >> /home/bob/.ssh/authorized_keys\n"));
        assert!(script.ends_with("chmod 600 /home/bob/.ssh/authorized_keys\n"));
    }

    #[test]
    fn single_quotes_in_key_are_escaped() {
        let req = KeyInstall::new("bob", "ssh-rsa AAAA it's-mine");
        assert_eq!(
            req.commands()[1],
            r"echo 'ssh-rsa AAAA it'\''s-mine' >> /home/bob/.ssh/authorized_keys"
        );
    }

    #[test]
    fn invocation_targets_domain() {
        let req = KeyInstall::new("alice", "k");
        let inv = customize_invocation(&Settings::default(), "vm1", &req);
        assert_eq!(inv.program, "sudo");
        assert_eq!(&inv.args[..4], &["virt-customize", "-d", "vm1", "--run-command"]);
        assert_eq!(inv.args[4], req.script());
    }

    #[test]
    fn failure_embeds_combined_output() {
        let runner = FakeRunner::new().fail(1, "[   0.0] Examining the guest ...\n", "virt-customize: error: no disk\n");
        let req = KeyInstall::new("alice", "k");
        let err = install_key(&runner, &Settings::default(), OutputMode::Plain, "vm1", &req)
            .unwrap_err();
        match err {
            InstallError::Install { output, status, .. } => {
                assert!(output.contains("Examining the guest"));
                assert!(output.contains("no disk"));
                assert_eq!(status, "exit status 1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn success_runs_once() {
        let runner = FakeRunner::new().ok("");
        let req = KeyInstall::new("alice", "k");
        install_key(&runner, &Settings::default(), OutputMode::Plain, "vm1", &req).unwrap();
        assert_eq!(runner.tools(), vec!["virt-customize"]);
    }
}
