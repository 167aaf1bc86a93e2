use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

fn kvm_install_sshkey() -> assert_cmd::Command {
    cargo_bin_cmd!("kvm-install-sshkey")
}

/// Fake host tools in a temp dir, wired up through a config file.
struct FakeHost {
    dir: tempfile::TempDir,
}

impl FakeHost {
    fn new(running_vms: &str, customize_exit: i32) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        write_script(
            &root.join("virsh"),
            &format!("#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\nprintf '{running_vms}'\n", root.join("virsh.args").display()),
        );
        write_script(
            &root.join("getent"),
            &format!(
                "#!/bin/sh\n[ \"$2\" = alice ] || exit 2\necho \"alice:x:1000:1000::{}:/bin/sh\"\n",
                root.join("home").display()
            ),
        );
        write_script(
            &root.join("virt-customize"),
            &format!(
                "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\necho 'customizing'\nexit {customize_exit}\n",
                root.join("customize.args").display()
            ),
        );

        std::fs::write(
            root.join("config.toml"),
            format!(
                r#"
sudo = false

[commands]
virsh = "{root}/virsh"
virt_customize = "{root}/virt-customize"
getent = "{root}/getent"
"#,
                root = root.display()
            ),
        )
        .unwrap();

        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn config(&self) -> String {
        self.path("config.toml").display().to_string()
    }

    fn write_key(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn customize_args(&self) -> Option<String> {
        std::fs::read_to_string(self.path("customize.args")).ok()
    }
}

fn write_script(path: &Path, body: &str) {
    std::fs::write(path, body).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn help_works() {
    kvm_install_sshkey()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Install an SSH public key"));
}

#[test]
fn version_works() {
    kvm_install_sshkey()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("kvm-install-sshkey"));
}

#[test]
fn missing_vm_name_prints_usage() {
    kvm_install_sshkey()
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage: kvm-install-sshkey [options] VM_NAME"))
        .stdout(predicate::str::contains("--key"));
}

#[test]
fn extra_positional_prints_usage() {
    kvm_install_sshkey()
        .args(["vm1", "vm2"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn installs_key_into_stopped_vm() {
    let host = FakeHost::new("other\\n", 0);
    let key = host.write_key("key.pub", "ssh-ed25519 AAAA... comment\n");

    kvm_install_sshkey()
        .args(["--config", host.config().as_str(), "--user", "alice", "--key"])
        .arg(&key)
        .arg("vm1")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Successfully installed SSH public key for user alice on the VM vm1.",
        ));

    let args = host.customize_args().unwrap();
    assert!(args.starts_with("-d\nvm1\n--run-command\n"));
    assert!(args.contains("mkdir -p /home/alice/.ssh"));
    assert!(args.contains("echo 'ssh-ed25519 AAAA... comment' >> /home/alice/.ssh/authorized_keys"));
    assert!(args.contains("chown -R alice:alice /home/alice/.ssh"));
    assert!(args.contains("chmod 700 /home/alice/.ssh"));
    assert!(args.contains("chmod 600 /home/alice/.ssh/authorized_keys"));
}

#[test]
fn running_vm_is_refused() {
    let host = FakeHost::new("vm1\\n", 0);
    let key = host.write_key("key.pub", "ssh-ed25519 AAAA... comment\n");

    kvm_install_sshkey()
        .args(["--config", host.config().as_str(), "--user", "alice", "--key"])
        .arg(&key)
        .arg("vm1")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("The virtual machine vm1 is not stopped"));

    let virsh_args = std::fs::read_to_string(host.path("virsh.args")).unwrap();
    assert_eq!(virsh_args, "list\n--name\n--state-running\n");
    assert!(host.customize_args().is_none());
}

#[test]
fn default_key_and_user_come_from_environment() {
    let host = FakeHost::new("", 0);
    host.write_key("home/.ssh/id_rsa.pub", "ssh-rsa AAAAB3 alice@host\n");

    kvm_install_sshkey()
        .args(["--config", host.config().as_str(), "vm1"])
        .env("USER", "alice")
        .assert()
        .success()
        .stdout(predicate::str::contains("for user alice on the VM vm1"));

    let args = host.customize_args().unwrap();
    assert!(args.contains("echo 'ssh-rsa AAAAB3 alice@host' >> /home/alice/.ssh/authorized_keys"));
}

#[test]
fn no_user_fails_before_install() {
    let host = FakeHost::new("", 0);
    let key = host.write_key("key.pub", "ssh-ed25519 AAAA... comment\n");

    kvm_install_sshkey()
        .args(["--config", host.config().as_str(), "--key"])
        .arg(&key)
        .arg("vm1")
        .env_remove("USER")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Failed to get current user"));

    assert!(host.customize_args().is_none());
}

#[test]
fn missing_key_file_fails() {
    let host = FakeHost::new("", 0);

    kvm_install_sshkey()
        .args(["--config", host.config().as_str(), "--user", "alice", "--key", "/nonexistent/key.pub", "vm1"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Failed to read public key"));

    assert!(host.customize_args().is_none());
}

#[test]
fn customize_failure_reports_output() {
    let host = FakeHost::new("", 1);
    let key = host.write_key("key.pub", "ssh-ed25519 AAAA... comment\n");

    kvm_install_sshkey()
        .args(["--config", host.config().as_str(), "--user", "alice", "--key"])
        .arg(&key)
        .arg("vm1")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Failed to install SSH key"))
        .stdout(predicate::str::contains("customizing"));
}

#[test]
fn missing_config_shows_error() {
    kvm_install_sshkey()
        .args(["--config", "/nonexistent/config.toml", "vm1"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("failed to load config"));
}
