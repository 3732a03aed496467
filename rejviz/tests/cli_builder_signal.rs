//! Interrupting the wrapper while virt-builder runs.

use std::fs::{self, Permissions};
use std::os::unix::fs::PermissionsExt;
use std::process::{Command, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};

use rustix::process::{kill_process, Signal};
use rustix::thread::Pid;
use tempfile::tempdir;

const SLOW_BUILDER: &str = "#!/bin/sh
touch \"$REJVIZ_TEST_STARTED\"
exec sleep 30
";

#[test]
fn sigterm_still_removes_scratch_dir() {
    let dir = tempdir().expect("tempdir");
    let base = dir.path().join("scratch");
    fs::create_dir(&base).expect("scratch base");
    let builder = dir.path().join("virt-builder");
    fs::write(&builder, SLOW_BUILDER).expect("write builder");
    fs::set_permissions(&builder, Permissions::from_mode(0o755)).expect("chmod builder");
    let config = dir.path().join("rejviz.toml");
    fs::write(
        &config,
        format!(
            "[tools]\nvirt_builder = {:?}\n[scratch]\nbase_dir = {:?}\n",
            builder.display().to_string(),
            base.display().to_string(),
        ),
    )
    .expect("write config");
    let started = dir.path().join("started");

    let mut wrapper = Command::new(assert_cmd::cargo::cargo_bin!("rejviz"))
        .arg("--config")
        .arg(&config)
        .args(["builder", "fedora-39", "--nic", "name=eth0"])
        .env("REJVIZ_TEST_STARTED", &started)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn rejviz");

    let deadline = Instant::now() + Duration::from_secs(20);
    while !started.exists() {
        assert!(Instant::now() < deadline, "builder never started");
        sleep(Duration::from_millis(20));
    }
    assert!(fs::read_dir(&base).expect("read base").next().is_some());

    let pid = i32::try_from(wrapper.id())
        .ok()
        .and_then(Pid::from_raw)
        .expect("pid");
    kill_process(pid, Signal::TERM).expect("send SIGTERM");
    let status = wrapper.wait().expect("wait rejviz");

    assert!(!status.success());
    assert!(
        fs::read_dir(&base).expect("read base").next().is_none(),
        "scratch directory left behind"
    );
}
