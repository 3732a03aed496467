//! Helpers for running the external libguestfs and libvirt tools.

use std::io::{Read, Seek, SeekFrom, Write};
use std::process::{Command, ExitCode, ExitStatus, Stdio};

use anyhow::{anyhow, bail, Context, Result};
use rustix::io::Errno;
use rustix::process::{kill_process, Signal};
use rustix::thread::Pid;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tracing::{debug, warn};

/// Trailing bytes of stderr included in failure messages.
const MAX_STDERR_BYTES: u64 = 1024;

/// Helpers intended for [`std::process::Command`].
pub trait CommandRun {
    /// Run to completion and return stdout; fails if the child exits unsuccessfully.
    fn run_get_string(&mut self) -> Result<String>;

    /// Like [`CommandRun::run_get_string`], feeding `input` on stdin.
    fn run_with_stdin(&mut self, input: &str) -> Result<String>;

    /// Run with inherited stdio and translate the exit status into an exit code.
    ///
    /// SIGINT and SIGTERM received meanwhile are forwarded to the child
    /// instead of ending this process.
    fn run_passthrough(&mut self) -> Result<ExitCode>;
}

impl CommandRun for Command {
    fn run_get_string(&mut self) -> Result<String> {
        self.stdin(Stdio::null());
        run_captured(self, None)
    }

    fn run_with_stdin(&mut self, input: &str) -> Result<String> {
        self.stdin(Stdio::piped());
        run_captured(self, Some(input))
    }

    fn run_passthrough(&mut self) -> Result<ExitCode> {
        debug!("exec: {self:?}");
        // Registered before spawning: from here on SIGINT/SIGTERM cannot end
        // this process while the child runs.
        let mut signals =
            Signals::new([SIGINT, SIGTERM]).context("failed to install signal handlers")?;
        let handle = signals.handle();

        let mut child = self
            .spawn()
            .with_context(|| format!("failed to execute {:?}", self.get_program()))?;

        let pid = i32::try_from(child.id()).ok().and_then(Pid::from_raw);
        let forwarder = std::thread::spawn(move || {
            for signal in signals.forever() {
                warn!("received signal {signal}, waiting for the child to exit");
                if let Some(pid) = pid {
                    forward_signal(pid, signal);
                }
            }
        });

        let status = child.wait();
        handle.close();
        if forwarder.join().is_err() {
            warn!("signal forwarding thread panicked");
        }
        let status =
            status.with_context(|| format!("failed to wait for {:?}", self.get_program()))?;
        Ok(exit_code(status))
    }
}

/// Pass a signal the wrapper caught on to the child it is waiting for.
fn forward_signal(pid: Pid, signal: i32) {
    let signal = if signal == SIGINT {
        Signal::INT
    } else {
        Signal::TERM
    };
    match kill_process(pid, signal) {
        Ok(()) | Err(Errno::SRCH) => {}
        Err(e) => warn!("failed to forward signal to child: {e}"),
    }
}

fn run_captured(cmd: &mut Command, input: Option<&str>) -> Result<String> {
    let mut stderr = tempfile::tempfile().context("stderr tempfile")?;
    cmd.stdout(Stdio::piped())
        .stderr(stderr.try_clone().context("clone stderr tempfile")?);
    debug!("exec: {cmd:?}");

    let mut child = cmd
        .spawn()
        .with_context(|| format!("failed to execute {:?}", cmd.get_program()))?;

    // Feed stdin from a thread so a chatty child cannot fill stdout and block us.
    let writer = match (input, child.stdin.take()) {
        (Some(input), Some(mut stdin)) => {
            let input = input.to_string();
            Some(std::thread::spawn(move || stdin.write_all(input.as_bytes())))
        }
        _ => None,
    };

    let output = child.wait_with_output().context("waiting for child")?;
    if let Some(writer) = writer {
        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("failed to write child stdin: {e}"),
            Err(_) => warn!("stdin writer thread panicked"),
        }
    }

    if !output.status.success() {
        bail!(
            "{:?} failed: {}\n{}",
            cmd.get_program(),
            output.status,
            stderr_tail(&mut stderr)
        );
    }
    String::from_utf8(output.stdout)
        .map_err(|e| anyhow!("{:?} printed invalid UTF-8: {e}", cmd.get_program()))
}

fn stderr_tail(f: &mut std::fs::File) -> String {
    let size = f.metadata().map(|m| m.len()).unwrap_or(0);
    let offset = size.saturating_sub(MAX_STDERR_BYTES);
    let mut buf = Vec::new();
    match f
        .seek(SeekFrom::Start(offset))
        .and_then(|_| f.read_to_end(&mut buf))
    {
        Ok(_) => String::from_utf8_lossy(&buf).into_owned(),
        Err(e) => {
            warn!("failed to read child stderr: {e}");
            "<failed to read stderr>".to_string()
        }
    }
}

/// Map a child's status onto our exit code; signals become 1.
fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => ExitCode::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use std::process::Command;

    use super::CommandRun;

    #[test]
    fn captures_stdout() {
        let out = Command::new("echo").arg("hello").run_get_string().expect("echo");
        assert_eq!(out, "hello\n");
    }

    #[test]
    fn feeds_stdin() {
        let out = Command::new("cat").run_with_stdin("line one\nline two\n").expect("cat");
        assert_eq!(out, "line one\nline two\n");
    }

    #[test]
    fn failure_includes_stderr() {
        let err = Command::new("sh")
            .args(["-c", "echo broken image >&2; exit 3"])
            .run_get_string()
            .expect_err("should fail");
        let msg = format!("{err:#}");
        assert!(msg.contains("broken image"), "{msg}");
    }

    #[test]
    fn missing_program_is_an_error() {
        assert!(Command::new("/nonexistent/rejviz-tool")
            .run_get_string()
            .is_err());
    }
}
