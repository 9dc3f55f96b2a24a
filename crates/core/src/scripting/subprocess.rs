//! Shared subprocess management utilities.
//!
//! Provides [`run_command`], the spawn + capture + timeout logic shared by
//! executors. Each executor builds a [`tokio::process::Command`] for its
//! runtime and delegates the rest here.

use std::process::Stdio;
use std::time::Instant;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

use super::executor::{ScriptError, ScriptInput, ScriptOutput};

/// Maximum stdout or stderr size captured per stream (10 MiB).
///
/// Output past this limit is read and discarded so the script never sees
/// a closed pipe.
const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Read size for draining output streams.
const READ_CHUNK_BYTES: usize = 8 * 1024;

/// Spawn `cmd` as a child process with stdin closed, capture stdout/stderr
/// in full, and enforce the configured timeout.
///
/// The caller sets the program and arguments. Environment variables and the
/// working directory from [`ScriptInput`] are applied here.
///
/// The timeout covers both the child's exit and the draining of its output
/// streams, so a background process that inherits stdout cannot hold the
/// call open. Every process in the child's group is killed when the call
/// returns or its future is dropped.
pub async fn run_command(
    cmd: &mut Command,
    input: ScriptInput,
) -> Result<ScriptOutput, ScriptError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Own process group so everything the script forks can be signalled at once.
    #[cfg(unix)]
    cmd.process_group(0);

    for (key, value) in &input.env_vars {
        cmd.env(key, value);
    }

    if let Some(dir) = &input.working_directory {
        cmd.current_dir(dir);
    }

    let start = Instant::now();

    let mut child = cmd.spawn().map_err(ScriptError::IoError)?;
    // Declared after `child` so it drops first: the group dies before the
    // child handle's own `kill_on_drop`.
    let _group = ProcessGroupGuard::new(child.id());

    // Read stdout/stderr in spawned tasks so `child.wait()` can borrow the child.
    let stdout_handle = child.stdout.take();
    let stderr_handle = child.stderr.take();

    let mut stdout_task = tokio::spawn(async move { read_stream(stdout_handle).await });
    let mut stderr_task = tokio::spawn(async move { read_stream(stderr_handle).await });

    let finished = tokio::time::timeout(input.timeout, async {
        let status = child.wait().await?;
        let stdout = (&mut stdout_task).await.unwrap_or_default();
        let stderr = (&mut stderr_task).await.unwrap_or_default();
        Ok::<_, std::io::Error>((status, stdout, stderr))
    })
    .await;

    match finished {
        Ok(Ok((status, stdout_bytes, stderr_bytes))) => Ok(ScriptOutput {
            stdout: String::from_utf8_lossy(&stdout_bytes).into_owned(),
            stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
            exit_code: status.code().unwrap_or(-1),
            duration_ms: start.elapsed().as_millis() as u64,
        }),
        Ok(Err(e)) => Err(ScriptError::IoError(e)),
        Err(_elapsed) => {
            terminate(&mut child).await;
            stdout_task.abort();
            stderr_task.abort();
            let elapsed_ms = start.elapsed().as_millis() as u64;
            tracing::warn!(elapsed_ms, "Script exceeded its timeout and was killed");
            Err(ScriptError::Timeout { elapsed_ms })
        }
    }
}

/// Sends SIGKILL to a child's process group when dropped.
///
/// Covers normal return, timeout, and cancellation alike. The group was
/// created by `process_group(0)`, so its id is the child's pid.
struct ProcessGroupGuard {
    #[cfg_attr(not(unix), allow(dead_code))]
    pgid: Option<u32>,
}

impl ProcessGroupGuard {
    fn new(pgid: Option<u32>) -> Self {
        Self { pgid }
    }

    fn kill(&self) {
        #[cfg(unix)]
        if let Some(pgid) = self.pgid {
            // SAFETY: `kill` only sends a signal; a negative pid addresses
            // the whole group.
            unsafe {
                libc::kill(-(pgid as libc::pid_t), libc::SIGKILL);
            }
        }
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Kill the child's process group and the child itself, then reap it.
async fn terminate(child: &mut Child) {
    ProcessGroupGuard::new(child.id()).kill();
    if let Err(e) = child.kill().await {
        tracing::debug!(error = %e, "Child already exited before kill");
    }
}

/// Read an entire output stream, keeping the first [`MAX_OUTPUT_BYTES`].
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    let Some(mut h) = handle else {
        return buf;
    };
    let mut chunk = vec![0u8; READ_CHUNK_BYTES];
    loop {
        match h.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let room = MAX_OUTPUT_BYTES.saturating_sub(buf.len());
                buf.extend_from_slice(&chunk[..n.min(room)]);
            }
        }
    }
    buf
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::scripting::test_helpers::{default_input, read_pid_file};
    #[cfg(target_os = "linux")]
    use crate::scripting::test_helpers::wait_until_dead;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[tokio::test]
    async fn captures_both_streams() {
        let output = run_command(&mut sh("echo out; echo err >&2"), default_input())
            .await
            .expect("run");
        assert_eq!(output.exit_code, 0);
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn stdin_is_closed() {
        // `cat` would block forever on an open stdin.
        let output = run_command(&mut sh("cat"), default_input())
            .await
            .expect("run");
        assert_eq!(output.exit_code, 0);
        assert!(output.stdout.is_empty());
    }

    #[tokio::test]
    async fn timeout_kills_forked_children() {
        let input = ScriptInput {
            timeout: Duration::from_millis(200),
            ..default_input()
        };
        let start = Instant::now();
        let result = run_command(&mut sh("sleep 30 & sleep 30; wait"), input).await;
        assert!(matches!(result, Err(ScriptError::Timeout { .. })));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn spawn_failure_is_io_error() {
        let mut cmd = Command::new("/nonexistent/interpreter");
        let result = run_command(&mut cmd, default_input()).await;
        assert!(matches!(result, Err(ScriptError::IoError(_))));
    }

    #[tokio::test]
    async fn timeout_covers_background_children() {
        let dir = tempfile::tempdir().unwrap();
        let input = ScriptInput {
            working_directory: Some(dir.path().to_path_buf()),
            timeout: Duration::from_millis(500),
            ..default_input()
        };
        let start = Instant::now();
        // The direct child exits at once; the background sleep keeps stdout open.
        let result = run_command(&mut sh("sleep 30 & echo $! > bg.pid; exit 0"), input).await;

        assert!(matches!(result, Err(ScriptError::Timeout { .. })));
        assert!(start.elapsed() < Duration::from_secs(5));

        let _pid = read_pid_file(&dir.path().join("bg.pid")).await;
        #[cfg(target_os = "linux")]
        assert!(wait_until_dead(_pid).await, "background child survived the timeout");
    }

    #[tokio::test]
    async fn dropped_call_kills_process_group() {
        let dir = tempfile::tempdir().unwrap();
        let input = ScriptInput {
            working_directory: Some(dir.path().to_path_buf()),
            timeout: Duration::from_secs(30),
            ..default_input()
        };
        let mut cmd = sh("sleep 30 & echo $! > bg.pid; wait");

        let cancelled =
            tokio::time::timeout(Duration::from_millis(300), run_command(&mut cmd, input)).await;
        assert!(cancelled.is_err());

        let _pid = read_pid_file(&dir.path().join("bg.pid")).await;
        #[cfg(target_os = "linux")]
        assert!(wait_until_dead(_pid).await, "background child survived cancellation");
    }

    #[tokio::test]
    async fn output_past_cap_is_drained_not_cut() {
        // With a closed pipe `head` would die of SIGPIPE and the script exit 7.
        let script = format!("head -c {} /dev/zero || exit 7", MAX_OUTPUT_BYTES + 1024 * 1024);
        let output = run_command(&mut sh(&script), default_input())
            .await
            .expect("run");

        assert_eq!(output.exit_code, 0);
        assert_eq!(output.stdout.len(), MAX_OUTPUT_BYTES);
    }
}
