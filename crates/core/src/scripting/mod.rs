//! Subprocess execution of materialized scripts.
//!
//! [`executor`] defines the [`ScriptExecutor`](executor::ScriptExecutor)
//! trait and its input/output types, [`interpreter`] runs a script through an
//! external interpreter, and [`subprocess`] holds the shared spawn, capture,
//! and timeout logic.

pub mod executor;
pub mod interpreter;
pub mod subprocess;

/// Shared test helpers for executor tests.
#[cfg(test)]
pub(crate) mod test_helpers {
    use std::time::Duration;

    use super::executor::ScriptInput;

    /// Build a default [`ScriptInput`] for tests: no env vars, no working
    /// directory, and a 5-second timeout.
    pub fn default_input() -> ScriptInput {
        ScriptInput {
            env_vars: vec![],
            working_directory: None,
            timeout: Duration::from_secs(5),
        }
    }

    /// Write `body` to a temporary `.sh` file.
    pub fn write_temp_script(body: &str) -> tempfile::NamedTempFile {
        use std::io::Write;
        let mut f = tempfile::Builder::new()
            .suffix(".sh")
            .tempfile()
            .expect("create temp file");
        write!(f, "{body}").expect("write body");
        f
    }

    /// Whether `pid` names a live (non-zombie) process, per `/proc`.
    #[cfg(target_os = "linux")]
    pub fn process_alive(pid: u32) -> bool {
        let Ok(stat) = std::fs::read_to_string(format!("/proc/{pid}/stat")) else {
            return false;
        };
        // State is the first field after the parenthesised command name.
        let state = stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.trim_start().chars().next());
        !matches!(state, Some('Z') | Some('X') | None)
    }

    /// Poll until `pid` is gone, for at most two seconds.
    #[cfg(target_os = "linux")]
    pub async fn wait_until_dead(pid: u32) -> bool {
        for _ in 0..40 {
            if !process_alive(pid) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        false
    }

    /// Read a pid that a script wrote to `path`, waiting briefly for it.
    pub async fn read_pid_file(path: &std::path::Path) -> u32 {
        for _ in 0..40 {
            if let Ok(text) = std::fs::read_to_string(path) {
                if let Ok(pid) = text.trim().parse() {
                    return pid;
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("no pid written to {}", path.display());
    }
}
