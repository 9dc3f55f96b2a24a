//! Interpreter-based script executor.
//!
//! Spawns an external interpreter (`python3`, `bash`, `node`, ...) with the
//! script path as its final argument and captures its output.

use std::path::Path;

use super::executor::{ScriptError, ScriptExecutor, ScriptInput, ScriptOutput};
use super::subprocess;

/// Executor that runs scripts through an external interpreter.
#[derive(Debug, Clone)]
pub struct InterpreterExecutor {
    program: String,
    args: Vec<String>,
}

impl InterpreterExecutor {
    /// Run scripts as `<program> <script_path>`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Run scripts as `<program> <args...> <script_path>`.
    pub fn with_args(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// The interpreter binary name or path.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl ScriptExecutor for InterpreterExecutor {
    async fn execute(
        &self,
        script_path: &Path,
        input: ScriptInput,
    ) -> Result<ScriptOutput, ScriptError> {
        tokio::fs::metadata(script_path)
            .await
            .map_err(|_| ScriptError::NotFound(script_path.to_path_buf()))?;

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args).arg(script_path);
        subprocess::run_command(&mut cmd, input).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::scripting::test_helpers::{default_input, write_temp_script};

    #[tokio::test]
    async fn test_script_not_found() {
        let result = InterpreterExecutor::new("sh")
            .execute(Path::new("/nonexistent/script.sh"), default_input())
            .await;
        assert!(matches!(result, Err(ScriptError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_env_vars() {
        let script = write_temp_script("echo $MY_VAR\n");
        let input = ScriptInput {
            env_vars: vec![("MY_VAR".to_string(), "hello_world".to_string())],
            ..default_input()
        };
        let output = InterpreterExecutor::new("sh")
            .execute(script.path(), input)
            .await
            .expect("execute");
        assert_eq!(output.exit_code, 0);
        assert!(output.stdout.contains("hello_world"));
    }

    #[tokio::test]
    async fn test_nonzero_exit() {
        let script = write_temp_script("echo failing >&2\nexit 42\n");
        let output = InterpreterExecutor::new("sh")
            .execute(script.path(), default_input())
            .await
            .expect("execute");
        assert_eq!(output.exit_code, 42);
        assert!(!output.success());
        assert!(output.stderr.contains("failing"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let script = write_temp_script("sleep 60\n");
        let input = ScriptInput {
            timeout: Duration::from_millis(200),
            ..default_input()
        };
        let result = InterpreterExecutor::new("sh")
            .execute(script.path(), input)
            .await;
        assert!(matches!(result, Err(ScriptError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_extra_args_precede_script() {
        let script =
            write_temp_script("case $- in *e*) echo errexit-on;; *) echo errexit-off;; esac\n");
        let output = InterpreterExecutor::with_args("sh", vec!["-e".to_string()])
            .execute(script.path(), default_input())
            .await
            .expect("execute");
        assert_eq!(output.exit_code, 0);
        assert_eq!(output.stdout.trim(), "errexit-on");
    }

    #[tokio::test]
    async fn test_working_directory() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let script = write_temp_script("printf hello > report.docx\n");
        let input = ScriptInput {
            working_directory: Some(dir.path().to_path_buf()),
            ..default_input()
        };
        let output = InterpreterExecutor::new("sh")
            .execute(script.path(), input)
            .await
            .expect("execute");
        assert_eq!(output.exit_code, 0);
        let written = std::fs::read_to_string(dir.path().join("report.docx")).expect("artifact");
        assert_eq!(written, "hello");
    }
}
