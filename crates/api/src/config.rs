use std::path::PathBuf;
use std::time::Duration;

use docpub_core::scripting::interpreter::InterpreterExecutor;
use docpub_pipeline::PipelineConfig;

/// Time reserved inside each HTTP request for upload and sharing after the
/// script finishes.
pub const PUBLISH_HEADROOM_SECS: u64 = 60;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. In production,
/// override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `660`).
    pub request_timeout_secs: u64,
    /// Root of the per-request scratch directories.
    pub scratch_dir: PathBuf,
    /// Interpreter that runs submitted scripts (default: `python3`).
    pub script_interpreter: String,
    /// Arguments placed before the script path, whitespace-separated in
    /// `SCRIPT_INTERPRETER_ARGS` (default: none).
    pub script_interpreter_args: Vec<String>,
    /// Extension given to materialized scripts (default: `py`).
    pub script_extension: String,
    /// Script timeout when the request does not ask for one (default: `120`).
    pub script_timeout_secs: u64,
    /// Upper bound on any requested script timeout (default: `600`).
    pub script_max_timeout_secs: u64,
    /// Drive folder that receives uploads (default: none, the drive root).
    pub drive_folder_id: Option<String>,
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                  |
    /// |---------------------------|--------------------------|
    /// | `HOST`                    | `0.0.0.0`                |
    /// | `PORT`                    | `3000`                   |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`    | `660`                    |
    /// | `SCRATCH_DIR`             | `<temp dir>/docpub`      |
    /// | `SCRIPT_INTERPRETER`      | `python3`                |
    /// | `SCRIPT_INTERPRETER_ARGS` | empty                    |
    /// | `SCRIPT_EXTENSION`        | `py`                     |
    /// | `SCRIPT_TIMEOUT_SECS`     | `120`                    |
    /// | `SCRIPT_MAX_TIMEOUT_SECS` | `600`                    |
    /// | `DRIVE_FOLDER_ID`         | unset                    |
    /// | `LOG_FORMAT`              | `text` (`json` to switch)|
    ///
    /// # Panics
    ///
    /// Panics if a numeric variable does not parse.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "660".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let scratch_dir = std::env::var("SCRATCH_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir().join("docpub"));

        let script_interpreter =
            std::env::var("SCRIPT_INTERPRETER").unwrap_or_else(|_| "python3".into());

        let script_interpreter_args: Vec<String> = std::env::var("SCRIPT_INTERPRETER_ARGS")
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let script_extension = std::env::var("SCRIPT_EXTENSION")
            .map(|e| e.trim_start_matches('.').to_string())
            .unwrap_or_else(|_| "py".into());

        let script_timeout_secs: u64 = std::env::var("SCRIPT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("SCRIPT_TIMEOUT_SECS must be a valid u64");

        let script_max_timeout_secs: u64 = std::env::var("SCRIPT_MAX_TIMEOUT_SECS")
            .unwrap_or_else(|_| "600".into())
            .parse()
            .expect("SCRIPT_MAX_TIMEOUT_SECS must be a valid u64");

        let drive_folder_id = std::env::var("DRIVE_FOLDER_ID")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let log_json = is_json_log_format(std::env::var("LOG_FORMAT").ok().as_deref());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            scratch_dir,
            script_interpreter,
            script_interpreter_args,
            script_extension,
            script_timeout_secs,
            script_max_timeout_secs,
            drive_folder_id,
            log_json,
        }
    }

    /// The executor that runs materialized scripts.
    pub fn script_executor(&self) -> InterpreterExecutor {
        InterpreterExecutor::with_args(
            self.script_interpreter.clone(),
            self.script_interpreter_args.clone(),
        )
    }

    /// Longest script timeout the HTTP request timeout leaves room for.
    ///
    /// The configured maximum, lowered if needed so that a script timing out
    /// still leaves [`PUBLISH_HEADROOM_SECS`] before the request is cut off.
    /// Never below one second.
    pub fn script_timeout_ceiling_secs(&self) -> u64 {
        let room = self
            .request_timeout_secs
            .saturating_sub(PUBLISH_HEADROOM_SECS)
            .max(1);
        self.script_max_timeout_secs
            .max(self.script_timeout_secs)
            .min(room)
    }

    /// Pipeline settings derived from this configuration.
    pub fn pipeline_config(&self) -> PipelineConfig {
        let ceiling = self.script_timeout_ceiling_secs();
        PipelineConfig {
            scratch_root: self.scratch_dir.clone(),
            script_extension: self.script_extension.clone(),
            default_timeout: Duration::from_secs(self.script_timeout_secs.min(ceiling)),
            max_timeout: Duration::from_secs(ceiling),
        }
    }
}

/// `LOG_FORMAT=json` (any case) selects JSON lines; anything else is text.
fn is_json_log_format(value: Option<&str>) -> bool {
    value.is_some_and(|f| f.trim().eq_ignore_ascii_case("json"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
