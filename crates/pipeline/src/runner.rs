//! The pipeline runner.
//!
//! Stages, in order:
//! 1. Create the request's scratch directory and materialize the script.
//! 2. Run it with the scratch directory as working directory.
//! 3. Require exit code 0, then require the artifact at its expected path.
//! 4. Upload, share, and link the artifact.
//!
//! Afterwards the scratch directory is finalized: removed entirely after a
//! successful publish, otherwise reduced to whatever artifact was left so
//! it can be inspected.

use std::path::PathBuf;
use std::time::Duration;

use docpub_cloud::publisher::{PublishedArtifact, RemotePublisher};
use docpub_core::artifact::locate;
use docpub_core::scratch::RequestScratch;
use docpub_core::scripting::executor::{ScriptExecutor, ScriptInput};
use docpub_core::scripting::interpreter::InterpreterExecutor;
use tracing::Instrument;

use crate::error::PipelineError;
use crate::submission::ScriptSubmission;

/// Exact path the script must write its artifact to.
pub const ENV_ARTIFACT_PATH: &str = "DOCPUB_ARTIFACT_PATH";

/// The request's scratch directory (also the script's working directory).
pub const ENV_OUTPUT_DIR: &str = "DOCPUB_OUTPUT_DIR";

/// The request's unique identifier.
pub const ENV_REQUEST_ID: &str = "DOCPUB_REQUEST_ID";

/// Static settings for a [`Pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory under which per-request scratch directories are created.
    pub scratch_root: PathBuf,
    /// Extension given to materialized scripts (without the dot).
    pub script_extension: String,
    /// Timeout used when a submission does not request one.
    pub default_timeout: Duration,
    /// Upper bound on any submission's timeout.
    pub max_timeout: Duration,
}

/// Runs submissions end to end. Built once at startup and shared.
#[derive(Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    executor: InterpreterExecutor,
    publisher: RemotePublisher,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        executor: InterpreterExecutor,
        publisher: RemotePublisher,
    ) -> Self {
        Self {
            config,
            executor,
            publisher,
        }
    }

    /// Run a submission and publish its artifact.
    pub async fn run(
        &self,
        submission: &ScriptSubmission,
    ) -> Result<PublishedArtifact, PipelineError> {
        submission.validate()?;

        let scratch = RequestScratch::create(&self.config.scratch_root).await?;
        let span = tracing::info_span!(
            "pipeline",
            request_id = %scratch.id(),
            kind = %submission.artifact_kind,
        );

        async move {
            let mut scratch = scratch;
            let result = self.execute_and_publish(&mut scratch, submission).await;

            match &result {
                Ok(published) => {
                    tracing::info!(
                        remote_id = %published.remote_id,
                        link = %published.shareable_link,
                        "Artifact published"
                    );
                    scratch.remove_all().await;
                }
                Err(e) => {
                    tracing::warn!(code = e.code(), error = %e, "Pipeline failed");
                    scratch.cleanup().await;
                }
            }

            result
        }
        .instrument(span)
        .await
    }

    /// Create an empty shared spreadsheet. No script is involved.
    pub async fn create_spreadsheet(
        &self,
        sheet_name: &str,
    ) -> Result<PublishedArtifact, PipelineError> {
        let sheet_name = sheet_name.trim();
        if sheet_name.is_empty() {
            return Err(PipelineError::InvalidSubmission(
                "sheet_name must not be empty".into(),
            ));
        }

        let published = self.publisher.create_spreadsheet(sheet_name).await?;
        tracing::info!(
            remote_id = %published.remote_id,
            link = %published.shareable_link,
            "Spreadsheet published"
        );
        Ok(published)
    }

    async fn execute_and_publish(
        &self,
        scratch: &mut RequestScratch,
        submission: &ScriptSubmission,
    ) -> Result<PublishedArtifact, PipelineError> {
        let kind = submission.artifact_kind;
        let artifact_path = scratch.artifact_path(submission.artifact_base_name(), kind);

        let script = scratch
            .materialize(
                &submission.code,
                &self.config.script_extension,
                submission.line_separator,
            )
            .await?;

        let input = ScriptInput {
            env_vars: vec![
                (
                    ENV_ARTIFACT_PATH.to_string(),
                    artifact_path.to_string_lossy().into_owned(),
                ),
                (
                    ENV_OUTPUT_DIR.to_string(),
                    scratch.dir().to_string_lossy().into_owned(),
                ),
                (ENV_REQUEST_ID.to_string(), scratch.id().to_string()),
            ],
            working_directory: Some(scratch.dir().to_path_buf()),
            timeout: submission
                .effective_timeout(self.config.default_timeout, self.config.max_timeout),
        };

        tracing::debug!(
            interpreter = self.executor.program(),
            timeout_ms = input.timeout.as_millis() as u64,
            "Executing script"
        );
        let output = self.executor.execute(&script.path, input).await?;
        tracing::debug!(
            exit_code = output.exit_code,
            duration_ms = output.duration_ms,
            "Script finished"
        );

        if !output.success() {
            return Err(PipelineError::ScriptExecution {
                exit_code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        let artifact = locate(&artifact_path, kind).await?;
        let published = self.publisher.publish(&artifact).await?;
        Ok(published)
    }
}
