use crate::AuditSnapshot;
use derive_more::{Display, Error};
use miette::Diagnostic;
use modup_diagnostics::Logger;
use modup_executor::{ExecutorError, Program};
use std::process::ExitStatus;

/// When an audit snapshot is taken relative to the upgrade.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum AuditPhase {
    #[display("before")]
    Before,
    #[display("after")]
    After,
}

/// `npm audit --json` produced nothing usable.
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum AuditQueryError {
    #[display("Failed to run the {phase} audit")]
    #[diagnostic(code(modup_audit::spawn_audit))]
    Spawn {
        phase: AuditPhase,
        #[error(source)]
        error: ExecutorError,
    },

    #[display("The {phase} audit exited with {status} and printed nothing: {stderr}")]
    #[diagnostic(code(modup_audit::empty_audit))]
    EmptyOutput { phase: AuditPhase, status: ExitStatus, stderr: String },
}

/// `npm audit fix` could not be run or reported failure.
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum AuditFixError {
    #[display("Failed to run npm audit fix")]
    #[diagnostic(code(modup_audit::spawn_fix))]
    Spawn(#[error(source)] ExecutorError),

    #[display("npm audit fix exited with {status}: {stderr}")]
    #[diagnostic(
        code(modup_audit::fix_failed),
        help("The manifest has already been written. Run `npm audit fix` manually to see the details.")
    )]
    Status { status: ExitStatus, stderr: String },
}

async fn query(npm: &Program, phase: AuditPhase) -> Result<AuditSnapshot, AuditQueryError> {
    let output = npm
        .capture(["audit", "--json"])
        .await
        .map_err(|error| AuditQueryError::Spawn { phase, error })?;
    // npm exits non-zero when it finds vulnerabilities, so only missing output is a failure.
    if output.trimmed_stdout().is_none() {
        return Err(AuditQueryError::EmptyOutput {
            phase,
            status: output.status,
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(AuditSnapshot::new(output.stdout))
}

/// Take an audit snapshot with `npm audit --json`.
///
/// Never fails. An audit that cannot be taken is logged and yields [`AuditSnapshot::empty`].
pub async fn run_audit(npm: &Program, phase: AuditPhase, logger: Logger) -> AuditSnapshot {
    logger.debug(format_args!("Running the {phase} audit..."));
    match query(npm, phase).await {
        Ok(snapshot) => snapshot,
        Err(error) => {
            logger.info(format_args!("{error}"));
            AuditSnapshot::empty()
        }
    }
}

/// Run `npm audit fix` and return what it printed.
pub async fn run_fix(npm: &Program, logger: Logger) -> Result<String, AuditFixError> {
    logger.info("Securing modules...");
    let output = npm.capture(["audit", "fix"]).await.map_err(AuditFixError::Spawn)?;
    if !output.success() {
        return Err(AuditFixError::Status {
            status: output.status,
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(output.stdout.trim_end().to_string())
}
