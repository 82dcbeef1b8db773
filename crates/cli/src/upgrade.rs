use crate::{Settings, State};
use derive_more::{Display, Error};
use miette::Diagnostic;
use modup_audit::{run_audit, run_fix, AuditFixError, AuditPhase, AuditSnapshot};
use modup_diagnostics::{LogLevel, Logger};
use modup_executor::{ExecutorError, Program};
use modup_package_manifest::{DependencyGroup, WriteManifestError};
use modup_report::{report_rows, RenderHtmlError, Report, ReportInput, ReportRow, HTML_REPORT_FILE_NAME};
use modup_resolver::{ResolveGroups, ResolvedGroups};
use std::{fs, io, path::PathBuf, process::ExitStatus};

/// `npm install` failed after the manifest was written.
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum InstallError {
    #[display("Failed to run npm install")]
    #[diagnostic(code(modup_cli::spawn_install))]
    Spawn(#[error(source)] ExecutorError),

    #[display("npm install exited with {status}: {stderr}")]
    #[diagnostic(
        code(modup_cli::install_failed),
        help("package.json has already been updated. Fix the problem and run `npm install` again.")
    )]
    Status { status: ExitStatus, stderr: String },
}

/// The HTML report could not be written.
#[derive(Debug, Display, Error, Diagnostic)]
#[display("Failed to write the report to {}", path.display())]
#[diagnostic(code(modup_cli::save_report))]
pub struct SaveReportError {
    pub path: PathBuf,
    #[error(source)]
    pub error: io::Error,
}

/// Error type of [`Upgrade::run`].
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum UpgradeError {
    #[diagnostic(transparent)]
    WriteManifest(#[error(source)] WriteManifestError),

    #[diagnostic(transparent)]
    Install(#[error(source)] InstallError),

    #[diagnostic(transparent)]
    AuditFix(#[error(source)] AuditFixError),

    #[diagnostic(transparent)]
    RenderReport(#[error(source)] RenderHtmlError),

    #[diagnostic(transparent)]
    SaveReport(#[error(source)] SaveReportError),
}

/// Resolve, write, then optionally install, audit and report.
#[must_use]
pub struct Upgrade<'a> {
    pub state: &'a State,
    pub settings: &'a Settings,
    pub logger: Logger,
    /// Date header of the report.
    pub date: &'a str,
}

impl<'a> Upgrade<'a> {
    /// Execute the subroutine.
    pub async fn run(self) -> Result<(), UpgradeError> {
        let Upgrade { state, settings, logger, date } = self;

        logger.info("Retrieving Primary and Dev Dependencies...");
        let resolve = ResolveGroups {
            client: &state.registry,
            logger,
            manifest: &state.manifest,
            overrides: &state.overrides,
        }
        .run();
        let audit_before = async {
            if settings.run_audit {
                run_audit(&state.npm, AuditPhase::Before, logger).await
            } else {
                AuditSnapshot::empty()
            }
        };
        let (groups, audit_before) = tokio::join!(resolve, audit_before);

        let manifest = state.manifest.with_dependencies(groups.resolved());
        let path = state
            .manifest
            .write(&manifest, settings.destination())
            .map_err(UpgradeError::WriteManifest)?;
        logger.info(format_args!("New package.json saved to {}", path.display()));

        if settings.upgrade {
            install(&state.npm, logger).await.map_err(UpgradeError::Install)?;
        }

        let audit_fix = if settings.fix_audit {
            run_fix(&state.npm, logger).await.map_err(UpgradeError::AuditFix)?
        } else {
            String::new()
        };

        let audit_after = if settings.run_audit {
            run_audit(&state.npm, AuditPhase::After, logger).await
        } else {
            AuditSnapshot::empty()
        };

        if !settings.report {
            return Ok(());
        }

        let rows = collect_rows(&groups);
        let report = Report::generate(ReportInput {
            date,
            rows: &rows,
            audit_before: &audit_before,
            audit_fix: &audit_fix,
            audit_after: &audit_after,
        })
        .map_err(UpgradeError::RenderReport)?;

        if settings.save_report_to_file {
            let path = state.dir.join(HTML_REPORT_FILE_NAME);
            fs::write(&path, report.html)
                .map_err(|error| SaveReportError { path: path.clone(), error })
                .map_err(UpgradeError::SaveReport)?;
            logger.info(format_args!("Report saved to {}", path.display()));
        } else if logger.is_enabled(LogLevel::Info) {
            println!();
            print!("{}", report.text);
        }

        Ok(())
    }
}

/// Report rows of both groups, dependencies first.
fn collect_rows(groups: &ResolvedGroups) -> Vec<ReportRow> {
    [DependencyGroup::Prod, DependencyGroup::Dev]
        .into_iter()
        .flat_map(|group| {
            let resolution = groups.get(group);
            report_rows(group, &resolution.current, &resolution.resolved, &resolution.latest)
        })
        .collect()
}

async fn install(npm: &Program, logger: Logger) -> Result<(), InstallError> {
    logger.info("Installing upgraded modules...");
    let output = npm.capture(["install"]).await.map_err(InstallError::Spawn)?;
    if !output.success() {
        return Err(InstallError::Status {
            status: output.status,
            stderr: output.stderr.trim().to_string(),
        });
    }
    logger.debug(output.stdout.trim_end());
    Ok(())
}
