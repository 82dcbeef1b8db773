mod html;
mod text;

pub use html::{HtmlReport, RenderHtmlError};
pub use text::TextReport;

use chrono::NaiveDate;
use modup_audit::AuditSnapshot;
use modup_package_manifest::{DependencyGroup, DependencyMap};

/// Placeholder shown instead of the table when nothing changed.
pub const NO_NEW_DEPENDENCIES: &str = "- no new dependencies -";

/// File name of the saved HTML report.
pub const HTML_REPORT_FILE_NAME: &str = "updatedModules.html";

/// One dependency whose latest version differs from the declared one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub package: String,
    pub current: String,
    pub wanted: String,
    pub latest: String,
    pub group: DependencyGroup,
}

impl ReportRow {
    /// The written version was held back by an override.
    pub fn is_pinned(&self) -> bool {
        self.wanted != self.latest
    }
}

/// Rows for one group, ordered by name.
///
/// Only dependencies whose `latest` differs from `current` are kept.
pub fn report_rows(
    group: DependencyGroup,
    current: &DependencyMap,
    resolved: &DependencyMap,
    latest: &DependencyMap,
) -> Vec<ReportRow> {
    current
        .iter()
        .filter_map(|(package, current)| {
            let latest = latest.get(package)?;
            if latest == current {
                return None;
            }
            Some(ReportRow {
                package: package.clone(),
                current: current.clone(),
                wanted: resolved.get(package).unwrap_or(latest).clone(),
                latest: latest.clone(),
                group,
            })
        })
        .collect()
}

/// Date header of a report, e.g. `October 18, 2026`.
pub fn format_report_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Everything a report is rendered from.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub date: &'a str,
    pub rows: &'a [ReportRow],
    pub audit_before: &'a AuditSnapshot,
    pub audit_fix: &'a str,
    pub audit_after: &'a AuditSnapshot,
}

impl<'a> ReportInput<'a> {
    /// The audit section is rendered only when one of the snapshots carries counts.
    pub(crate) fn has_audit(&self) -> bool {
        self.audit_before.vulnerabilities().is_some() || self.audit_after.vulnerabilities().is_some()
    }
}

/// Rendered report in both formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub text: String,
    pub html: String,
}

impl Report {
    pub fn generate(input: ReportInput<'_>) -> Result<Self, RenderHtmlError> {
        Ok(Report { text: TextReport(input).to_string(), html: HtmlReport(input).render()? })
    }
}
