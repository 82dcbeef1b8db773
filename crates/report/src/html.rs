use crate::{ReportInput, ReportRow, NO_NEW_DEPENDENCIES};
use derive_more::{Display, Error};
use handlebars::{Handlebars, RenderError, TemplateError};
use miette::Diagnostic;
use modup_audit::{AuditSnapshot, Severity};
use serde_json::{json, Value};

const TEMPLATE: &str = include_str!("../templates/report.html");
const AUDIT_TABLE_TEMPLATE: &str = include_str!("../templates/audit_table.html");

const PINNED: &str = "#F7DC6F";
const BLACK: &str = "black";

struct Column {
    header: &'static str,
    respects_pin: bool,
    color: &'static str,
    cell: fn(&ReportRow) -> &str,
}

const COLUMNS: [Column; 5] = [
    Column { header: "Package", respects_pin: true, color: "#FF1B1B", cell: |row| row.package.as_str() },
    Column { header: "Current", respects_pin: false, color: BLACK, cell: |row| row.current.as_str() },
    Column { header: "Wanted", respects_pin: true, color: "#FF00E4", cell: |row| row.wanted.as_str() },
    Column { header: "Latest", respects_pin: false, color: "#56CA00", cell: |row| row.latest.as_str() },
    Column { header: "Type", respects_pin: true, color: BLACK, cell: |row| row.group.key() },
];

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "#56CA00",
        Severity::Low => "#0000FF",
        Severity::Moderate => "#F7DC6F",
        Severity::High => "#FF00E4",
        Severity::Critical => "#FF1B1B",
    }
}

/// Error type of [`HtmlReport::render`].
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum RenderHtmlError {
    #[display("Invalid HTML report template")]
    #[diagnostic(code(modup_report::invalid_template))]
    Template(#[error(source)] TemplateError),

    #[display("Failed to render the HTML report")]
    #[diagnostic(code(modup_report::render_html))]
    Render(#[error(source)] RenderError),
}

/// Standalone HTML document rendering of a report.
#[derive(Debug, Clone, Copy)]
pub struct HtmlReport<'a>(pub ReportInput<'a>);

impl<'a> HtmlReport<'a> {
    pub fn render(&self) -> Result<String, RenderHtmlError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_template_string("report", TEMPLATE).map_err(RenderHtmlError::Template)?;
        handlebars.register_partial("audit_table", AUDIT_TABLE_TEMPLATE).map_err(RenderHtmlError::Template)?;
        handlebars.render("report", &self.data()).map_err(RenderHtmlError::Render)
    }

    /// Template data. Text values are escaped by the template engine.
    fn data(&self) -> Value {
        let input = self.0;
        let rows: Vec<Value> = input
            .rows
            .iter()
            .map(|row| {
                COLUMNS
                    .iter()
                    .map(|column| {
                        let color = if column.respects_pin && row.is_pinned() { PINNED } else { column.color };
                        json!({ "text": (column.cell)(row), "color": color })
                    })
                    .collect()
            })
            .collect();

        let (before, fix, after) = if input.has_audit() {
            (
                audit_table(input.audit_before, "Audit Report: Before"),
                input.audit_fix.trim().lines().collect(),
                audit_table(input.audit_after, "Audit Report: After"),
            )
        } else {
            (Value::Null, Vec::<&str>::new(), Value::Null)
        };

        json!({
            "date": input.date,
            "columns": COLUMNS.iter().map(|column| column.header).collect::<Vec<_>>(),
            "rows": rows,
            "placeholder": NO_NEW_DEPENDENCIES,
            "before": before,
            "fix": fix,
            "after": after,
        })
    }
}

/// Data of one audit table, or `null` when the snapshot carries no counts.
fn audit_table(snapshot: &AuditSnapshot, title: &str) -> Value {
    let Some(counts) = snapshot.vulnerabilities() else { return Value::Null };
    let severities: Vec<Value> = counts
        .iter()
        .map(|(severity, count)| {
            json!({
                "label": severity.label(),
                "color": severity_color(severity),
                "count": count,
                "nonzero": count != 0,
            })
        })
        .collect();
    json!({ "title": title, "severities": severities })
}
