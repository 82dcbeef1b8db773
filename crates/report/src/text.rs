use crate::{ReportInput, ReportRow, NO_NEW_DEPENDENCIES};
use colored::{Color, Colorize};
use itertools::Itertools;
use modup_audit::{AuditSnapshot, Severity};
use std::fmt::{self, Display, Formatter};

/// Marker after a nonzero vulnerability count.
const NONZERO_MARKER: &str = "⇦";

struct Column {
    header: &'static str,
    /// Pinned rows are yellow in this column.
    respects_pin: bool,
    color: Option<Color>,
    cell: fn(&ReportRow) -> &str,
}

const COLUMNS: [Column; 5] = [
    Column {
        header: "Package",
        respects_pin: true,
        color: Some(Color::Red),
        cell: |row| row.package.as_str(),
    },
    Column { header: "Current", respects_pin: false, color: None, cell: |row| row.current.as_str() },
    Column {
        header: "Wanted",
        respects_pin: true,
        color: Some(Color::Green),
        cell: |row| row.wanted.as_str(),
    },
    Column {
        header: "Latest",
        respects_pin: false,
        color: Some(Color::Magenta),
        cell: |row| row.latest.as_str(),
    },
    Column { header: "Type", respects_pin: true, color: None, cell: |row| row.group.key() },
];

fn width(text: &str) -> usize {
    text.chars().count()
}

fn padding(text: &str, column_width: usize) -> String {
    " ".repeat(column_width.saturating_sub(width(text)))
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Green,
        Severity::Low => Color::Blue,
        Severity::Moderate => Color::Yellow,
        Severity::High => Color::Magenta,
        Severity::Critical => Color::Red,
    }
}

/// Terminal rendering of a report.
///
/// Colours come from [`colored`], so they follow its `NO_COLOR`/`CLICOLOR` handling.
/// Trailing padding is trimmed from every line.
#[derive(Debug, Clone, Copy)]
pub struct TextReport<'a>(pub ReportInput<'a>);

impl<'a> TextReport<'a> {
    fn fmt_table(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rows = self.0.rows;
        if rows.is_empty() {
            return writeln!(f, "{NO_NEW_DEPENDENCIES}");
        }

        let widths = COLUMNS.map(|column| {
            rows.iter().map(|row| width((column.cell)(row))).fold(width(column.header), usize::max)
                + 2
        });

        let header = COLUMNS
            .iter()
            .zip(widths)
            .map(|(column, column_width)| {
                format!("{}{}", column.header.underline(), padding(column.header, column_width))
            })
            .join("");
        writeln!(f, "{}", header.trim_end())?;

        for row in rows {
            let line = COLUMNS
                .iter()
                .zip(widths)
                .map(|(column, column_width)| {
                    let text = (column.cell)(row);
                    let color = match (column.respects_pin && row.is_pinned(), column.color) {
                        (true, _) => Some(Color::Yellow),
                        (false, color) => color,
                    };
                    let cell = match color {
                        Some(color) => text.color(color).to_string(),
                        None => text.to_string(),
                    };
                    format!("{cell}{}", padding(text, column_width))
                })
                .join("");
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }

    fn fmt_audit(f: &mut Formatter<'_>, snapshot: &AuditSnapshot, title: &str) -> fmt::Result {
        let Some(counts) = snapshot.vulnerabilities() else { return Ok(()) };
        const RISK: &str = "Risk";
        let risk_width = Severity::Critical.label().len().max(RISK.len()) + 2;

        writeln!(f)?;
        writeln!(f, "{}", format!("Audit Report: {title}").underline())?;
        writeln!(f, "{}{}{}", RISK.underline(), padding(RISK, risk_width), "Vulnerabilities".underline())?;
        for (severity, count) in counts.iter() {
            let label = severity.label();
            let count = match count {
                0 => count.to_string(),
                _ => format!("{count} {NONZERO_MARKER}"),
            };
            let color = severity_color(severity);
            writeln!(f, "{}{}{}", label.color(color), padding(label, risk_width), count.color(color))?;
        }
        Ok(())
    }
}

impl<'a> Display for TextReport<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let input = self.0;
        writeln!(f, "{}", input.date.underline())?;
        self.fmt_table(f)?;

        if !input.has_audit() {
            return Ok(());
        }
        TextReport::fmt_audit(f, input.audit_before, "Before")?;
        if !input.audit_fix.trim().is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", "Securing modules...".bold().underline())?;
            writeln!(f, "{}", input.audit_fix.trim_end())?;
        }
        TextReport::fmt_audit(f, input.audit_after, "After")
    }
}
