use serde::Deserialize;
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

/// Risk level reported by `npm audit`, from least to most severe.
///
/// Displays as the capitalized report label, e.g. `Moderate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumIter, IntoStaticStr)]
pub enum Severity {
    Info,
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    /// Capitalized name used as a report label.
    pub fn label(self) -> &'static str {
        self.into()
    }
}

/// Number of vulnerabilities per severity, from `metadata.vulnerabilities`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VulnerabilityCounts {
    pub info: u64,
    pub low: u64,
    pub moderate: u64,
    pub high: u64,
    pub critical: u64,
}

impl VulnerabilityCounts {
    pub fn count(&self, severity: Severity) -> u64 {
        match severity {
            Severity::Info => self.info,
            Severity::Low => self.low,
            Severity::Moderate => self.moderate,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }

    /// Every severity with its count, always in ascending severity order.
    pub fn iter(&self) -> impl Iterator<Item = (Severity, u64)> + '_ {
        Severity::iter().map(|severity| (severity, self.count(severity)))
    }

    pub fn total(&self) -> u64 {
        self.iter().map(|(_, count)| count).sum()
    }
}

#[derive(Deserialize)]
struct AuditJson {
    metadata: Option<AuditMetadata>,
}

#[derive(Deserialize)]
struct AuditMetadata {
    vulnerabilities: Option<VulnerabilityCounts>,
}

/// Raw output of `npm audit --json`, kept opaque until a report needs it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AuditSnapshot {
    raw: String,
}

impl AuditSnapshot {
    pub fn new(raw: impl Into<String>) -> Self {
        AuditSnapshot { raw: raw.into() }
    }

    /// Snapshot standing in for an audit that could not be taken.
    pub fn empty() -> Self {
        AuditSnapshot::default()
    }

    pub fn raw(&self) -> &'_ str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty()
    }

    /// Parse `metadata.vulnerabilities`, or `None` when the output doesn't carry it.
    pub fn vulnerabilities(&self) -> Option<VulnerabilityCounts> {
        serde_json::from_str::<AuditJson>(&self.raw).ok()?.metadata?.vulnerabilities
    }
}
