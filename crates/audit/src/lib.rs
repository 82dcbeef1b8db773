mod run;
mod snapshot;

pub use run::{run_audit, run_fix, AuditFixError, AuditPhase, AuditQueryError};
pub use snapshot::{AuditSnapshot, Severity, VulnerabilityCounts};
