use clap::Args;
use modup_diagnostics::LogLevel;
use modup_package_manifest::ManifestDestination;
use std::fmt::{self, Display, Formatter};

/// Behavior switches as given on the command line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Args)]
pub struct Flags {
    /// Show debug output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Overwrite the existing package.json rather than creating a package.json.new file.
    #[arg(short = 'w', long)]
    pub overwrite: bool,

    /// Silence everything but errors.
    #[arg(short, long)]
    pub silent: bool,

    /// Generate a report of which modules were updated.
    #[arg(short, long)]
    pub report: bool,

    /// Save the report to updatedModules.html instead of printing it.
    #[arg(short = 'f', long, visible_alias = "saveReportToFile")]
    pub save_report_to_file: bool,

    /// Run `npm install` after writing package.json.
    #[arg(short, long)]
    pub upgrade: bool,

    /// Audit the modules before and after upgrading.
    #[arg(short = 'a', long, visible_alias = "runAudit")]
    pub run_audit: bool,

    /// Run `npm audit fix` between the two audits.
    #[arg(short = 'x', long, visible_alias = "fixAudit")]
    pub fix_audit: bool,
}

/// Effective configuration of a run, after flag implications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub log_level: LogLevel,
    pub overwrite: bool,
    pub report: bool,
    pub save_report_to_file: bool,
    pub upgrade: bool,
    pub run_audit: bool,
    pub fix_audit: bool,
}

impl Settings {
    /// Apply the implications between flags.
    ///
    /// * `save_report_to_file` implies `report`.
    /// * `upgrade` implies `overwrite`.
    /// * `run_audit` implies `report`.
    /// * `fix_audit` implies `overwrite` and `run_audit`, and so `report`.
    /// * `silent` beats `verbose`.
    pub fn derive(flags: &Flags) -> Self {
        let run_audit = flags.run_audit || flags.fix_audit;
        Settings {
            log_level: LogLevel::from_flags(flags.verbose, flags.silent),
            overwrite: flags.overwrite || flags.upgrade || flags.fix_audit,
            report: flags.report || flags.save_report_to_file || run_audit,
            save_report_to_file: flags.save_report_to_file,
            upgrade: flags.upgrade,
            run_audit,
            fix_audit: flags.fix_audit,
        }
    }

    pub fn destination(&self) -> ManifestDestination {
        ManifestDestination::from_overwrite(self.overwrite)
    }
}

fn yes_or_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "nope"
    }
}

/// Human readable summary, logged at debug level on start-up.
impl Display for Settings {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Settings")?;
        writeln!(f, "  • verbose:             {}", yes_or_no(self.log_level == LogLevel::Debug))?;
        writeln!(f, "  • overwrite:           {}", yes_or_no(self.overwrite))?;
        writeln!(f, "  • upgrade:             {}", yes_or_no(self.upgrade))?;
        writeln!(f, "  • run audit:           {}", yes_or_no(self.run_audit))?;
        writeln!(f, "  • fix audit:           {}", yes_or_no(self.fix_audit))?;
        writeln!(f, "  • generate report:     {}", yes_or_no(self.report))?;
        write!(
            f,
            "  • do what with report: {}",
            if self.save_report_to_file { "save it" } else { "print it" },
        )
    }
}
