use crate::{Flags, Settings, State, Upgrade};
use chrono::Local;
use clap::{Parser, ValueEnum};
use miette::Context;
use modup_diagnostics::{enable_tracing, Logger};
use modup_report::format_report_date;
use std::path::PathBuf;

/// Which service answers "what is the latest version of this package?".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LookupKind {
    /// Run `npm view <name> version`.
    #[default]
    Npm,
    /// Query the registry over HTTP.
    Http,
}

/// Upgrade the dependencies in package.json to their latest versions.
#[derive(Debug, Parser)]
#[clap(name = "modup")]
#[clap(bin_name = "modup")]
#[clap(version)]
#[clap(about = "Upgrade the dependencies in package.json to their latest versions")]
pub struct CliArgs {
    #[clap(flatten)]
    pub flags: Flags,

    /// Set working directory.
    #[clap(short = 'C', long, default_value = ".")]
    pub dir: PathBuf,

    /// Read pinned versions from this file instead of fixedModules.json.
    #[clap(long)]
    pub overrides: Option<PathBuf>,

    /// How latest versions are looked up.
    #[clap(long, value_enum, default_value_t = LookupKind::Npm)]
    pub lookup: LookupKind,

    /// Registry URL for `--lookup http`. Defaults to the registry in .npmrc.
    #[clap(long)]
    pub registry: Option<String>,

    /// The npm executable.
    #[clap(long, default_value = "npm")]
    pub npm: String,
}

impl CliArgs {
    /// Execute the command
    pub async fn run(self) -> miette::Result<()> {
        let settings = Settings::derive(&self.flags);
        enable_tracing(settings.log_level);
        let logger = Logger::new(settings.log_level);
        logger.debug(&settings);

        let state = State::init(&self, logger).wrap_err("initialize the state")?;
        let date = format_report_date(Local::now().date_naive());

        Upgrade { state: &state, settings: &settings, logger, date: &date }
            .run()
            .await
            .wrap_err("upgrade the node modules")
    }
}
