mod cli_args;
mod settings;
mod state;
mod upgrade;

pub use cli_args::{CliArgs, LookupKind};
pub use settings::{Flags, Settings};
pub use state::{InitStateError, State};
pub use upgrade::{InstallError, SaveReportError, Upgrade, UpgradeError};

use clap::Parser;

pub async fn run_cli() -> miette::Result<()> {
    CliArgs::parse().run().await
}
