use modup_diagnostics::Result;

#[tokio::main(flavor = "current_thread")]
pub async fn main() -> Result<()> {
    modup_cli::run_cli().await
}
