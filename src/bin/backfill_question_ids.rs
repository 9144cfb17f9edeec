#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = examiner::run_backfill().await {
        eprintln!("examiner backfill fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
