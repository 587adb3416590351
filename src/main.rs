use anyhow::Result;
use skydost::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
