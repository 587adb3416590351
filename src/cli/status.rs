use anyhow::Result;

use crate::backend::{Backend, HttpBackend};
use crate::core::AppConfig;

pub async fn run(config: &AppConfig) -> Result<()> {
    let backend = HttpBackend::new(&config.api_base_url, config.status_timeout)?;
    let status = backend.status().await?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
