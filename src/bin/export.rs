//! One-shot export: fetch the full-history CSV and write it to the download
//! directory. Prints the written path; exits non-zero on any failure.

use anyhow::Result;
use std::path::Path;

use riskdash::config::Config;
use riskdash::{api, download};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let backend = api::build(&cfg);

    let bytes = backend.download_all().await?;
    let name = download::export_filename(chrono::Utc::now());
    let path = download::save(Path::new(&cfg.download_dir), &name, &bytes)?;
    println!("{}", path.display());
    Ok(())
}
