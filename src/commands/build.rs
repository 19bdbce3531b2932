//! Build the site into the local output directory

use anyhow::Result;

use crate::build::{build_site, BuildOptions, BuildReport};
use crate::Folio;

pub async fn run(folio: &Folio, skip_check: bool) -> Result<BuildReport> {
    let options = BuildOptions {
        validate: !skip_check,
    };
    let report = build_site(folio, &options).await?;
    println!(
        "Built {} files into {:?} (sha256 {})",
        report.digest.files, folio.public_dir, report.digest.hex
    );
    Ok(report)
}
