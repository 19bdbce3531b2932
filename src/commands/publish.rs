//! Publish the last build

use anyhow::{Context, Result};

use crate::publish::PublishReport;
use crate::Folio;

pub fn run(folio: &Folio) -> Result<PublishReport> {
    let report = folio
        .publish()
        .with_context(|| format!("publishing to {:?}", folio.publish_dir))?;
    println!("Published {} files to {:?}", report.files, report.target);
    Ok(report)
}
