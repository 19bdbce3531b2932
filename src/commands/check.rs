//! Validate the content store

use anyhow::{bail, Result};

use crate::validate::Report;
use crate::Folio;

/// Print every issue; fail when any of them is an error
pub fn run(folio: &Folio) -> Result<Report> {
    let report = folio.check();

    for issue in &report.issues {
        println!("{}", issue);
    }
    println!(
        "Checked {} documents and {} sections: {} error(s), {} warning(s)",
        report.documents,
        report.sections,
        report.error_count(),
        report.warnings().count()
    );

    if !report.is_ok() {
        bail!("content check failed with {} error(s)", report.error_count());
    }
    Ok(report)
}
