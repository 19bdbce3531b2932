//! Build then publish

use anyhow::{Context, Result};

use crate::Folio;

/// Publishing only happens after every build step exited zero
pub async fn run(folio: &Folio, skip_check: bool) -> Result<()> {
    super::build::run(folio, skip_check)
        .await
        .context("build failed; the previous deployment is unchanged")?;
    super::publish::run(folio)?;
    Ok(())
}
