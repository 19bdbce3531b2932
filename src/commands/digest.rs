//! Print the digest of an output tree

use anyhow::{bail, Result};
use std::path::Path;

use crate::digest::{ignore_patterns, tree_digest, TreeDigest};
use crate::Folio;

/// Digest `dir`, or the output directory when none is given
pub fn run(folio: &Folio, dir: Option<&Path>) -> Result<TreeDigest> {
    let dir = dir.unwrap_or(&folio.public_dir);
    if !dir.is_dir() {
        bail!("{:?} is not a directory", dir);
    }
    let ignore = ignore_patterns(&folio.config.build.digest_ignore);
    let digest = tree_digest(dir, &ignore)?;
    println!("{}  {} files  {}", digest.hex, digest.files, dir.display());
    Ok(digest)
}
