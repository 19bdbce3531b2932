//! Clean the local output directory

use anyhow::Result;
use std::fs;

use crate::Folio;

/// Remove the output directory; the publish target is left alone
pub fn run(folio: &Folio) -> Result<()> {
    if folio.public_dir.exists() {
        fs::remove_dir_all(&folio.public_dir)?;
        tracing::info!("Deleted: {:?}", folio.public_dir);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_keeps_published_site() {
        let dir = tempfile::tempdir().unwrap();
        let folio = Folio::new(dir.path()).unwrap();
        fs::create_dir_all(folio.public_dir.join("posts")).unwrap();
        fs::create_dir_all(&folio.publish_dir).unwrap();

        run(&folio).unwrap();
        assert!(!folio.public_dir.exists());
        assert!(folio.publish_dir.exists());
        // Cleaning twice is fine
        run(&folio).unwrap();
    }
}
