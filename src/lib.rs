//! folio: content checks and the build/publish pipeline for a blog and
//! portfolio site rendered by an external static-site generator.
//!
//! The site itself is content (markdown posts with front matter, YAML section
//! data) plus configuration. This crate reads and validates that content,
//! drives the generator into a local output directory, and publishes the
//! output only after every build step has succeeded.

pub mod build;
pub mod commands;
pub mod config;
pub mod content;
pub mod data;
pub mod digest;
mod error;
pub mod publish;
pub mod validate;

pub use error::{Error, Result};

use std::path::{Component, Path, PathBuf};

/// A site rooted at a directory
#[derive(Debug, Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Markdown documents
    pub content_dir: PathBuf,
    /// Section data files
    pub data_dir: PathBuf,
    /// Static assets
    pub static_dir: PathBuf,
    /// Local output directory the generator writes to
    pub public_dir: PathBuf,
    /// Post scaffolds
    pub archetype_dir: PathBuf,
    /// Where published output goes
    pub publish_dir: PathBuf,
}

impl Folio {
    /// Open the site in `base_dir`, using defaults when there is no config file
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(config::CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} in {:?}, using defaults", config::CONFIG_FILE, base_dir);
            config::SiteConfig::default()
        };

        let folio = Self::with_config(base_dir, config);
        folio.check_layout()?;
        Ok(folio)
    }

    /// Resolve directories of `config` against `base_dir`
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let resolve = |dir: &str| base_dir.join(dir);
        Self {
            content_dir: resolve(&config.content_dir),
            data_dir: resolve(&config.data_dir),
            static_dir: resolve(&config.static_dir),
            public_dir: resolve(&config.public_dir),
            archetype_dir: resolve(&config.archetype_dir),
            publish_dir: resolve(&config.publish.dir),
            config,
            base_dir,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(config::CONFIG_FILE)
    }

    /// Refuse output locations whose removal would take site sources with them
    pub fn check_layout(&self) -> Result<()> {
        let sources = [
            ("site root", &self.base_dir),
            ("content_dir", &self.content_dir),
            ("data_dir", &self.data_dir),
            ("static_dir", &self.static_dir),
        ];
        let outputs = [
            ("public_dir", &self.public_dir),
            ("publish.dir", &self.publish_dir),
        ];

        for (output_key, output) in outputs {
            let output_abs = normalize_path(output);
            for (source_key, source) in sources {
                if normalize_path(source).starts_with(&output_abs) {
                    return Err(Error::Config {
                        path: self.config_path(),
                        message: format!(
                            "{} {:?} would contain the {} {:?}",
                            output_key, output, source_key, source
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Validate the content store
    pub fn check(&self) -> validate::Report {
        validate::check(self)
    }

    /// Build into the local output directory
    pub async fn build(&self) -> Result<build::BuildReport> {
        build::build_site(self, &build::BuildOptions::default()).await
    }

    /// Copy the local output directory to the publish target
    pub fn publish(&self) -> Result<publish::PublishReport> {
        self.check_layout()?;
        publish::publish(
            &self.public_dir,
            &self.publish_dir,
            &publish::PublishOptions::from(&self.config.publish),
        )
    }

    /// Build, then publish; a failed build never reaches the publish target
    pub async fn deploy(&self) -> Result<(build::BuildReport, publish::PublishReport)> {
        let built = self.build().await?;
        let published = self.publish()?;
        Ok((built, published))
    }
}

/// Absolute form of `path` with `.` and `..` folded and the existing prefix's symlinks resolved
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut lexical = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                lexical.pop();
            }
            other => lexical.push(other),
        }
    }

    // Canonicalize the longest existing ancestor, then re-attach the rest
    let mut existing = lexical.as_path();
    let mut rest = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => return lexical,
        }
    }
    let mut resolved = std::fs::canonicalize(existing).unwrap_or_else(|_| existing.to_path_buf());
    resolved.extend(rest.iter().rev());
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_directories_resolve_against_base() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(config::CONFIG_FILE),
            "content_dir: posts-src\npublish:\n  dir: /srv/www\n",
        )
        .unwrap();
        let folio = Folio::new(dir.path()).unwrap();
        assert_eq!(folio.content_dir, dir.path().join("posts-src"));
        assert_eq!(folio.public_dir, dir.path().join("public"));
        // Absolute paths stay absolute
        assert_eq!(folio.publish_dir, PathBuf::from("/srv/www"));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(config::CONFIG_FILE), "title: [\n").unwrap();
        assert!(matches!(
            Folio::new(dir.path()),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_output_dirs_may_not_swallow_the_site() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("site-src");
        fs::create_dir_all(&root).unwrap();

        for config in [
            "public_dir: ..\n",
            "public_dir: ./public/../\n",
            "public_dir: content\n",
            "public_dir: static/..\n",
            "publish:\n  dir: .\n",
            "data_dir: out/data\npublish:\n  dir: out\n",
        ] {
            fs::write(root.join(config::CONFIG_FILE), config).unwrap();
            assert!(
                matches!(Folio::new(&root), Err(Error::Config { .. })),
                "{:?} was accepted",
                config
            );
        }

        fs::write(
            root.join(config::CONFIG_FILE),
            "public_dir: ./build/../public\npublish:\n  dir: ../gh-pages\n",
        )
        .unwrap();
        let folio = Folio::new(&root).unwrap();
        assert!(folio.check_layout().is_ok());
    }

    #[tokio::test]
    async fn test_build_refuses_parent_output_dir() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("site-src");
        fs::create_dir_all(&root).unwrap();
        fs::write(outer.path().join("sentinel.txt"), "keep me").unwrap();

        // Bypasses the check done when opening the site
        let config = config::SiteConfig {
            public_dir: "..".to_string(),
            ..Default::default()
        };
        let folio = Folio::with_config(root.clone(), config);
        let options = build::BuildOptions { validate: false };
        let err = build::build_site(&folio, &options).await.unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(outer.path().join("sentinel.txt").exists());
        assert!(root.exists());

        let config = config::SiteConfig {
            publish: config::PublishConfig {
                dir: ".".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let folio = Folio::with_config(root.clone(), config);
        fs::create_dir_all(folio.public_dir.join("posts")).unwrap();
        fs::write(folio.public_dir.join("index.html"), "new").unwrap();
        assert!(matches!(folio.publish(), Err(Error::Config { .. })));
        assert!(folio.public_dir.join("index.html").exists());
    }

    #[tokio::test]
    async fn test_failed_build_never_publishes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join(config::CONFIG_FILE),
            "build:\n  command: sh\n  args: ['-c', 'exit 2', generator]\n",
        )
        .unwrap();
        // Leftovers of an earlier build plus a live deployment
        fs::create_dir_all(root.join("public")).unwrap();
        fs::write(root.join("public/index.html"), "half-built").unwrap();
        fs::create_dir_all(root.join("site")).unwrap();
        fs::write(root.join("site/index.html"), "live").unwrap();

        let folio = Folio::new(root).unwrap();
        let err = folio.deploy().await.unwrap_err();
        assert!(matches!(err, Error::StepFailed { code: Some(2), .. }));
        assert_eq!(
            fs::read_to_string(root.join("site/index.html")).unwrap(),
            "live"
        );
    }

    #[tokio::test]
    async fn test_deploy_publishes_successful_build() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let script = r#"while [ $# -gt 0 ]; do [ "$1" = --destination ] && d=$2; shift; done; echo ok > "$d/index.html""#;
        fs::write(
            root.join(config::CONFIG_FILE),
            format!(
                "build:\n  command: sh\n  args: ['-c', {}, generator]\npublish:\n  dir: out\n  cname: example.org\n",
                serde_json::to_string(script).unwrap()
            ),
        )
        .unwrap();

        let folio = Folio::new(root).unwrap();
        let (built, published) = folio.deploy().await.unwrap();
        assert_eq!(built.digest.files, 1);
        assert_eq!(published.files, 1);
        assert_eq!(fs::read_to_string(root.join("out/index.html")).unwrap(), "ok\n");
        assert!(root.join("out/CNAME").exists());
    }
}
