//! Build pipeline - dependency install, module tidy, generator build
//!
//! The generator only ever writes into the local output directory. Nothing
//! here touches the publish target; see [`crate::publish`].

mod step;

pub use step::{check_version, extract_version, Step};

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::{SiteConfig, StepConfig};
use crate::digest::{self, TreeDigest};
use crate::error::{Error, Result};
use crate::validate;
use crate::Folio;

/// Knobs for a single build run
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Validate the content store first and refuse to build on errors
    pub validate: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { validate: true }
    }
}

/// Outcome of a successful build
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub digest: TreeDigest,
    pub steps: Vec<String>,
    pub elapsed: Duration,
}

/// The ordered external steps of a build
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    /// Steps for this site: install and tidy when their marker files exist, then build
    pub fn from_folio(folio: &Folio) -> Result<Self> {
        let build = &folio.config.build;
        let mut steps = Vec::new();

        let install = &build.install;
        if step_enabled(install) {
            let lockfile = folio.base_dir.join(&install.when_exists);
            if lockfile.exists() {
                steps.push(aux_step("install", install, &folio.base_dir));
            } else if folio.base_dir.join("package.json").exists() {
                return Err(Error::MissingLockfile { lockfile });
            }
        }

        let tidy = &build.tidy;
        if step_enabled(tidy) && folio.base_dir.join(&tidy.when_exists).exists() {
            steps.push(aux_step("tidy", tidy, &folio.base_dir));
        }

        steps.push(Step::new(
            "build",
            &build.command,
            generator_args(&folio.config, &folio.public_dir),
            &folio.base_dir,
        ));

        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Run every step in order, stopping at the first failure
    pub async fn run(&self) -> Result<()> {
        for step in &self.steps {
            step.run().await?;
        }
        Ok(())
    }
}

fn step_enabled(step: &StepConfig) -> bool {
    step.enable && !step.command.trim().is_empty()
}

fn aux_step(name: &str, config: &StepConfig, cwd: &Path) -> Step {
    Step::new(name, &config.command, config.args.clone(), cwd)
}

/// Arguments for the generator's build command
pub fn generator_args(config: &SiteConfig, output_dir: &Path) -> Vec<String> {
    let build = &config.build;
    let mut args = build.args.clone();

    let flags = [
        (build.minify, "--minify"),
        (build.gc, "--gc"),
        (build.git_info, "--enableGitInfo"),
        (config.build_drafts, "--buildDrafts"),
        (config.build_future, "--buildFuture"),
        (config.build_expired, "--buildExpired"),
    ];
    args.extend(
        flags
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, flag)| flag.to_string()),
    );

    if !config.base_url.is_empty() {
        args.push("--baseURL".to_string());
        args.push(config.base_url.clone());
    }
    args.push("--destination".to_string());
    args.push(output_dir.to_string_lossy().to_string());

    args.extend(build.extra_args.iter().cloned());
    args
}

/// Validate, check the generator version, and build into the output directory
pub async fn build_site(folio: &Folio, options: &BuildOptions) -> Result<BuildReport> {
    let start = Instant::now();

    if options.validate {
        let report = validate::check(folio);
        for issue in &report.issues {
            match issue.severity {
                validate::Severity::Error => tracing::error!("{}", issue),
                validate::Severity::Warning => tracing::warn!("{}", issue),
            }
        }
        if !report.is_ok() {
            return Err(Error::Invalid {
                count: report.error_count(),
            });
        }
    }

    let build = &folio.config.build;
    if let Some(requirement) = &build.generator_version {
        let probe = Step::new(
            "version",
            &build.command,
            build.version_args.clone(),
            &folio.base_dir,
        );
        check_version(&probe, requirement).await?;
    }

    let pipeline = Pipeline::from_folio(folio)?;
    prepare_output(folio)?;
    pipeline.run().await?;

    let ignore = digest::ignore_patterns(&build.digest_ignore);
    let digest = digest::tree_digest(&folio.public_dir, &ignore)?;
    let elapsed = start.elapsed();
    tracing::info!(
        "Built {} files in {:.2}s (digest {})",
        digest.files,
        elapsed.as_secs_f64(),
        &digest.hex[..12]
    );

    Ok(BuildReport {
        digest,
        steps: pipeline.steps().iter().map(|s| s.name.clone()).collect(),
        elapsed,
    })
}

/// Empty the output directory so files from earlier builds cannot leak into this one
fn prepare_output(folio: &Folio) -> Result<()> {
    let public_dir = &folio.public_dir;
    folio.check_layout()?;
    if public_dir.exists() {
        fs::remove_dir_all(public_dir).map_err(|e| Error::io(public_dir, e))?;
    }
    fs::create_dir_all(public_dir).map_err(|e| Error::io(public_dir, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// A stand-in generator: writes a page per markdown file into `--destination`
    const FAKE_GENERATOR: &str = r#"
dest=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--destination" ]; then dest="$2"; fi
  shift
done
[ -n "$dest" ] || exit 64
mkdir -p "$dest"
for f in content/posts/*.md; do
  name=$(basename "$f" .md)
  mkdir -p "$dest/posts/$name"
  cp "$f" "$dest/posts/$name/index.html"
done
echo "<html>index</html>" > "$dest/index.html"
date +%s%N > "$dest/.hugo_build.lock"
"#;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site(generator: &str) -> (tempfile::TempDir, Folio) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let config = format!(
            "title: Test\nbase_url: https://example.org/\nbuild:\n  command: sh\n  args: ['-c', {}, generator]\n",
            serde_json::to_string(generator).unwrap()
        );
        write(root, "folio.yml", &config);
        write(
            root,
            "content/posts/first.md",
            "---\ntitle: First\ndate: 2025-01-01\n---\nHello\n",
        );
        let folio = Folio::new(root).unwrap();
        (dir, folio)
    }

    #[test]
    fn test_generator_args() {
        let mut config = SiteConfig::default();
        config.base_url = "https://example.org/".to_string();
        config.build_drafts = true;
        config.build.gc = false;
        config.build.extra_args = vec!["--quiet".to_string()];
        let args = generator_args(&config, &PathBuf::from("/site/public"));
        assert_eq!(
            args,
            vec![
                "--minify",
                "--enableGitInfo",
                "--buildDrafts",
                "--baseURL",
                "https://example.org/",
                "--destination",
                "/site/public",
                "--quiet"
            ]
        );
    }

    #[test]
    fn test_pipeline_steps_follow_marker_files() {
        let (dir, folio) = site("true");
        let names = |f: &Folio| -> Vec<String> {
            Pipeline::from_folio(f)
                .unwrap()
                .steps()
                .iter()
                .map(|s| s.name.clone())
                .collect()
        };
        assert_eq!(names(&folio), vec!["build"]);

        write(dir.path(), "package.json", "{}");
        assert!(matches!(
            Pipeline::from_folio(&folio),
            Err(Error::MissingLockfile { .. })
        ));

        write(dir.path(), "package-lock.json", "{}");
        write(dir.path(), "go.mod", "module example.org/site\n");
        assert_eq!(names(&folio), vec!["install", "tidy", "build"]);
    }

    #[tokio::test]
    async fn test_build_is_idempotent() {
        let (_dir, folio) = site(FAKE_GENERATOR);
        let first = build_site(&folio, &BuildOptions::default()).await.unwrap();
        // A stale file from an earlier build must not survive
        write(&folio.public_dir, "stale.html", "old");
        let second = build_site(&folio, &BuildOptions::default()).await.unwrap();

        assert_eq!(first.digest, second.digest);
        assert_eq!(first.digest.files, 2);
        assert!(!folio.public_dir.join("stale.html").exists());
        assert!(folio.public_dir.join("posts/first/index.html").exists());
    }

    #[tokio::test]
    async fn test_failed_build_reports_step() {
        let (_dir, folio) = site("echo 'template error' >&2; exit 1");
        let err = build_site(&folio, &BuildOptions::default())
            .await
            .unwrap_err();
        match err {
            Error::StepFailed { step, code } => {
                assert_eq!(step, "build");
                assert_eq!(code, Some(1));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_content_never_reaches_generator() {
        let (dir, folio) = site(FAKE_GENERATOR);
        write(dir.path(), "content/posts/broken.md", "---\ntitle: [x\n---\n");
        let err = build_site(&folio, &BuildOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Invalid { count: 1 }));
        assert!(!folio.public_dir.exists());
    }
}
