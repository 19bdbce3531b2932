//! Site configuration (folio.yml)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Name of the configuration file at the site root
pub const CONFIG_FILE: &str = "folio.yml";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub base_url: String,
    pub language: String,
    pub author: String,
    pub description: String,
    pub theme: String,

    // Directory
    pub content_dir: String,
    pub data_dir: String,
    pub static_dir: String,
    pub public_dir: String,
    pub archetype_dir: String,

    // Writing
    pub build_drafts: bool,
    pub build_future: bool,
    pub build_expired: bool,

    // Pipeline
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub publish: PublishConfig,

    /// Theme parameters, passed through untouched
    #[serde(default)]
    pub params: IndexMap<String, serde_yaml::Value>,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Site".to_string(),
            base_url: String::new(),
            language: "en".to_string(),
            author: String::new(),
            description: String::new(),
            theme: String::new(),

            content_dir: "content".to_string(),
            data_dir: "data".to_string(),
            static_dir: "static".to_string(),
            public_dir: "public".to_string(),
            archetype_dir: "archetypes".to_string(),

            build_drafts: false,
            build_future: false,
            build_expired: false,

            build: BuildConfig::default(),
            publish: PublishConfig::default(),

            params: IndexMap::new(),
            extra: IndexMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&content).map_err(|message| Error::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        // An empty file is a valid, all-default configuration
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: SiteConfig = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        if config.build.command.trim().is_empty() {
            return Err("build.command must not be empty".to_string());
        }
        if let Some(req) = &config.build.generator_version {
            semver::VersionReq::parse(req)
                .map_err(|e| format!("build.generator_version '{}': {}", req, e))?;
        }
        Ok(config)
    }
}

/// Generator invocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Generator binary
    pub command: String,
    /// Arguments placed before the generated flags
    pub args: Vec<String>,
    pub minify: bool,
    pub gc: bool,
    pub git_info: bool,
    /// Arguments placed after the generated flags
    pub extra_args: Vec<String>,
    /// Semver requirement the generator must satisfy, e.g. `=0.128.0`
    pub generator_version: Option<String>,
    pub version_args: Vec<String>,
    pub install: StepConfig,
    pub tidy: StepConfig,
    /// Glob patterns (relative to the output root) left out of tree digests
    pub digest_ignore: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            command: "hugo".to_string(),
            args: Vec::new(),
            minify: true,
            gc: true,
            git_info: true,
            extra_args: Vec::new(),
            generator_version: None,
            version_args: vec!["version".to_string()],
            install: StepConfig {
                enable: true,
                command: "npm".to_string(),
                args: vec!["ci".to_string()],
                when_exists: "package-lock.json".to_string(),
            },
            tidy: StepConfig {
                enable: true,
                command: "hugo".to_string(),
                args: vec!["mod".to_string(), "tidy".to_string()],
                when_exists: "go.mod".to_string(),
            },
            digest_ignore: vec![".hugo_build.lock".to_string()],
        }
    }
}

/// An auxiliary pipeline step that only runs when a marker file exists
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StepConfig {
    pub enable: bool,
    pub command: String,
    pub args: Vec<String>,
    /// Path relative to the site root; the step is skipped when it is absent
    #[serde(alias = "lockfile", alias = "marker")]
    pub when_exists: String,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            enable: true,
            command: String::new(),
            args: Vec::new(),
            when_exists: String::new(),
        }
    }
}

/// Publish target settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Directory the output tree is copied to
    pub dir: String,
    /// Custom domain, written to `CNAME` in the published tree
    pub cname: Option<String>,
    /// Write an empty `.nojekyll` marker
    pub nojekyll: bool,
    /// Entries of the existing target that survive a publish
    pub keep: Vec<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            dir: "site".to_string(),
            cname: None,
            nojekyll: true,
            keep: vec![".git".to_string()],
        }
    }
}
