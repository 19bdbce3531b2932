//! Data files - the structured records behind the home page sections

mod sections;

pub use sections::{
    About, Author, Badge, Link, Project, Projects, SectionHeader, SectionKind, Skill, Skills,
};

use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::validate::Issue;

/// A section data file
#[derive(Debug, Clone, PartialEq)]
pub struct SectionFile {
    pub path: PathBuf,
    /// `None` when the file has no `section:` block
    pub header: Option<SectionHeader>,
    pub kind: SectionKind,
}

impl SectionFile {
    /// Display name: header name, else the file stem
    pub fn name(&self) -> String {
        self.header
            .as_ref()
            .and_then(|h| h.name.clone())
            .unwrap_or_else(|| file_stem(&self.path))
    }

    pub fn is_enabled(&self) -> bool {
        self.header.as_ref().map_or(true, |h| h.enable)
    }

    fn weight(&self) -> i64 {
        self.header
            .as_ref()
            .and_then(|h| h.weight)
            .unwrap_or(i64::MAX)
    }
}

/// All data files under the data directory
#[derive(Debug, Default)]
pub struct DataStore {
    pub sections: Vec<SectionFile>,
    pub author: Option<(PathBuf, Author)>,
    /// Data files that are neither sections nor the author bio
    pub others: Vec<PathBuf>,
    /// Files that could not be read or parsed
    pub failures: Vec<Error>,
}

impl DataStore {
    /// Load every `.yaml`/`.yml` file under `data_dir`, recursively
    pub fn load(data_dir: &Path) -> Self {
        let mut store = DataStore::default();
        if !data_dir.exists() {
            return store;
        }

        for entry in WalkDir::new(data_dir)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(data_dir).to_path_buf();
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                    tracing::warn!("Failed to read data directory entry {:?}: {}", path, source);
                    store.failures.push(Error::io(path, source));
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !is_yaml_file(path) {
                continue;
            }
            if let Err(e) = store.load_file(path) {
                tracing::warn!("Failed to load data file {:?}: {}", path, e);
                store.failures.push(e);
            }
        }

        tracing::debug!(
            "Loaded {} sections from {:?}",
            store.sections.len(),
            data_dir
        );
        store
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let value: serde_yaml::Value = if content.trim().is_empty() {
            serde_yaml::Value::Null
        } else {
            serde_yaml::from_str(&content).map_err(|e| data_error(path, e))?
        };

        let stem = file_stem(path);
        if stem == "author" {
            let author: Author = from_value(path, value)?;
            self.author = Some((path.to_path_buf(), author));
            return Ok(());
        }

        let header = match value.get("section") {
            Some(section) => Some(from_value::<SectionHeader>(path, section.clone())?),
            None => None,
        };

        let kind = match stem.as_str() {
            "about" => SectionKind::About(from_value(path, value)?),
            "skills" => SectionKind::Skills(from_value(path, value)?),
            "projects" => SectionKind::Projects(from_value(path, value)?),
            _ if header.is_some() => SectionKind::Other(value),
            _ => {
                self.others.push(path.to_path_buf());
                return Ok(());
            }
        };

        self.sections.push(SectionFile {
            path: path.to_path_buf(),
            header,
            kind,
        });
        Ok(())
    }

    /// Enabled sections ordered by weight, then name; unweighted sections go last
    pub fn enabled_sections(&self) -> Vec<&SectionFile> {
        let mut enabled: Vec<_> = self.sections.iter().filter(|s| s.is_enabled()).collect();
        enabled.sort_by(|a, b| {
            a.weight()
                .cmp(&b.weight())
                .then_with(|| a.name().cmp(&b.name()))
        });
        enabled
    }

    /// Missing required fields, one issue per field
    pub fn validate(&self) -> Vec<Issue> {
        let mut issues = Vec::new();

        for section in &self.sections {
            match &section.header {
                None => issues.push(Issue::error(
                    &section.path,
                    format!("{} data file has no `section` block", section.kind.label()),
                )),
                Some(header) => {
                    let mut missing = Vec::new();
                    sections::require(&mut missing, "section.name", &header.name);
                    for field in missing {
                        issues.push(Issue::error(
                            &section.path,
                            format!("missing required field `{field}`"),
                        ));
                    }
                }
            }
            for field in section.kind.missing_fields() {
                issues.push(Issue::error(
                    &section.path,
                    format!("missing required field `{field}`"),
                ));
            }
        }

        if let Some((path, author)) = &self.author {
            let mut missing = Vec::new();
            sections::require(&mut missing, "name", &author.name);
            for field in missing {
                issues.push(Issue::error(path, format!("missing required field `{field}`")));
            }
        }

        issues
    }
}

fn from_value<T: DeserializeOwned>(path: &Path, value: serde_yaml::Value) -> Result<T> {
    // A blank file deserializes like an empty mapping
    let value = match value {
        serde_yaml::Value::Null => serde_yaml::Value::Mapping(Default::default()),
        other => other,
    };
    serde_yaml::from_value(value).map_err(|e| data_error(path, e))
}

fn data_error(path: &Path, e: serde_yaml::Error) -> Error {
    Error::DataFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

fn is_yaml_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
