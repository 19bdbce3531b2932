//! Content store validation

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::content::assets;
use crate::content::loader::{ContentLoader, ContentScan};
use crate::data::{DataStore, SectionKind};
use crate::Folio;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A single finding, tied to the file it was found in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: PathBuf,
    pub severity: Severity,
    pub message: String,
}

impl Issue {
    pub fn error(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path.display(), self.message)
    }
}

/// Everything `check` found
#[derive(Debug, Default)]
pub struct Report {
    pub issues: Vec<Issue>,
    pub documents: usize,
    pub sections: usize,
}

impl Report {
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// True when nothing would fail the build
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }
}

/// Validate content documents and data files
pub fn check(folio: &Folio) -> Report {
    let scan = ContentLoader::new(folio).scan();
    let data = DataStore::load(&folio.data_dir);
    check_loaded(folio, &scan, &data)
}

/// Validate an already loaded content store
pub fn check_loaded(folio: &Folio, scan: &ContentScan, data: &DataStore) -> Report {
    let mut report = Report {
        documents: scan.posts.len(),
        sections: data.sections.len(),
        ..Default::default()
    };

    for failure in scan.failures.iter().chain(data.failures.iter()) {
        let path = match failure {
            crate::Error::Document { path, .. }
            | crate::Error::DataFile { path, .. }
            | crate::Error::Io { path, .. } => path.clone(),
            _ => folio.base_dir.clone(),
        };
        report.issues.push(Issue::error(path, failure.to_string()));
    }

    let mut slugs: HashMap<(&str, &str), &Path> = HashMap::new();
    for post in &scan.posts {
        let path = post.full_source.as_path();

        for missing in assets::missing_assets(post, &folio.static_dir) {
            report.issues.push(Issue::error(
                path,
                format!("references missing asset '{}'", missing.raw),
            ));
        }

        for (field, value) in post.front_matter.invalid_dates() {
            report
                .issues
                .push(Issue::error(path, format!("unparseable {field} '{value}'")));
        }

        if post.front_matter.title.as_deref().map_or(true, str::is_empty) {
            report.issues.push(Issue::warning(path, "no title"));
        }
        if post.front_matter.date.is_none() && !post.section.is_empty() && !post.is_list_page() {
            report.issues.push(Issue::warning(path, "no date"));
        }

        if let Some(first) = slugs.insert((post.section.as_str(), post.slug.as_str()), path) {
            report.issues.push(Issue::warning(
                path,
                format!(
                    "slug '{}' already used by {} in the same section",
                    post.slug,
                    first.display()
                ),
            ));
        }
    }

    report.issues.extend(data.validate());

    for section in &data.sections {
        if let SectionKind::Skills(skills) = &section.kind {
            for logo in skills.skills.iter().filter_map(|s| s.logo.as_deref()) {
                if let Some(rooted) = logo.strip_prefix('/') {
                    if !folio.static_dir.join(rooted).exists() {
                        report.issues.push(Issue::warning(
                            &section.path,
                            format!("skill logo '{logo}' not found in static directory"),
                        ));
                    }
                }
            }
        }
    }

    report.issues.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.path.cmp(&b.path))
    });
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_clean_site_passes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "static/images/a.png", "png");
        write(
            root,
            "content/posts/a.md",
            "---\ntitle: A\ndate: 2025-01-01\n---\n![a](/images/a.png)\n",
        );
        write(root, "content/about.md", "---\ntitle: About\n---\nHi\n");
        write(
            root,
            "data/projects.yaml",
            "section:\n  name: Projects\nprojects:\n  - name: p\n    summary: s\n",
        );
        let folio = Folio::new(root).unwrap();
        let report = check(&folio);
        assert!(report.is_ok(), "{:?}", report.issues);
        assert_eq!(report.warnings().count(), 0, "{:?}", report.issues);
        assert_eq!(report.documents, 2);
        assert_eq!(report.sections, 1);
    }

    #[test]
    fn test_reports_every_problem() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "content/posts/bad.md", "---\ntitle: [x\n---\n");
        write(
            root,
            "content/posts/one.md",
            "---\ntitle: One\ndate: someday\nslug: same\n---\n![m](/missing.png)\n",
        );
        write(
            root,
            "content/posts/two.md",
            "---\ndate: 2024-01-01\nslug: same\n---\n",
        );
        write(
            root,
            "data/projects.yaml",
            "section:\n  name: Projects\nprojects:\n  - name: p\n",
        );
        let folio = Folio::new(root).unwrap();
        let report = check(&folio);

        assert!(!report.is_ok());
        let errors: Vec<_> = report.errors().map(|i| i.message.clone()).collect();
        assert_eq!(errors.len(), 4, "{:?}", errors);
        assert!(errors.iter().any(|m| m.contains("malformed YAML front matter")));
        assert!(errors.iter().any(|m| m.contains("missing asset '/missing.png'")));
        assert!(errors.iter().any(|m| m.contains("unparseable date 'someday'")));
        assert!(errors.iter().any(|m| m.contains("projects[0].summary")));

        let warnings: Vec<_> = report.warnings().map(|i| i.message.clone()).collect();
        assert_eq!(warnings.len(), 2, "{:?}", warnings);
        assert_eq!(warnings[0], "no title");
        assert!(warnings[1].starts_with("slug 'same' already used by"));
        // Errors sort before warnings
        assert_eq!(report.issues[0].severity, Severity::Error);
    }
}
