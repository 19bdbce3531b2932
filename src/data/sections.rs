//! Section records (About / Skills / Projects) and the author bio

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// The `section:` block every section data file starts with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionHeader {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "default_true")]
    pub enable: bool,
    #[serde(default)]
    pub weight: Option<i64>,
    #[serde(default = "default_true")]
    pub show_on_navbar: bool,
    /// Theme template used to render the section
    #[serde(default)]
    pub template: Option<String>,
}

impl Default for SectionHeader {
    fn default() -> Self {
        Self {
            name: None,
            id: None,
            enable: true,
            weight: None,
            show_on_navbar: true,
            template: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Badge {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    /// Badge image
    pub badge: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct About {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub summary: Option<String>,
    pub resume_link: Option<String>,
    pub social_links: Vec<Link>,
    pub badges: Vec<Badge>,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    pub name: Option<String>,
    pub logo: Option<String>,
    pub summary: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skills {
    pub skills: Vec<Skill>,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: Option<String>,
    pub role: Option<String>,
    pub timeline: Option<String>,
    pub repo: Option<String>,
    pub url: Option<String>,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub badges: Vec<Badge>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Projects {
    pub projects: Vec<Project>,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

/// Author bio (`author.yaml`); not a section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Author {
    pub name: Option<String>,
    pub nickname: Option<String>,
    pub image: Option<String>,
    pub greeting: Option<String>,
    pub summary: Option<String>,
    pub contact_info: IndexMap<String, String>,
}

/// Section body, chosen by file stem
#[derive(Debug, Clone, PartialEq)]
pub enum SectionKind {
    About(About),
    Skills(Skills),
    Projects(Projects),
    Other(serde_yaml::Value),
}

impl SectionKind {
    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::About(_) => "about",
            SectionKind::Skills(_) => "skills",
            SectionKind::Projects(_) => "projects",
            SectionKind::Other(_) => "other",
        }
    }

    /// Required fields that are missing or blank, as human-readable locations
    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        match self {
            SectionKind::About(about) => {
                require(&mut missing, "name", &about.name);
                require(&mut missing, "summary", &about.summary);
            }
            SectionKind::Skills(skills) => {
                if skills.skills.is_empty() {
                    missing.push("skills".to_string());
                }
                for (i, skill) in skills.skills.iter().enumerate() {
                    require(&mut missing, &format!("skills[{i}].name"), &skill.name);
                }
            }
            SectionKind::Projects(projects) => {
                if projects.projects.is_empty() {
                    missing.push("projects".to_string());
                }
                for (i, project) in projects.projects.iter().enumerate() {
                    require(&mut missing, &format!("projects[{i}].name"), &project.name);
                    require(
                        &mut missing,
                        &format!("projects[{i}].summary"),
                        &project.summary,
                    );
                }
            }
            SectionKind::Other(_) => {}
        }
        missing
    }
}

pub(crate) fn require(missing: &mut Vec<String>, field: &str, value: &Option<String>) {
    if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
        missing.push(field.to_string());
    }
}
