//! Front-matter parsing and serialization

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

const YAML_DELIMITER: &str = "---";
const TOML_DELIMITER: &str = "+++";

/// Custom deserializer that handles both a single value and a list of values
///
/// Scalar items (`tags: [2024, rust]`) are kept as their string form.
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_yaml::Value;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items.into_iter().map(scalar_string::<D::Error>).collect(),
        Some(other) => Ok(vec![scalar_string::<D::Error>(other)?]),
    }
}

fn scalar_string<E: serde::de::Error>(value: serde_yaml::Value) -> Result<String, E> {
    use serde_yaml::Value;

    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Tagged(tagged) => scalar_string(tagged.value),
        other => Err(E::custom(format!(
            "expected a string or a list of strings, found {:?}",
            other
        ))),
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Menu placement of a document
///
/// Accepts `menu: main`, `menu: [main, footer]` or a map of menu name to entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Menu {
    Name(String),
    Names(Vec<String>),
    Entries(IndexMap<String, MenuEntry>),
}

impl Menu {
    /// Names of the menus this document is placed in
    pub fn names(&self) -> Vec<&str> {
        match self {
            Menu::Name(n) => vec![n.as_str()],
            Menu::Names(v) => v.iter().map(String::as_str).collect(),
            Menu::Entries(m) => m.keys().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

/// Front-matter data of a content document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<String>,
    #[serde(rename = "publishDate", skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(rename = "expiryDate", skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        deserialize_with = "string_or_vec",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
    #[serde(
        deserialize_with = "string_or_vec",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu: Option<Menu>,
    /// Hero image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "canonicalURL", skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub draft: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Additional custom fields, in document order
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content).trim_start();

        if first_line(content) == YAML_DELIMITER {
            return Self::parse_yaml(content);
        }

        if first_line(content) == TOML_DELIMITER {
            return Self::parse_toml(content);
        }

        if content.starts_with('{') {
            return Self::parse_json(content);
        }

        // No front-matter found
        Ok((FrontMatter::default(), content))
    }

    fn parse_yaml(content: &str) -> Result<(Self, &str)> {
        match split_block(content, YAML_DELIMITER) {
            Some((block, remaining)) => {
                if block.trim().is_empty() {
                    return Ok((FrontMatter::default(), remaining));
                }
                // A leading `---` with prose under it is a thematic break
                if !looks_like_yaml(block) {
                    return Ok((FrontMatter::default(), content));
                }
                let fm = serde_yaml::from_str::<FrontMatter>(block).map_err(|e| {
                    Error::FrontMatter {
                        format: "YAML",
                        message: e.to_string(),
                    }
                })?;
                Ok((fm, remaining))
            }
            None => {
                let after_open = content.get(YAML_DELIMITER.len()..).unwrap_or("");
                if looks_like_yaml(after_open) {
                    Err(Error::UnterminatedFrontMatter {
                        delimiter: YAML_DELIMITER,
                    })
                } else {
                    Ok((FrontMatter::default(), content))
                }
            }
        }
    }

    fn parse_toml(content: &str) -> Result<(Self, &str)> {
        let (block, remaining) =
            split_block(content, TOML_DELIMITER).ok_or(Error::UnterminatedFrontMatter {
                delimiter: TOML_DELIMITER,
            })?;

        let malformed = |message: String| Error::FrontMatter {
            format: "TOML",
            message,
        };

        let table: toml::Table = toml::from_str(block).map_err(|e| malformed(e.to_string()))?;
        let value = toml_to_yaml(toml::Value::Table(table));
        let fm = serde_yaml::from_value::<FrontMatter>(value).map_err(|e| malformed(e.to_string()))?;
        Ok((fm, remaining))
    }

    fn parse_json(content: &str) -> Result<(Self, &str)> {
        // Find the brace closing the leading object, ignoring braces in strings
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        let mut end_pos = None;
        for (i, c) in content.char_indices() {
            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end_pos = Some(i + 1);
                        break;
                    }
                }
                _ => {}
            }
        }

        let end_pos = end_pos.ok_or(Error::UnterminatedFrontMatter { delimiter: "{" })?;
        let fm: FrontMatter =
            serde_json::from_str(&content[..end_pos]).map_err(|e| Error::FrontMatter {
                format: "JSON",
                message: e.to_string(),
            })?;
        let remaining = content[end_pos..].trim_start_matches(['\n', '\r']);
        Ok((fm, remaining))
    }

    /// Serialize as a `---` delimited YAML block, ready to prefix a markdown body
    pub fn to_yaml(&self) -> Result<String> {
        let body = serde_yaml::to_string(self).map_err(|e| Error::FrontMatter {
            format: "YAML",
            message: e.to_string(),
        })?;
        // An empty mapping serializes as `{}`
        let body = if body.trim() == "{}" { "" } else { body.as_str() };
        Ok(format!("{YAML_DELIMITER}\n{body}{YAML_DELIMITER}\n"))
    }

    /// Parse the date string into a DateTime
    pub fn parse_date(&self) -> Option<DateTime<Local>> {
        self.date.as_deref().and_then(parse_date_string)
    }

    /// Parse the last modification date
    pub fn parse_lastmod(&self) -> Option<DateTime<Local>> {
        self.lastmod.as_deref().and_then(parse_date_string)
    }

    /// Parse the publish date
    pub fn parse_publish_date(&self) -> Option<DateTime<Local>> {
        self.publish_date.as_deref().and_then(parse_date_string)
    }

    /// Parse the expiry date
    pub fn parse_expiry_date(&self) -> Option<DateTime<Local>> {
        self.expiry_date.as_deref().and_then(parse_date_string)
    }

    /// Date fields that are set but cannot be parsed, as (field, value)
    pub fn invalid_dates(&self) -> Vec<(&'static str, &str)> {
        [
            ("date", &self.date),
            ("lastmod", &self.lastmod),
            ("publishDate", &self.publish_date),
            ("expiryDate", &self.expiry_date),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            let value = value.as_deref()?;
            parse_date_string(value).is_none().then_some((field, value))
        })
        .collect()
    }
}

fn first_line(content: &str) -> &str {
    content.lines().next().unwrap_or("").trim_end()
}

/// Split `content` (which starts with an opening delimiter line) into the
/// block between the delimiters and the text after the closing line.
fn split_block<'a>(content: &'a str, delimiter: &str) -> Option<(&'a str, &'a str)> {
    let open_end = content.find('\n')? + 1;
    let rest = &content[open_end..];

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == delimiter {
            let block = &rest[..offset];
            let remaining = rest[offset + line.len()..].trim_start_matches(['\n', '\r']);
            return Some((block, remaining));
        }
        offset += line.len();
    }
    None
}

/// Whether any line of `block` has the shape `key: value` or `key:`
fn looks_like_yaml(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = &trimmed[..colon_pos];
        let is_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp" | "mailto");
        let after = &trimmed[colon_pos + 1..];
        is_key && (after.is_empty() || after.starts_with(' '))
    })
}

fn toml_to_yaml(value: toml::Value) -> serde_yaml::Value {
    use serde_yaml::Value as Y;
    match value {
        toml::Value::String(s) => Y::String(s),
        toml::Value::Integer(i) => Y::Number(i.into()),
        toml::Value::Float(f) => Y::Number(f.into()),
        toml::Value::Boolean(b) => Y::Bool(b),
        toml::Value::Datetime(dt) => Y::String(dt.to_string()),
        toml::Value::Array(items) => Y::Sequence(items.into_iter().map(toml_to_yaml).collect()),
        toml::Value::Table(table) => Y::Mapping(
            table
                .into_iter()
                .map(|(k, v)| (Y::String(k), toml_to_yaml(v)))
                .collect(),
        ),
    }
}

/// Parse a date string in the formats front matter commonly uses
pub fn parse_date_string(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.with_timezone(&Local));
    }

    const DATETIME_FORMATS: [&str; 6] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Local.from_local_datetime(&naive).earliest();
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Local.from_local_datetime(&d.and_hms_opt(0, 0, 0)?).earliest();
        }
    }

    None
}
