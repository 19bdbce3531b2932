//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::FrontMatter;
use crate::Folio;

/// What to create
#[derive(Debug, Clone)]
pub struct NewPost<'a> {
    pub title: &'a str,
    /// Directory under the content directory
    pub section: &'a str,
    pub draft: bool,
    /// Create `<slug>/index.md` so assets can live beside the post
    pub bundle: bool,
}

/// Create a post from the section archetype (or a built-in scaffold); returns its path
pub fn create_post(folio: &Folio, post: &NewPost<'_>) -> Result<PathBuf> {
    let now = chrono::Local::now();
    let slug = slug::slugify(post.title);
    if slug.is_empty() {
        anyhow::bail!("Title {:?} has no usable characters for a file name", post.title);
    }

    let section_dir = folio.content_dir.join(post.section);
    let file_path = if post.bundle {
        section_dir.join(&slug).join("index.md")
    } else {
        section_dir.join(format!("{}.md", slug))
    };

    // Check if file already exists
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let date = now.format("%Y-%m-%dT%H:%M:%S%:z").to_string();
    let archetype = [
        folio.archetype_dir.join(format!("{}.md", post.section)),
        folio.archetype_dir.join("default.md"),
    ]
    .into_iter()
    .find(|p| p.exists());

    let content = match archetype {
        Some(path) => {
            tracing::debug!("Using archetype {:?}", path);
            fill_title(&fs::read_to_string(&path)?, post.title)
                .replace("{{ date }}", &date)
                .replace("{{ .Date }}", &date)
                .replace("{{ draft }}", &post.draft.to_string())
        }
        None => {
            let fm = FrontMatter {
                title: Some(post.title.to_string()),
                date: Some(date),
                author: Some(folio.config.author.clone()).filter(|a| !a.is_empty()),
                draft: post.draft,
                ..Default::default()
            };
            fm.to_yaml()?
        }
    };

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;

    println!("Created: {:?}", file_path);
    Ok(file_path)
}

/// Substitute the title placeholders, quoting the title so any text survives as a scalar
fn fill_title(template: &str, title: &str) -> String {
    // A JSON string is also a valid double-quoted YAML and TOML string
    let double_quoted = serde_json::to_string(title).unwrap_or_else(|_| format!("{:?}", title));
    let single_quoted = format!("'{}'", title.replace('\'', "''"));

    let mut text = template.to_string();
    for placeholder in ["{{ title }}", "{{ .Title }}"] {
        text = text
            .replace(&format!("\"{placeholder}\""), &double_quoted)
            .replace(&format!("'{placeholder}'"), &single_quoted)
            .replace(placeholder, &double_quoted);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::loader::ContentLoader;

    #[test]
    fn test_new_post_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let folio = Folio::new(dir.path()).unwrap();
        let path = create_post(
            &folio,
            &NewPost {
                title: "Ergodic theorems: a tour",
                section: "posts",
                draft: true,
                bundle: false,
            },
        )
        .unwrap();
        assert_eq!(
            path,
            folio.content_dir.join("posts/ergodic-theorems-a-tour.md")
        );

        let post = ContentLoader::new(&folio).load_post(&path).unwrap();
        assert_eq!(post.title(), "Ergodic theorems: a tour");
        assert!(post.is_draft());
        assert!(post.date.is_some());
    }

    #[test]
    fn test_quoted_title_through_init_archetype() {
        let dir = tempfile::tempdir().unwrap();
        crate::commands::init::init_site(dir.path()).unwrap();
        let folio = Folio::new(dir.path()).unwrap();

        let title = r#"Why "random" walks don't return \ sometimes"#;
        let path = create_post(
            &folio,
            &NewPost {
                title,
                section: "posts",
                draft: false,
                bundle: false,
            },
        )
        .unwrap();

        let post = ContentLoader::new(&folio).load_post(&path).unwrap();
        assert_eq!(post.title(), title);
        assert!(folio.check().is_ok());
    }

    #[test]
    fn test_fill_title_quoting_styles() {
        let template = "title: '{{ .Title }}'\nalt: {{ title }}\n";
        let text = fill_title(template, "It's \"ok\"");
        assert_eq!(text, "title: 'It''s \"ok\"'\nalt: \"It's \\\"ok\\\"\"\n");
        let fm: FrontMatter = serde_yaml::from_str(&text).unwrap();
        assert_eq!(fm.title.as_deref(), Some("It's \"ok\""));
    }

    #[test]
    fn test_archetype_and_no_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let folio = Folio::new(dir.path()).unwrap();
        fs::create_dir_all(&folio.archetype_dir).unwrap();
        fs::write(
            folio.archetype_dir.join("default.md"),
            "---\ntitle: \"{{ title }}\"\ndate: {{ .Date }}\ndraft: {{ draft }}\ntags: []\n---\n",
        )
        .unwrap();

        let new = NewPost {
            title: "Folds",
            section: "notes",
            draft: false,
            bundle: true,
        };
        let path = create_post(&folio, &new).unwrap();
        assert_eq!(path, folio.content_dir.join("notes/folds/index.md"));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("title: \"Folds\""));
        assert!(text.contains("draft: false"));

        assert!(create_post(&folio, &new).is_err());
    }
}
