//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"# folio configuration

# Site
title: My Notes
base_url: https://example.org/
language: en
author: Your Name
theme: toha

# Directory
content_dir: content
data_dir: data
static_dir: static
public_dir: public
archetype_dir: archetypes

# Writing
build_drafts: false
build_future: false
build_expired: false

# Generator
build:
  command: hugo
  minify: true
  gc: true
  git_info: true
  # generator_version: "=0.128.0"
  install:
    command: npm
    args: [ci]
    when_exists: package-lock.json
  tidy:
    command: hugo
    args: [mod, tidy]
    when_exists: go.mod
  digest_ignore:
    - .hugo_build.lock

# Publish target
publish:
  dir: site
  # cname: blog.example.org
  nojekyll: true
  keep: [.git]
"#;

const ARCHETYPE: &str = r#"---
title: "{{ title }}"
date: {{ date }}
draft: {{ draft }}
tags: []
categories: []
---
"#;

const ABOUT: &str = r#"section:
  name: About
  id: about
  enable: true
  weight: 1
  showOnNavbar: true
  template: sections/about.html

name: Your Name
designation: Software Engineer
summary: A few words about what you do and what you write about.
socialLinks:
  - name: GitHub
    icon: fab fa-github
    url: https://github.com/your-name
badges: []
"#;

const SKILLS: &str = r#"section:
  name: Skills
  id: skills
  enable: true
  weight: 2
  showOnNavbar: true

skills:
  - name: Rust
    summary: Command line tools and services.
"#;

const PROJECTS: &str = r#"section:
  name: Projects
  id: projects
  enable: true
  weight: 3
  showOnNavbar: true

projects:
  - name: This site
    role: Author
    url: https://example.org/
    summary: Notes on probability, statistics and functional programming.
    tags: [writing]
"#;

const AUTHOR: &str = r#"name: Your Name
nickname: you
summary: Engineer and occasional writer.
contactInfo:
  email: you@example.org
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(crate::config::CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }

    // Create directory structure
    for dir in ["content/posts", "data", "static/images", "archetypes"] {
        fs::create_dir_all(target_dir.join(dir))?;
    }

    fs::write(&config_path, CONFIG)?;
    fs::write(target_dir.join("archetypes/default.md"), ARCHETYPE)?;
    fs::write(target_dir.join("data/about.yaml"), ABOUT)?;
    fs::write(target_dir.join("data/skills.yaml"), SKILLS)?;
    fs::write(target_dir.join("data/projects.yaml"), PROJECTS)?;
    fs::write(target_dir.join("data/author.yaml"), AUTHOR)?;
    fs::write(target_dir.join(".gitignore"), "/public/\n/resources/_gen/\n.hugo_build.lock\n")?;

    // Create a sample post
    let now = chrono::Local::now();
    let sample_post = format!(
        r#"---
title: Hello World
date: {}
tags: [meta]
---

This is the first post. Create another one with:

```bash
$ folio new "My New Post"
```

Check the content before building with `folio check`, build with
`folio build`, and publish the result with `folio deploy`.
"#,
        now.format("%Y-%m-%dT%H:%M:%S%:z")
    );

    fs::write(target_dir.join("content/posts/hello-world.md"), sample_post)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Folio;

    #[test]
    fn test_initialized_site_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        let folio = Folio::new(dir.path()).unwrap();
        assert_eq!(folio.config.theme, "toha");
        let report = folio.check();
        assert!(report.is_ok(), "{:?}", report.issues);
        assert_eq!(report.documents, 1);
        assert_eq!(report.sections, 3);

        assert!(init_site(dir.path()).is_err());
    }
}
