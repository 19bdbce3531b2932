//! List site content

use anyhow::Result;

use crate::content::index::{self, Visibility};
use crate::content::loader::ContentLoader;
use crate::data::DataStore;
use crate::Folio;

/// List site content by type
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let posts = ContentLoader::new(folio).load_posts()?;
    let visibility = Visibility::from_config(&folio.config);
    let listed = index::build_index(&posts, &visibility);

    match content_type {
        "post" | "posts" => {
            println!("Posts ({} of {}):", listed.len(), posts.len());
            for post in &listed {
                let date = post
                    .date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "----------".to_string());
                println!("  {} - {} [{}]", date, post.title(), post.source);
            }
            let hidden: Vec<_> = posts.iter().filter(|p| !visibility.is_listed(p)).collect();
            if !hidden.is_empty() {
                println!("Not listed ({}):", hidden.len());
                for post in hidden {
                    let reason = if post.is_draft() { "draft" } else { "scheduled or expired" };
                    println!("  {} [{}] ({})", post.title(), post.source, reason);
                }
            }
        }
        "tag" | "tags" => {
            let tags = index::tags(&listed);
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        "category" | "categories" => {
            let categories = index::categories(&listed);
            println!("Categories ({}):", categories.len());
            for (cat, count) in categories {
                println!("  {} ({})", cat, count);
            }
        }
        "section" | "sections" => {
            let data = DataStore::load(&folio.data_dir);
            let sections = data.enabled_sections();
            println!("Sections ({} of {}):", sections.len(), data.sections.len());
            for section in sections {
                let template = section
                    .header
                    .as_ref()
                    .and_then(|h| h.template.as_deref())
                    .unwrap_or("-");
                println!(
                    "  {} ({}) [{}]",
                    section.name(),
                    section.kind.label(),
                    template
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, category, section",
                content_type
            );
        }
    }

    Ok(())
}
