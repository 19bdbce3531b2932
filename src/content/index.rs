//! Which documents the generator will list, and in what order

use chrono::{DateTime, Local};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::Post;
use crate::config::SiteConfig;

/// Publication filter mirroring the generator's draft/future/expired flags
#[derive(Debug, Clone)]
pub struct Visibility {
    pub drafts: bool,
    pub future: bool,
    pub expired: bool,
    pub now: DateTime<Local>,
}

impl Visibility {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            drafts: config.build_drafts,
            future: config.build_future,
            expired: config.build_expired,
            now: Local::now(),
        }
    }

    /// Whether `post` ends up in the generated site
    pub fn is_listed(&self, post: &Post) -> bool {
        if post.is_draft() && !self.drafts {
            return false;
        }
        if !self.future {
            let scheduled = post.publish_date.or(post.date);
            if scheduled.is_some_and(|d| d > self.now) {
                return false;
            }
        }
        if !self.expired && post.expiry_date.is_some_and(|d| d <= self.now) {
            return false;
        }
        true
    }
}

/// Listed posts in index order: weighted first (ascending), then newest first, then title
pub fn build_index<'a>(posts: &'a [Post], visibility: &Visibility) -> Vec<&'a Post> {
    let mut listed: Vec<_> = posts.iter().filter(|p| visibility.is_listed(p)).collect();
    listed.sort_by(|a, b| index_order(a, b));
    listed
}

fn index_order(a: &Post, b: &Post) -> Ordering {
    let weight = |p: &Post| p.front_matter.weight.filter(|w| *w != 0);
    match (weight(a), weight(b)) {
        (Some(wa), Some(wb)) if wa != wb => return wa.cmp(&wb),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        _ => {}
    }
    b.date
        .cmp(&a.date)
        .then_with(|| a.title().cmp(b.title()))
        .then_with(|| a.source.cmp(&b.source))
}

/// Term counts over listed posts, most used first
pub fn taxonomy<'a, F>(posts: &[&'a Post], terms: F) -> Vec<(String, usize)>
where
    F: Fn(&'a Post) -> &'a [String],
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for post in posts {
        for term in terms(*post) {
            *counts.entry(term.as_str()).or_insert(0) += 1;
        }
    }
    let mut counts: Vec<_> = counts
        .into_iter()
        .map(|(term, n)| (term.to_string(), n))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

pub fn tags<'a>(posts: &[&'a Post]) -> Vec<(String, usize)> {
    taxonomy(posts, |p| p.front_matter.tags.as_slice())
}

pub fn categories<'a>(posts: &[&'a Post]) -> Vec<(String, usize)> {
    taxonomy(posts, |p| p.front_matter.categories.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FrontMatter;
    use chrono::TimeZone;
    use std::path::{Path, PathBuf};

    fn post(name: &str, yaml: &str) -> Post {
        let (fm, body) = FrontMatter::parse(yaml).unwrap();
        Post::new(
            Path::new(&format!("posts/{name}.md")),
            PathBuf::from(format!("/c/posts/{name}.md")),
            fm,
            body.to_string(),
        )
    }

    fn visibility() -> Visibility {
        Visibility {
            drafts: false,
            future: false,
            expired: false,
            now: Local.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_draft_excluded_from_index() {
        let published = post("a", "---\ntitle: A\ndate: 2025-01-01\n---\n");
        let draft = post("b", "---\ntitle: B\ndate: 2025-01-01\ndraft: true\n---\n");
        let posts = vec![published, draft];

        let index = build_index(&posts, &visibility());
        let titles: Vec<_> = index.iter().map(|p| p.title()).collect();
        assert_eq!(titles, vec!["A"]);

        let with_drafts = Visibility {
            drafts: true,
            ..visibility()
        };
        assert_eq!(build_index(&posts, &with_drafts).len(), 2);
    }

    #[test]
    fn test_future_and_expired() {
        let v = visibility();
        let future = post("f", "---\ndate: 2030-01-01\n---\n");
        let scheduled = post("s", "---\ndate: 2024-01-01\npublishDate: 2026-01-01\n---\n");
        let expired = post("e", "---\ndate: 2024-01-01\nexpiryDate: 2025-01-01\n---\n");
        let undated = post("u", "just text");
        assert!(!v.is_listed(&future));
        assert!(!v.is_listed(&scheduled));
        assert!(!v.is_listed(&expired));
        assert!(v.is_listed(&undated));

        let permissive = Visibility {
            future: true,
            expired: true,
            ..visibility()
        };
        assert!(permissive.is_listed(&future));
        assert!(permissive.is_listed(&scheduled));
        assert!(permissive.is_listed(&expired));
    }

    #[test]
    fn test_index_order() {
        let posts = vec![
            post("old", "---\ntitle: Old\ndate: 2020-01-01\n---\n"),
            post("new", "---\ntitle: New\ndate: 2024-01-01\n---\n"),
            post("pinned", "---\ntitle: Pinned\ndate: 2019-01-01\nweight: 1\n---\n"),
            post("same-b", "---\ntitle: Beta\ndate: 2022-01-01\n---\n"),
            post("same-a", "---\ntitle: Alpha\ndate: 2022-01-01\n---\n"),
        ];
        let titles: Vec<_> = build_index(&posts, &visibility())
            .iter()
            .map(|p| p.title())
            .collect();
        assert_eq!(titles, vec!["Pinned", "New", "Alpha", "Beta", "Old"]);
    }

    #[test]
    fn test_taxonomy_counts() {
        let posts = vec![
            post("a", "---\ntags: [rust, fp]\ncategories: code\n---\n"),
            post("b", "---\ntags: [fp]\n---\n"),
            post("c", "---\ntags: [stats]\n---\n"),
        ];
        let listed: Vec<_> = posts.iter().collect();
        assert_eq!(
            tags(&listed),
            vec![
                ("fp".to_string(), 2),
                ("rust".to_string(), 1),
                ("stats".to_string(), 1)
            ]
        );
        assert_eq!(categories(&listed), vec![("code".to_string(), 1)]);
    }
}
