//! Content module - documents, their front matter, and what the generator will list

pub mod assets;
mod frontmatter;
pub mod index;
pub mod loader;
mod post;

pub use frontmatter::{parse_date_string, FrontMatter, Menu, MenuEntry};
pub use post::Post;
