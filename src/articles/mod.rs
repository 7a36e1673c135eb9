// Article input: loading summarized rows and validating them into articles.

pub mod builder;
pub mod loader;
pub mod models;

pub use builder::build_articles;
pub use models::{Article, ArticleRow};
