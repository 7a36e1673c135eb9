// Article set builder: validates raw rows into an ordered article list.

use std::collections::HashSet;

use super::models::{Article, ArticleRow};
use crate::error::SchemaError;

/// Turn raw table rows into articles, preserving row order.
///
/// Every row needs an id and a summary; there is no grouping signal
/// without the summary, so a missing one fails the whole set. Blank
/// links are treated as absent. Rows are numbered from 1 in errors.
pub fn build_articles(rows: Vec<ArticleRow>) -> Result<Vec<Article>, SchemaError> {
    let mut seen = HashSet::with_capacity(rows.len());
    let mut articles = Vec::with_capacity(rows.len());

    for (i, row) in rows.into_iter().enumerate() {
        let row_number = i + 1;

        let id = non_blank(row.id).ok_or(SchemaError::MissingId { row: row_number })?;
        let summary = row
            .summary
            .filter(|s| !s.trim().is_empty())
            .ok_or(SchemaError::MissingSummary { row: row_number })?;

        if !seen.insert(id.clone()) {
            return Err(SchemaError::DuplicateId { id });
        }

        articles.push(Article::new(id, summary, non_blank(row.link)));
    }

    Ok(articles)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
