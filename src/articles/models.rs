// Article records: the immutable unit the whole pipeline joins on.

use serde::Serialize;

/// One summarized article, as handed over by the summarization stage.
///
/// Immutable once built. `id` is unique within a run and is the join key
/// between the classification responses, the theme groups, and the
/// `{links, count}` summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    #[serde(rename = "article_id")]
    id: String,
    summary: String,
    #[serde(rename = "url", skip_serializing_if = "Option::is_none")]
    source_ref: Option<String>,
}

impl Article {
    pub fn new(id: impl Into<String>, summary: impl Into<String>, source_ref: Option<String>) -> Self {
        Self {
            id: id.into(),
            summary: summary.into(),
            source_ref,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Link back to the source page, when the input table had one.
    pub fn source_ref(&self) -> Option<&str> {
        self.source_ref.as_deref()
    }
}

/// A raw input row before validation. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleRow {
    pub id: Option<String>,
    pub summary: Option<String>,
    pub link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_prompt_field_names() {
        let article = Article::new("7", "Fiber helps digestion", Some("https://x/7".into()));
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["article_id"], "7");
        assert_eq!(json["summary"], "Fiber helps digestion");
        assert_eq!(json["url"], "https://x/7");
    }

    #[test]
    fn absent_source_ref_is_omitted() {
        let article = Article::new("7", "Fiber helps digestion", None);
        let json = serde_json::to_string(&article).unwrap();
        assert!(!json.contains("url"));
    }
}
