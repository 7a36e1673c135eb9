// JSON persistence for run results.
//
// Two files per run:
//   themes.json         {theme: [article_id, ...]}
//   theme_summary.json  {theme: {links: [...], count: n}}
// The summary joins the theme groups back against the articles by id.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::info;

use crate::articles::Article;
use crate::themes::ThemeGroups;

pub const THEMES_FILE: &str = "themes.json";
pub const SUMMARY_FILE: &str = "theme_summary.json";

/// Links and link count for one theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeLinks {
    pub links: Vec<String>,
    pub count: usize,
}

/// `{theme: {links, count}}`, in theme-group order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThemeSummary {
    entries: Vec<(String, ThemeLinks)>,
}

impl ThemeSummary {
    pub fn get(&self, theme: &str) -> Option<&ThemeLinks> {
        self.entries
            .iter()
            .find(|(name, _)| name == theme)
            .map(|(_, links)| links)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ThemeSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (theme, links) in &self.entries {
            map.serialize_entry(theme, links)?;
        }
        map.end()
    }
}

/// Join theme groups against the articles by id.
///
/// Only articles with a source link contribute, and `count` is the number
/// of links, so a theme whose articles have no links reports zero.
pub fn theme_summary(groups: &ThemeGroups, articles: &[Article]) -> ThemeSummary {
    let by_id: HashMap<&str, &Article> = articles.iter().map(|a| (a.id(), a)).collect();

    let entries = groups
        .iter()
        .map(|(theme, ids)| {
            let links: Vec<String> = ids
                .iter()
                .filter_map(|id| by_id.get(id.as_str()))
                .filter_map(|a| a.source_ref())
                .map(str::to_string)
                .collect();
            let count = links.len();
            (theme.to_string(), ThemeLinks { links, count })
        })
        .collect();

    ThemeSummary { entries }
}

/// Serialize `value` as pretty JSON to `path`, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("Failed to serialize results")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Saved results");
    Ok(())
}

/// Write both result files into `dir`. Returns their paths.
pub fn save_results(dir: &Path, groups: &ThemeGroups, articles: &[Article]) -> Result<(PathBuf, PathBuf)> {
    let themes_path = dir.join(THEMES_FILE);
    let summary_path = dir.join(SUMMARY_FILE);
    write_json(groups, &themes_path)?;
    write_json(&theme_summary(groups, articles), &summary_path)?;
    Ok((themes_path, summary_path))
}
