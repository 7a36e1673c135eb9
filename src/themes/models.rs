// Theme data model: the per-batch response shape and the run-wide state.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// One batch's classification, as decoded from the service's response.
///
/// Both fields are required; any other fields in the response are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThemeMap {
    /// article id -> theme name
    pub doc_to_theme: BTreeMap<String, String>,
    /// Themes this batch introduced
    pub new_theme_names: Vec<String>,
}

/// The set of theme names seen so far in a run.
///
/// Names compare by exact string equality. The set only grows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThemeVocabulary {
    names: BTreeSet<String>,
}

impl ThemeVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name. Returns false if it was already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in lexicographic (byte) order. Stable for identical sets.
    pub fn sorted(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    pub fn is_superset(&self, other: &ThemeVocabulary) -> bool {
        self.names.is_superset(&other.names)
    }
}

impl<S: Into<String>> FromIterator<S> for ThemeVocabulary {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Run-wide `article id -> theme` mapping.
///
/// Iterates in first-assignment order. Reassigning an id replaces its theme
/// but keeps its position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlobalAssignment {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl GlobalAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `theme` to `article_id`, returning the previous theme if any.
    pub fn assign(&mut self, article_id: impl Into<String>, theme: impl Into<String>) -> Option<String> {
        let article_id = article_id.into();
        let theme = theme.into();
        match self.index.get(&article_id) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, theme)),
            None => {
                self.index.insert(article_id.clone(), self.entries.len());
                self.entries.push((article_id, theme));
                None
            }
        }
    }

    pub fn get(&self, article_id: &str) -> Option<&str> {
        self.index
            .get(article_id)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn contains(&self, article_id: &str) -> bool {
        self.index.contains_key(article_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(article id, theme)` pairs in first-assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(id, theme)| (id.as_str(), theme.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GlobalAssignment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut assignment = Self::new();
        for (id, theme) in iter {
            assignment.assign(id, theme);
        }
        assignment
    }
}

/// Final output: `theme -> [article ids]`.
///
/// Themes appear in the order they were first used; ids keep assignment
/// order. Serializes as a JSON object in that order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThemeGroups {
    groups: Vec<(String, Vec<String>)>,
}

impl ThemeGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `article_id` under `theme`, creating the group if needed.
    pub fn push(&mut self, theme: &str, article_id: impl Into<String>) {
        let article_id = article_id.into();
        match self.groups.iter_mut().find(|(name, _)| name == theme) {
            Some((_, ids)) => ids.push(article_id),
            None => self.groups.push((theme.to_string(), vec![article_id])),
        }
    }

    pub fn get(&self, theme: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(name, _)| name == theme)
            .map(|(_, ids)| ids.as_slice())
    }

    /// Number of themes.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(name, ids)| (name.as_str(), ids.as_slice()))
    }

    /// Back to `(article id, theme)` pairs, group by group.
    pub fn flatten(&self) -> Vec<(String, String)> {
        self.groups
            .iter()
            .flat_map(|(theme, ids)| ids.iter().map(move |id| (id.clone(), theme.clone())))
            .collect()
    }
}

impl Serialize for ThemeGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (theme, ids) in &self.groups {
            map.serialize_entry(theme, ids)?;
        }
        map.end()
    }
}
