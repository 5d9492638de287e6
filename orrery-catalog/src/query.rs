//! Filtering, sorting and grouping over catalog records.
//!
//! All functions are pure and leave their input untouched.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{Category, ModelRecord};

/// Ordering applied to a record list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    /// Display name A–Z.
    #[default]
    #[serde(rename = "name")]
    NameAscending,
    /// Display name Z–A.
    #[serde(rename = "name-desc")]
    NameDescending,
    /// Most recently created first.
    #[serde(rename = "newest")]
    DateNewest,
    /// Oldest first.
    #[serde(rename = "oldest")]
    DateOldest,
}

impl SortKey {
    /// Compare two records. Ties break by `id` ascending, so the order is total.
    pub fn compare(&self, a: &ModelRecord, b: &ModelRecord) -> Ordering {
        let primary = match self {
            SortKey::NameAscending => compare_names(a, b),
            SortKey::NameDescending => compare_names(b, a),
            SortKey::DateNewest => b.created_at.cmp(&a.created_at),
            SortKey::DateOldest => a.created_at.cmp(&b.created_at),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    fn as_str(&self) -> &'static str {
        match self {
            SortKey::NameAscending => "name",
            SortKey::NameDescending => "name-desc",
            SortKey::DateNewest => "newest",
            SortKey::DateOldest => "oldest",
        }
    }
}

/// Case-insensitive code-point order of display names.
///
/// Not locale collation: lowercased names are compared ordinally, so
/// accented letters sort after `z`. Model names are ASCII in practice.
fn compare_names(a: &ModelRecord, b: &ModelRecord) -> Ordering {
    a.display_name
        .to_lowercase()
        .cmp(&b.display_name.to_lowercase())
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" | "name-asc" => Ok(SortKey::NameAscending),
            "name-desc" => Ok(SortKey::NameDescending),
            "newest" | "date" | "date-newest" => Ok(SortKey::DateNewest),
            "oldest" | "date-oldest" => Ok(SortKey::DateOldest),
            other => Err(format!(
                "unknown sort key '{other}'. Valid: name, name-desc, newest, oldest"
            )),
        }
    }
}

/// Keep records whose id, description or any capability contains `query`,
/// ignoring case. A blank query keeps everything.
pub fn filter_by_text(records: &[ModelRecord], query: &str) -> Vec<ModelRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|r| {
            r.id.to_lowercase().contains(&needle)
                || r.description.to_lowercase().contains(&needle)
                || r.capabilities
                    .iter()
                    .any(|c| c.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Return the records in `key` order.
pub fn sort_by(records: &[ModelRecord], key: SortKey) -> Vec<ModelRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| key.compare(a, b));
    sorted
}

/// Group records by category in fixed display order, each group sorted by
/// `key`. Empty categories are left out.
pub fn group_by_category(
    records: &[ModelRecord],
    key: SortKey,
) -> Vec<(Category, Vec<ModelRecord>)> {
    Category::ALL
        .into_iter()
        .filter_map(|category| {
            let members: Vec<ModelRecord> = records
                .iter()
                .filter(|r| r.category() == category)
                .cloned()
                .collect();
            if members.is_empty() {
                None
            } else {
                Some((category, sort_by(&members, key)))
            }
        })
        .collect()
}

/// A reusable combination of text filter, category filter and sort key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub text: String,
    pub category: Option<Category>,
    pub sort: SortKey,
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn sort(mut self, key: SortKey) -> Self {
        self.sort = key;
        self
    }

    /// Filter then sort into a flat list.
    pub fn apply(&self, records: &[ModelRecord]) -> Vec<ModelRecord> {
        sort_by(&self.matching(records), self.sort)
    }

    /// Filter then group by category.
    pub fn grouped(&self, records: &[ModelRecord]) -> Vec<(Category, Vec<ModelRecord>)> {
        group_by_category(&self.matching(records), self.sort)
    }

    fn matching(&self, records: &[ModelRecord]) -> Vec<ModelRecord> {
        filter_by_text(records, &self.text)
            .into_iter()
            .filter(|r| self.category.is_none_or(|c| r.category() == c))
            .collect()
    }
}
