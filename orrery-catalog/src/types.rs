//! Core types for the model catalog.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::rules::{self, CategoryRules};

/// Display grouping for a model, derived from its id.
///
/// Variant order is the fixed display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Featured,
    Generative,
    Vision,
    Embedding,
    Experimental,
    Other,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 6] = [
        Category::Featured,
        Category::Generative,
        Category::Vision,
        Category::Embedding,
        Category::Experimental,
        Category::Other,
    ];

    /// Human-readable section title.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Featured => "Featured",
            Category::Generative => "Generative",
            Category::Vision => "Vision",
            Category::Embedding => "Embedding",
            Category::Experimental => "Experimental",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// Substring-derived status flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFlags {
    pub is_preview: bool,
    pub is_experimental: bool,
    pub is_live: bool,
}

/// Glyph hint for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Icon {
    Star,
    Sparkles,
    Eye,
    Vector,
    Flask,
    Radio,
    Cube,
}

impl Icon {
    /// Pick an icon from a record's derived metadata.
    pub fn for_model(category: Category, flags: &ModelFlags) -> Self {
        if flags.is_live {
            return Icon::Radio;
        }
        match category {
            Category::Featured => Icon::Star,
            Category::Generative => Icon::Sparkles,
            Category::Vision => Icon::Eye,
            Category::Embedding => Icon::Vector,
            Category::Experimental => Icon::Flask,
            Category::Other => Icon::Cube,
        }
    }
}

/// Placeholder used when a source has no description.
pub const DEFAULT_DESCRIPTION: &str = "No description available.";

/// Placeholder used when a source has no short description.
pub const DEFAULT_SHORT_DESCRIPTION: &str = "AI model";

/// One normalized catalog entry.
///
/// Records are immutable values. Category, flags and icon are computed when
/// the record is built and cannot be set directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelRecord {
    /// Provider slug, unique within one fetch result.
    pub id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Source that produced this record.
    pub provider_id: String,
    /// Raw owner/organization string.
    pub owned_by: String,
    /// Unix seconds.
    pub created_at: i64,
    pub description: String,
    pub short_description: String,
    pub input_modalities: Vec<String>,
    pub output_modalities: Vec<String>,
    pub capabilities: BTreeSet<String>,
    category: Category,
    flags: ModelFlags,
    icon: Icon,
}

impl ModelRecord {
    /// Create a new record builder.
    pub fn builder(provider_id: &str, id: &str) -> ModelRecordBuilder {
        ModelRecordBuilder::new(provider_id, id)
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn flags(&self) -> ModelFlags {
        self.flags
    }

    pub fn icon(&self) -> Icon {
        self.icon
    }

    /// Capabilities as a display string; empty renders as "general purpose".
    pub fn capability_summary(&self) -> String {
        if self.capabilities.is_empty() {
            "general purpose".to_string()
        } else {
            self.capabilities
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

/// Builder for constructing `ModelRecord`.
#[derive(Debug)]
pub struct ModelRecordBuilder {
    provider_id: String,
    id: String,
    display_name: Option<String>,
    owned_by: Option<String>,
    created_at: i64,
    description: Option<String>,
    short_description: Option<String>,
    input_modalities: Vec<String>,
    output_modalities: Vec<String>,
    capabilities: BTreeSet<String>,
}

impl ModelRecordBuilder {
    fn new(provider_id: &str, id: &str) -> Self {
        Self {
            provider_id: provider_id.to_string(),
            id: id.to_string(),
            display_name: None,
            owned_by: None,
            created_at: 0,
            description: None,
            short_description: None,
            input_modalities: rules::default_modalities(),
            output_modalities: rules::default_modalities(),
            capabilities: BTreeSet::new(),
        }
    }

    /// Set the display name. Blank names fall back to one derived from the id.
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn owned_by(mut self, owner: impl Into<String>) -> Self {
        self.owned_by = Some(owner.into());
        self
    }

    pub fn created_at(mut self, unix_seconds: i64) -> Self {
        self.created_at = unix_seconds;
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn short_description(mut self, text: impl Into<String>) -> Self {
        self.short_description = Some(text.into());
        self
    }

    /// Set input modalities. An empty list keeps the `["text"]` default.
    pub fn input_modalities(mut self, modalities: Vec<String>) -> Self {
        if !modalities.is_empty() {
            self.input_modalities = modalities;
        }
        self
    }

    /// Set output modalities. An empty list keeps the `["text"]` default.
    pub fn output_modalities(mut self, modalities: Vec<String>) -> Self {
        if !modalities.is_empty() {
            self.output_modalities = modalities;
        }
        self
    }

    pub fn capability(mut self, tag: impl Into<String>) -> Self {
        self.capabilities.insert(tag.into());
        self
    }

    pub fn capabilities<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Build the `ModelRecord`, deriving category, flags and icon.
    pub fn build(self, rules: &CategoryRules) -> ModelRecord {
        let display_name = self
            .display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| rules::display_name_from_id(&self.id));
        let flags = rules::derive_flags(&self.id, &display_name);
        let category = rules::derive_category(&self.id, &flags, rules);

        ModelRecord {
            owned_by: non_blank(self.owned_by).unwrap_or_else(|| self.provider_id.clone()),
            description: non_blank(self.description)
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            short_description: non_blank(self.short_description)
                .unwrap_or_else(|| DEFAULT_SHORT_DESCRIPTION.to_string()),
            id: self.id,
            display_name,
            provider_id: self.provider_id,
            created_at: self.created_at,
            input_modalities: self.input_modalities,
            output_modalities: self.output_modalities,
            capabilities: self.capabilities,
            icon: Icon::for_model(category, &flags),
            category,
            flags,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A model entry as a source delivered it, before normalization.
///
/// Field names follow the OpenAI-compatible list schema, which most
/// providers speak; other wire formats convert into this shape. Every field
/// except `id` is optional and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawModel {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    /// Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    /// Prose list of input modalities, e.g. "Text, images, and audio".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// Prose list of output modalities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
    /// Provider API methods the model supports (e.g. `generateContent`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
}

impl RawModel {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn created(mut self, unix_seconds: i64) -> Self {
        self.created = Some(unix_seconds);
        self
    }

    pub fn owned_by(mut self, owner: impl Into<String>) -> Self {
        self.owned_by = Some(owner.into());
        self
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn short_description(mut self, text: impl Into<String>) -> Self {
        self.short_description = Some(text.into());
        self
    }

    pub fn input(mut self, prose: impl Into<String>) -> Self {
        self.input = Some(prose.into());
        self
    }

    pub fn output(mut self, prose: impl Into<String>) -> Self {
        self.output = Some(prose.into());
        self
    }

    pub fn capability(mut self, tag: impl Into<String>) -> Self {
        self.capabilities.push(tag.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.methods.push(method.into());
        self
    }
}
