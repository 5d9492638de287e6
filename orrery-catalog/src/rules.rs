//! Derivation rules for presentation metadata.
//!
//! Everything here is a pure function of a single record's own strings:
//! no I/O, no shared state, and never consults another record. Calling any
//! of these twice on the same input yields the same output.

use crate::types::{Category, ModelFlags};

/// Provider-specific markers used to classify model ids.
///
/// All entries are lower-case; matching lower-cases the id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryRules {
    /// Curated ids that are always `Featured`.
    pub featured: &'static [&'static str],
    /// Image/video generation family names.
    pub vision: &'static [&'static str],
    /// General chat-model family names.
    pub chat: &'static [&'static str],
}

impl CategoryRules {
    /// Rules that only know the provider-independent markers.
    pub const GENERIC: CategoryRules = CategoryRules {
        featured: &[],
        vision: &[],
        chat: &[],
    };
}

/// Compute the display flags from an id and display name.
pub fn derive_flags(id: &str, display_name: &str) -> ModelFlags {
    let id = id.to_lowercase();
    let name = display_name.to_lowercase();
    let either = |needle: &str| id.contains(needle) || name.contains(needle);

    ModelFlags {
        is_preview: either("preview"),
        is_experimental: either("-exp") || either("experimental"),
        is_live: either("-live"),
    }
}

/// Classify a model id. First matching rule wins.
pub fn derive_category(id: &str, flags: &ModelFlags, rules: &CategoryRules) -> Category {
    let id = id.to_lowercase();

    if rules.featured.iter().any(|f| *f == id) {
        Category::Featured
    } else if rules.vision.iter().any(|m| id.contains(m)) {
        Category::Vision
    } else if id.contains("embedding") {
        Category::Embedding
    } else if rules.chat.iter().any(|m| id.contains(m)) {
        Category::Generative
    } else if id.contains("exp") || flags.is_experimental {
        Category::Experimental
    } else {
        Category::Other
    }
}

/// Turn a slug like `gemini-2.5-pro` into `Gemini 2.5 Pro`.
pub fn display_name_from_id(id: &str) -> String {
    id.split('-')
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Modalities assumed when a source says nothing.
pub fn default_modalities() -> Vec<String> {
    vec!["text".to_string()]
}

/// Parse a prose modality list into tokens.
///
/// `"Audio, images, videos, and text"` becomes
/// `["audio", "image", "video", "text"]`. Parenthetical qualifiers such as
/// `(experimental)` are dropped before splitting on commas; each token is
/// trimmed, lower-cased and loses a leading `"and "`. Known plurals are
/// singularized. Blank input yields the `["text"]` default.
pub fn parse_io_set(text: &str) -> Vec<String> {
    let stripped = strip_parentheticals(text);

    let tokens: Vec<String> = stripped
        .split(',')
        .map(|token| token.trim().to_lowercase())
        .map(|token| match token.strip_prefix("and ") {
            Some(rest) => rest.trim().to_string(),
            None => token,
        })
        .filter(|token| !token.is_empty())
        .map(singular)
        .collect();

    if tokens.is_empty() {
        default_modalities()
    } else {
        tokens
    }
}

fn strip_parentheticals(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

fn singular(token: String) -> String {
    match token.as_str() {
        "images" => "image".to_string(),
        "videos" => "video".to_string(),
        "texts" => "text".to_string(),
        "pdfs" => "pdf".to_string(),
        _ => token,
    }
}
