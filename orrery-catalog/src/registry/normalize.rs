//! Per-provider mapping from [`RawModel`] to [`ModelRecord`].
//!
//! These functions never fail: anything missing falls back to a default.

use crate::rules::{CategoryRules, parse_io_set};
use crate::types::{ModelRecord, ModelRecordBuilder, RawModel};

/// Signature shared by every provider's normalize function.
///
/// `fetched_at` stands in for a missing creation time, which keeps the
/// function pure for a given input.
pub type NormalizeFn = fn(&RawModel, &str, &CategoryRules, i64) -> ModelRecord;

/// Fields every schema maps the same way.
fn base(raw: &RawModel, provider_id: &str, fetched_at: i64) -> ModelRecordBuilder {
    let mut builder = ModelRecord::builder(provider_id, &raw.id)
        .created_at(raw.created.unwrap_or(fetched_at))
        .capabilities(raw.capabilities.iter().map(|c| c.trim().to_lowercase()));

    if let Some(name) = &raw.display_name {
        builder = builder.display_name(name);
    }
    if let Some(owner) = &raw.owned_by {
        builder = builder.owned_by(owner);
    }
    if let Some(text) = &raw.description {
        builder = builder.description(text);
    }
    if let Some(text) = &raw.short_description {
        builder = builder.short_description(text);
    }
    if let Some(prose) = &raw.input {
        builder = builder.input_modalities(parse_io_set(prose));
    }
    if let Some(prose) = &raw.output {
        builder = builder.output_modalities(parse_io_set(prose));
    }
    builder
}

/// Schema-only mapping for providers without extra inference.
pub fn normalize_generic(
    raw: &RawModel,
    provider_id: &str,
    rules: &CategoryRules,
    fetched_at: i64,
) -> ModelRecord {
    base(raw, provider_id, fetched_at).build(rules)
}

/// OpenAI ids encode most of what the list endpoint leaves out.
pub fn normalize_openai(
    raw: &RawModel,
    provider_id: &str,
    rules: &CategoryRules,
    fetched_at: i64,
) -> ModelRecord {
    let id = raw.id.to_lowercase();
    let mut builder = base(raw, provider_id, fetched_at);
    let mut input: Vec<&str> = vec!["text"];
    let mut output: Vec<&str> = vec!["text"];

    if id.contains("embedding") {
        builder = builder.capability("embeddings");
    } else if id.starts_with("dall-e") || id.starts_with("gpt-image") {
        builder = builder.capability("image-generation");
        output = vec!["image"];
    } else if id.starts_with("sora") {
        builder = builder.capability("video-generation");
        output = vec!["video"];
    } else if id.starts_with("tts") || id.contains("-tts") {
        builder = builder.capability("speech");
        output = vec!["audio"];
    } else if id.starts_with("whisper") || id.contains("transcribe") {
        builder = builder.capability("transcription");
        input = vec!["audio"];
    } else if id.contains("moderation") {
        builder = builder.capability("moderation");
    } else {
        builder = builder.capability("chat");
        if id.starts_with("gpt-4o") || id.starts_with("gpt-4.1") || id.starts_with("gpt-5") {
            builder = builder.capability("vision");
            input.push("image");
        }
        if id.contains("realtime") || id.contains("audio") {
            builder = builder.capability("realtime");
            input.push("audio");
            output.push("audio");
        }
        if id.contains("search") {
            builder = builder.capability("search");
        }
    }

    if raw.input.is_none() {
        builder = builder.input_modalities(owned(&input));
    }
    if raw.output.is_none() {
        builder = builder.output_modalities(owned(&output));
    }
    builder.build(rules)
}

/// Every current Claude model chats and reads images.
pub fn normalize_anthropic(
    raw: &RawModel,
    provider_id: &str,
    rules: &CategoryRules,
    fetched_at: i64,
) -> ModelRecord {
    let mut builder = base(raw, provider_id, fetched_at).capabilities(["chat", "vision"]);
    if raw.input.is_none() {
        builder = builder.input_modalities(owned(&["text", "image"]));
    }
    builder.build(rules)
}

/// Gemini advertises supported API methods; map them to capability tags.
pub fn normalize_gemini(
    raw: &RawModel,
    provider_id: &str,
    rules: &CategoryRules,
    fetched_at: i64,
) -> ModelRecord {
    let tags = raw.methods.iter().filter_map(|method| match method.as_str() {
        "generateContent" => Some("chat"),
        "embedContent" | "batchEmbedContents" => Some("embeddings"),
        "bidiGenerateContent" => Some("live"),
        "predict" | "predictLongRunning" => Some("generation"),
        "createCachedContent" => Some("caching"),
        _ => None,
    });
    base(raw, provider_id, fetched_at).capabilities(tags).build(rules)
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    const RULES: CategoryRules = CategoryRules {
        featured: &["gpt-4o"],
        vision: &["dall-e", "sora"],
        chat: &["gpt"],
    };

    #[test]
    fn missing_created_uses_fetch_time() {
        let raw = RawModel::new("gpt-4o-mini");
        let record = normalize_generic(&raw, "openai", &RULES, 42);
        assert_eq!(record.created_at, 42);

        let raw = RawModel::new("gpt-4o-mini").created(7);
        let record = normalize_generic(&raw, "openai", &RULES, 42);
        assert_eq!(record.created_at, 7);
    }

    #[test]
    fn normalize_is_idempotent() {
        let raw = RawModel::new("gemini-2.0-flash-exp")
            .description("Experimental flash")
            .input("Audio, images, videos, and text")
            .method("generateContent");

        let a = normalize_gemini(&raw, "gemini", &RULES, 100);
        let b = normalize_gemini(&raw, "gemini", &RULES, 100);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_vec(&a).unwrap(),
            serde_json::to_vec(&b).unwrap()
        );
    }

    #[test]
    fn prose_modalities_are_parsed() {
        let raw = RawModel::new("x")
            .input("Audio, images, videos, and text")
            .output("Text");
        let record = normalize_generic(&raw, "mock", &RULES, 0);
        assert_eq!(record.input_modalities, vec!["audio", "image", "video", "text"]);
        assert_eq!(record.output_modalities, vec!["text"]);
    }

    #[test]
    fn openai_infers_from_id() {
        let record = normalize_openai(&RawModel::new("dall-e-3"), "openai", &RULES, 0);
        assert!(record.capabilities.contains("image-generation"));
        assert_eq!(record.output_modalities, vec!["image"]);
        assert_eq!(record.category(), Category::Vision);

        let record = normalize_openai(&RawModel::new("gpt-4o"), "openai", &RULES, 0);
        assert!(record.capabilities.contains("vision"));
        assert_eq!(record.input_modalities, vec!["text", "image"]);
        assert_eq!(record.category(), Category::Featured);

        let record = normalize_openai(&RawModel::new("whisper-1"), "openai", &RULES, 0);
        assert_eq!(record.input_modalities, vec!["audio"]);
        assert_eq!(record.category(), Category::Other);
    }

    #[test]
    fn gemini_maps_methods_to_capabilities() {
        let raw = RawModel::new("gemini-embedding-001")
            .method("embedContent")
            .method("countTokens");
        let record = normalize_gemini(&raw, "gemini", &CategoryRules::GENERIC, 0);
        assert_eq!(record.capabilities.len(), 1);
        assert!(record.capabilities.contains("embeddings"));
        assert_eq!(record.category(), Category::Embedding);
    }

    #[test]
    fn anthropic_defaults_to_multimodal_input() {
        let raw = RawModel::new("claude-opus-4-1-20250805").display_name("Claude Opus 4.1");
        let record = normalize_anthropic(&raw, "anthropic", &CategoryRules::GENERIC, 0);
        assert_eq!(record.display_name, "Claude Opus 4.1");
        assert_eq!(record.input_modalities, vec!["text", "image"]);
        assert!(record.capabilities.contains("chat"));
    }
}
