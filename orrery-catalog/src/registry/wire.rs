//! Provider list-endpoint wire formats.
//!
//! Each provider's response is decoded into its own shape and converted into
//! [`RawModel`]. Unknown fields are ignored everywhere.

use chrono::DateTime;
use serde::Deserialize;

use crate::types::RawModel;

/// Which response body a provider's list endpoint returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSchema {
    /// `{ "data": [{ "id", "object", "created", "owned_by" }] }`
    OpenAi,
    /// `{ "data": [{ "id", "type", "display_name", "created_at" }] }`
    Anthropic,
    /// `{ "models": [{ "name": "models/…", "displayName", … }] }`
    Gemini,
}

impl ListSchema {
    /// Decode a response body into raw models.
    pub fn decode(&self, body: &[u8]) -> serde_json::Result<Vec<RawModel>> {
        match self {
            ListSchema::OpenAi => {
                let list: DataList<OpenAiModel> = serde_json::from_slice(body)?;
                Ok(list.data.into_iter().map(RawModel::from).collect())
            }
            ListSchema::Anthropic => {
                let list: DataList<AnthropicModel> = serde_json::from_slice(body)?;
                Ok(list.data.into_iter().map(RawModel::from).collect())
            }
            ListSchema::Gemini => {
                let list: GeminiModelList = serde_json::from_slice(body)?;
                Ok(list.models.into_iter().map(RawModel::from).collect())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct DataList<T> {
    data: Vec<T>,
}

/// Entry from an OpenAI-compatible `/models`.
///
/// Some compatible hosts send `type` next to `object`; either names the kind.
#[derive(Debug, Deserialize)]
struct OpenAiModel {
    id: String,
    #[serde(default)]
    object: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    created: Option<i64>,
    #[serde(default)]
    owned_by: Option<String>,
}

impl From<OpenAiModel> for RawModel {
    fn from(model: OpenAiModel) -> Self {
        RawModel {
            id: model.id,
            object: model.object.or(model.kind),
            created: model.created,
            owned_by: model.owned_by,
            ..Default::default()
        }
    }
}

/// Entry from Anthropic's `/v1/models`.
#[derive(Debug, Deserialize)]
struct AnthropicModel {
    id: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    /// RFC 3339 timestamp.
    #[serde(default)]
    created_at: Option<String>,
}

impl From<AnthropicModel> for RawModel {
    fn from(model: AnthropicModel) -> Self {
        let created = model
            .created_at
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.timestamp());

        RawModel {
            id: model.id,
            object: model.kind,
            created,
            owned_by: Some("anthropic".to_string()),
            display_name: model.display_name,
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiModelList {
    #[serde(default)]
    models: Vec<GeminiModel>,
}

/// Entry from Gemini's `/v1beta/models`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModel {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

impl From<GeminiModel> for RawModel {
    fn from(model: GeminiModel) -> Self {
        let id = model
            .name
            .strip_prefix("models/")
            .unwrap_or(&model.name)
            .to_string();

        RawModel {
            id,
            object: Some("model".to_string()),
            owned_by: Some("google".to_string()),
            display_name: model.display_name,
            description: model.description,
            methods: model.supported_generation_methods,
            ..Default::default()
        }
    }
}
