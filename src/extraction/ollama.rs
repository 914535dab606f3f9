//! Production AI field extractor backed by a local Ollama instance.
//!
//! Availability is probed via `/api/tags`; extraction goes through
//! `/api/chat` with the document image base64-encoded into the message.
//! The model is asked for a flat JSON object of document fields, which is
//! parsed leniently (first `{` to last `}`) and handed to the normalizer.

use base64::Engine as _;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::types::{AiExtraction, AiFieldExtractor, DocumentKind};
use super::ExtractionError;

const EXTRACTION_SYSTEM_PROMPT: &str = "\
You are an identity-document field extractor. You receive one photo of an \
identity or legal document and return ONLY a flat JSON object with the \
fields you can read. Use null for anything not visible. Do not invent \
values.";

const EXTRACTION_PROMPT: &str = "\
Extract the document fields as a single JSON object with these keys: \
full_name, curp, passport_number, document_number, birth_date (ISO 8601), \
gender, nationality, address, expiry_date. Return only the JSON object.";

/// Ollama HTTP client implementing `AiFieldExtractor`.
pub struct OllamaFieldExtractor {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaFieldExtractor {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Default local Ollama instance with a 2-minute timeout.
    pub fn default_local(model: &str) -> Self {
        Self::new("http://localhost:11434", model, 120)
    }

    fn list_models(&self) -> Result<Vec<String>, ExtractionError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().map_err(|e| {
            if e.is_connect() {
                ExtractionError::AiConnection(self.base_url.clone())
            } else {
                ExtractionError::AiService(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::AiService(format!(
                "tags request returned {status}"
            )));
        }

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| ExtractionError::ResponseParsing(e.to_string()))?;
        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct OllamaChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

/// Pull the outermost JSON object out of a model response that may wrap it
/// in prose or a code fence.
fn extract_json_object(response: &str) -> Result<&str, ExtractionError> {
    let start = response.find('{').ok_or_else(|| {
        ExtractionError::ResponseParsing("no JSON object in model response".into())
    })?;
    let end = response.rfind('}').ok_or_else(|| {
        ExtractionError::ResponseParsing("unterminated JSON object in model response".into())
    })?;
    if end < start {
        return Err(ExtractionError::ResponseParsing(
            "malformed JSON object in model response".into(),
        ));
    }
    Ok(&response[start..=end])
}

impl AiFieldExtractor for OllamaFieldExtractor {
    fn is_available(&self) -> bool {
        match self.list_models() {
            Ok(models) => {
                let model_component = self.model.split(':').next().unwrap_or(&self.model);
                let found = models.iter().any(|m| m.starts_with(model_component));
                if !found {
                    tracing::warn!(model = %self.model, "Configured model not present in Ollama");
                }
                found
            }
            Err(e) => {
                tracing::warn!(error = %e, "AI extraction service unavailable");
                false
            }
        }
    }

    fn extract(
        &self,
        image: &DynamicImage,
        kind: DocumentKind,
    ) -> Result<AiExtraction, ExtractionError> {
        let _span = tracing::info_span!(
            "ai_field_extraction",
            model = %self.model,
            document_kind = kind.as_str(),
        )
        .entered();

        let mut png = std::io::Cursor::new(Vec::new());
        image
            .write_to(&mut png, image::ImageFormat::Png)
            .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encoding failed: {e}")))?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(png.into_inner());

        let url = format!("{}/api/chat", self.base_url);
        let body = OllamaChatRequest {
            model: &self.model,
            messages: vec![
                OllamaChatMessage {
                    role: "system",
                    content: EXTRACTION_SYSTEM_PROMPT,
                    images: None,
                },
                OllamaChatMessage {
                    role: "user",
                    content: EXTRACTION_PROMPT,
                    images: Some(vec![encoded]),
                },
            ],
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                ExtractionError::AiConnection(self.base_url.clone())
            } else if e.is_timeout() {
                ExtractionError::AiService(format!(
                    "Request timed out after {}s",
                    self.timeout_secs
                ))
            } else {
                ExtractionError::AiService(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExtractionError::AiService(format!(
                "chat request returned {status}: {body}"
            )));
        }

        let parsed: OllamaChatResponse = response
            .json()
            .map_err(|e| ExtractionError::ResponseParsing(e.to_string()))?;

        let json_str = extract_json_object(&parsed.message.content)?;
        let fields: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json_str)
            .map_err(|e| ExtractionError::ResponseParsing(e.to_string()))?;

        tracing::info!(field_count = fields.len(), "AI extraction response parsed");
        Ok(AiExtraction {
            fields,
            model: self.model.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_json_from_fenced_response() {
        let response = "Here you go:\n```json\n{\"full_name\": \"X\"}\n```";
        assert_eq!(extract_json_object(response).unwrap(), "{\"full_name\": \"X\"}");
    }

    #[test]
    fn extracts_bare_json() {
        let response = "{\"curp\": \"ABCD\"}";
        assert_eq!(extract_json_object(response).unwrap(), response);
    }

    #[test]
    fn rejects_response_without_json() {
        assert!(extract_json_object("I could not read the document.").is_err());
    }

    #[test]
    fn rejects_reversed_braces() {
        assert!(extract_json_object("} nothing {").is_err());
    }
}
