//! Classifier backed by a local Ollama server.

use crate::caps::{Caps, ParamValue};
use crate::classify::{Classify, ClassifyError, ClassifyRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_MODEL: &str = "llama3.1";
const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// The shape we ask the model to answer in.
#[derive(Deserialize)]
struct TypeGuess {
    #[serde(default)]
    type_name: String,
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    extensions: Vec<String>,
    #[serde(default)]
    rationale: String,
}

/// [`Classify`] implementation calling Ollama's generate endpoint.
///
/// Requests are blocking with a per-request timeout; an unreachable or
/// slow server surfaces as [`ClassifyError::Unavailable`] so the pipeline
/// can report the collaborator failure distinctly from a detection miss.
pub struct OllamaClassifier {
    model: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::blocking::Client,
}

impl OllamaClassifier {
    /// Create a classifier with default model, endpoint, and timeout.
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Use a different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use a different server endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a different per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for OllamaClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn build_prompt(request: &ClassifyRequest<'_>) -> String {
    let label = request.source_label.unwrap_or("unknown");
    format!(
        "You identify file types from raw evidence.\n\
         Source: {label}\n\
         First bytes (hex): {hex}\n\
         Text preview:\n{preview}\n\n\
         Answer with a single JSON object and nothing else, with keys:\n\
         type_name (short kebab-case name), mime_type, extensions (list), rationale.",
        hex = request.header_hex,
        preview = request.text_preview,
    )
}

/// Extract the first top-level JSON object from free-form model output.
///
/// Models often wrap the object in prose or code fences, so this scans
/// for the outermost braces instead of parsing the whole response.
fn extract_json_object(text: &str) -> Result<TypeGuess, ClassifyError> {
    let start = text
        .find('{')
        .ok_or_else(|| ClassifyError::Malformed("no JSON object in response".to_string()))?;
    let end = text
        .rfind('}')
        .ok_or_else(|| ClassifyError::Malformed("unterminated JSON object".to_string()))?;
    if end < start {
        return Err(ClassifyError::Malformed(
            "unterminated JSON object".to_string(),
        ));
    }
    serde_json::from_str(&text[start..=end])
        .map_err(|e| ClassifyError::Malformed(format!("invalid JSON object: {e}")))
}

fn guess_to_caps(guess: TypeGuess) -> Caps {
    let media_type = if guess.mime_type.is_empty() {
        "application/octet-stream".to_string()
    } else {
        guess.mime_type
    };
    let name = if guess.type_name.is_empty() {
        "unknown".to_string()
    } else {
        guess.type_name
    };
    let mut caps = Caps::new(media_type, &name)
        .with_uri(format!("urn:typeflow:caps:{name}"))
        .with_broader(["urn:typeflow:category:content"]);
    if !guess.rationale.is_empty() {
        caps = caps.with_param("description", guess.rationale);
    }
    if !guess.extensions.is_empty() {
        caps = caps.with_param("extensions", ParamValue::List(guess.extensions));
    }
    caps
}

impl Classify for OllamaClassifier {
    fn classify(&self, request: &ClassifyRequest<'_>) -> Result<Caps, ClassifyError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt: build_prompt(request),
            stream: false,
        };
        tracing::debug!(model = self.model.as_str(), "classifier request");
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .timeout(self.timeout)
            .json(&body)
            .send()
            .map_err(|e| ClassifyError::Unavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ClassifyError::Malformed(format!(
                "server returned {}",
                response.status()
            )));
        }
        let generated: GenerateResponse = response
            .json()
            .map_err(|e| ClassifyError::Malformed(e.to_string()))?;
        let guess = extract_json_object(&generated.response)?;
        Ok(guess_to_caps(guess))
    }
}
