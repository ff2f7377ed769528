//! Language-model alias clustering
//!
//! A completion model receives the distinct surface forms of a chapter and
//! answers with a JSON object mapping arbitrary keys to lists of verbatim
//! surface forms, one list per character. The answer is validated into
//! [`AliasCluster`]s; anything that does not fit that shape is a
//! [`CastGraphError::Parse`] error and callers fall back to the deterministic
//! clusterer.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::core::AliasCluster;
use crate::text::TokenCounter;
use crate::{CastGraphError, ErrorContext, Result};

const ALIAS_SYSTEM_PROMPT: &str = r#"You are an expert reader of the novel the following names come from.
Group the list of people you receive so that each group holds every reference to one character.
Base the grouping on the meaning of the words: gender, titles, typographic resemblance and so on.

Answer with a JSON object and nothing else, in this shape:

{
  "0": ["reference_1", "reference_2"],
  "1": ["reference_1"]
}

Each entry is one character with all of its references. Keys are positions and carry no meaning.

Example input:
CLÉON Ier
Empereur
Cléon
Sire
l'empereur Cléon
Hari Seldon
Seldon
Lieutenant Alban Wellis
Wellis
Hummin

Example output:
{
  "0": ["CLÉON Ier", "Empereur", "Cléon", "Sire", "l'empereur Cléon"],
  "1": ["Hari Seldon", "Seldon"],
  "2": ["Lieutenant Alban Wellis", "Wellis"],
  "3": ["Hummin"]
}

Only use names from the input list and never alter them, including spaces and apostrophes.
You may leave out entries that are not characters of the book."#;

/// Ollama configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,
    /// Ollama port
    pub port: u16,
    /// Model for chat completion
    pub chat_model: String,
    /// Timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum attempts per request
    pub max_retries: u32,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Sampling seed
    pub seed: Option<u64>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".to_string(),
            port: 11434,
            chat_model: "llama3.2:3b".to_string(),
            timeout_seconds: 120,
            max_retries: 3,
            temperature: Some(0.0),
            seed: Some(42),
        }
    }
}

/// A chat-style completion model
pub trait CompletionClient: Send + Sync {
    /// Complete a conversation made of a system and a user message
    fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Name used in logs
    fn name(&self) -> &str {
        "completion"
    }
}

/// Ollama client for chat completion
#[derive(Debug, Clone)]
pub struct OllamaClient {
    config: OllamaConfig,
    #[cfg(feature = "ureq")]
    agent: ureq::Agent,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            #[cfg(feature = "ureq")]
            agent: ureq::AgentBuilder::new()
                .timeout(std::time::Duration::from_secs(config.timeout_seconds))
                .build(),
            config,
        }
    }

    /// Client configuration
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Body of an `/api/chat` request
    pub fn request_body(&self, system: &str, user: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.config.chat_model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "format": "json",
            "stream": false,
            "options": {},
        });
        if let Some(temperature) = self.config.temperature {
            body["options"]["temperature"] = serde_json::json!(temperature);
        }
        if let Some(seed) = self.config.seed {
            body["options"]["seed"] = serde_json::json!(seed);
        }
        body
    }
}

impl CompletionClient for OllamaClient {
    #[cfg(feature = "ureq")]
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        let endpoint = format!("{}:{}/api/chat", self.config.host, self.config.port);
        let body = self.request_body(system, user);
        let attempts = self.config.max_retries.max(1);

        let mut last_error = None;
        for attempt in 1..=attempts {
            match self
                .agent
                .post(&endpoint)
                .set("Content-Type", "application/json")
                .send_json(&body)
            {
                Ok(response) => {
                    let json: serde_json::Value =
                        response
                            .into_json()
                            .map_err(|e| CastGraphError::LanguageModel {
                                message: format!("Failed to parse JSON response: {e}"),
                            })?;

                    return json["message"]["content"]
                        .as_str()
                        .map(str::to_string)
                        .ok_or_else(|| CastGraphError::LanguageModel {
                            message: format!("Invalid response format: {json}"),
                        });
                },
                Err(e) => {
                    tracing::warn!("Ollama request failed (attempt {attempt}/{attempts}): {e}");
                    last_error = Some(e);
                    if attempt < attempts {
                        std::thread::sleep(std::time::Duration::from_millis(200 * u64::from(attempt)));
                    }
                },
            }
        }

        Err(last_error.map_or_else(
            || CastGraphError::LanguageModel {
                message: "Ollama request was never attempted".to_string(),
            },
            CastGraphError::from,
        ))
    }

    #[cfg(not(feature = "ureq"))]
    fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        Err(CastGraphError::LanguageModel {
            message: "ureq feature required for Ollama integration".to_string(),
        })
    }

    fn name(&self) -> &str {
        &self.config.chat_model
    }
}

/// System and user messages asking for an alias grouping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasPrompt {
    /// Fixed instruction
    pub system: String,
    /// Newline-joined surface forms
    pub user: String,
    /// Surface forms actually listed in the user message
    pub forms: Vec<String>,
}

/// Build the alias grouping prompt
///
/// Forms listed in `excluded` are left out; duplicates keep their first
/// position.
pub fn build_alias_prompt<S: AsRef<str>>(forms: &[S], excluded: &[String]) -> AliasPrompt {
    let excluded: HashSet<&str> = excluded.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    let forms: Vec<String> = forms
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter(|form| !excluded.contains(form) && seen.insert(*form))
        .map(str::to_string)
        .collect();

    let user = format!("Input:\n{}\nOutput:", forms.join("\n"));
    AliasPrompt {
        system: ALIAS_SYSTEM_PROMPT.to_string(),
        user,
        forms,
    }
}

/// Ways an alias grouping answer can be malformed
#[derive(Debug, thiserror::Error)]
pub enum LlmResponseError {
    /// No `{ … }` object anywhere in the answer
    #[error("no JSON object in model response")]
    MissingObject,

    /// The object is not valid JSON
    #[error("invalid JSON in model response: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The object has no entries
    #[error("model response holds no alias group")]
    Empty,

    /// A value is not an array
    #[error("alias group '{key}' is not an array")]
    NotAnArray {
        /// Offending key
        key: String,
    },

    /// An array item is not a string
    #[error("alias group '{key}' holds a non-string item")]
    NotAString {
        /// Offending key
        key: String,
    },
}

/// Parse a model answer into alias groups keyed as in the answer
///
/// Prose or code fences around the object are ignored: the text from the
/// first `{` to the last `}` is parsed.
pub fn parse_alias_groups(
    response: &str,
) -> std::result::Result<IndexMap<String, Vec<String>>, LlmResponseError> {
    let start = response.find('{').ok_or(LlmResponseError::MissingObject)?;
    let end = response.rfind('}').ok_or(LlmResponseError::MissingObject)?;
    if end < start {
        return Err(LlmResponseError::MissingObject);
    }

    let raw: IndexMap<String, serde_json::Value> = serde_json::from_str(&response[start..=end])?;
    if raw.is_empty() {
        return Err(LlmResponseError::Empty);
    }

    let mut groups = IndexMap::with_capacity(raw.len());
    for (key, value) in raw {
        let serde_json::Value::Array(items) = value else {
            return Err(LlmResponseError::NotAnArray { key });
        };
        let mut members = Vec::with_capacity(items.len());
        for item in items {
            match item {
                serde_json::Value::String(member) => members.push(member),
                _ => return Err(LlmResponseError::NotAString { key }),
            }
        }
        groups.insert(key, members);
    }
    Ok(groups)
}

/// Parse a model answer into clusters
///
/// A form listed twice keeps its first group, and groups left empty are
/// dropped, so the result is a partition of the forms it mentions.
pub fn clusters_from_response(response: &str) -> Result<Vec<AliasCluster>> {
    let groups = parse_alias_groups(response)?;
    let mut assigned = HashSet::new();
    let mut clusters = Vec::with_capacity(groups.len());

    for (key, members) in groups {
        let mut kept = Vec::with_capacity(members.len());
        for member in members {
            if assigned.insert(member.clone()) {
                kept.push(member);
            } else {
                tracing::debug!(group = %key, form = %member, "form already grouped");
            }
        }
        if !kept.is_empty() {
            clusters.push(AliasCluster::new(kept));
        }
    }

    Ok(clusters)
}

/// Alias clustering delegated to a completion model
#[derive(Clone)]
pub struct LlmAliasClusterer {
    client: Arc<dyn CompletionClient>,
    excluded_forms: Vec<String>,
}

impl std::fmt::Debug for LlmAliasClusterer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmAliasClusterer")
            .field("client", &self.client.name())
            .field("excluded_forms", &self.excluded_forms)
            .finish()
    }
}

impl LlmAliasClusterer {
    /// Create a clusterer around a completion client
    pub fn new(client: Arc<dyn CompletionClient>, excluded_forms: Vec<String>) -> Self {
        Self {
            client,
            excluded_forms,
        }
    }

    /// Ask the model to group surface forms
    ///
    /// Forms the model invents are kept but logged, since they cannot match
    /// any raw interaction later on.
    pub fn cluster<S: AsRef<str>>(&self, forms: &[S]) -> Result<Vec<AliasCluster>> {
        let prompt = build_alias_prompt(forms, &self.excluded_forms);

        let mut counter = TokenCounter::new();
        counter.tokenize(&prompt.user);
        tracing::debug!(
            client = self.client.name(),
            forms = prompt.forms.len(),
            prompt_tokens = counter.count()?,
            "requesting alias groups"
        );

        let response = self.client.complete(&prompt.system, &prompt.user)?;
        let clusters = clusters_from_response(&response)
            .with_context_lazy(|| format!("alias groups from {}", self.client.name()))?;

        let known: HashSet<&str> = prompt.forms.iter().map(String::as_str).collect();
        for cluster in &clusters {
            for member in cluster.members() {
                if !known.contains(member.as_str()) {
                    tracing::warn!(form = %member, "model returned a form absent from the input");
                }
            }
        }

        Ok(clusters)
    }
}
