//! Optional model-assisted review of commit pairs.
//!
//! Runs outside the detection engine; verdicts never depend on it.

pub mod openai;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use tracing::debug;

use crate::config::AiConfig;
use crate::detector::Verdict;
use crate::git::CommitPair;

pub use openai::OpenAiClient;

/// Diff text beyond this many bytes is cut from the prompt.
pub const MAX_DIFF_BYTES: usize = 8 * 1024;

/// AI review errors.
#[derive(Error, Debug)]
pub enum AiError {
    /// Configured provider is not supported.
    #[error("unsupported AI provider '{0}' (only 'openai' is supported)")]
    UnsupportedProvider(String),

    /// No API key configured.
    #[error("AI review requires an API key (set ai.api_key or CADENCE_AI_API_KEY)")]
    MissingApiKey,

    /// Transport failure.
    #[error("request to AI provider failed")]
    Network(#[source] reqwest::Error),

    /// Provider answered with a non-2xx status.
    #[error("AI provider returned HTTP {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Response body did not have the expected shape.
    #[error("invalid response from AI provider: {0}")]
    InvalidResponse(String),
}

/// Trait for chat-style model clients.
pub trait AiClient: Send + Sync {
    /// Model identifier.
    fn model(&self) -> &str;

    /// Sends one system/user prompt pair and returns the reply text.
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, AiError>> + Send + 'a>>;
}

const SYSTEM_PROMPT: &str = "You review git commits for signs of AI or automated generation. \
A rule-based detector has already scored the commit. Reply with a short assessment \
(at most three sentences) stating whether the change looks machine-generated and why.";

/// Produces model assessments for evaluated pairs.
pub struct AiReviewer {
    client: Box<dyn AiClient>,
}

impl AiReviewer {
    /// Wraps an existing client.
    pub fn new(client: Box<dyn AiClient>) -> Self {
        Self { client }
    }

    /// Builds a reviewer from configuration.
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        if !config.provider.eq_ignore_ascii_case("openai") {
            return Err(AiError::UnsupportedProvider(config.provider.clone()));
        }
        if config.api_key.trim().is_empty() {
            return Err(AiError::MissingApiKey);
        }
        Ok(Self::new(Box::new(OpenAiClient::new(
            config.model.clone(),
            config.api_key.clone(),
        ))))
    }

    /// Model used for reviews.
    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Asks the model for an assessment of one pair.
    pub async fn review(&self, pair: &CommitPair, verdict: &Verdict) -> Result<String, AiError> {
        let prompt = build_prompt(pair, verdict);
        debug!(
            commit = pair.current.short_hash(),
            prompt_len = prompt.len(),
            "Requesting AI review"
        );
        let reply = self.client.send_request(SYSTEM_PROMPT, &prompt).await?;
        Ok(reply.trim().to_string())
    }
}

/// User prompt for one pair.
pub fn build_prompt(pair: &CommitPair, verdict: &Verdict) -> String {
    let mut prompt = format!(
        "Commit {hash} by {author}\n\nMessage:\n{message}\n\n\
Additions: {add}\nDeletions: {del}\nFiles changed: {files}\nSeconds since parent: {secs}\n\n",
        hash = pair.current.short_hash(),
        author = pair.current.author,
        message = pair.current.message.trim(),
        add = pair.stats.additions,
        del = pair.stats.deletions,
        files = pair.stats.files_changed,
        secs = pair.time_delta.num_seconds(),
    );

    if verdict.triggered.is_empty() {
        prompt.push_str("Detector: no strategy triggered.\n");
    } else {
        prompt.push_str("Detector findings:\n");
        for t in &verdict.triggered {
            prompt.push_str(&format!("- {}: {}\n", t.name, t.reason));
        }
    }

    if pair.has_diff() {
        let (diff, truncated) = truncate_at_char_boundary(&pair.diff_content, MAX_DIFF_BYTES);
        prompt.push_str("\nDiff:\n");
        prompt.push_str(diff);
        if truncated {
            prompt.push_str("\n[diff truncated]");
        }
        prompt.push('\n');
    }

    prompt
}

fn truncate_at_char_boundary(text: &str, max: usize) -> (&str, bool) {
    if text.len() <= max {
        return (text, false);
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    (&text[..end], true)
}
