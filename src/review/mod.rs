pub mod prompt;
pub mod types;

pub use types::{Review, Verdict};

use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::Settings;
use crate::llm::{ChatMessage, CompletionModel, LlmError};
use crate::pr::PullRequest;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Model call failed: {0}")]
    Llm(#[from] LlmError),
}

/// Map the model's free-text reply to a verdict.
///
/// Case-insensitive substring match, checked in order: "approve" wins over
/// "request changes", anything else is a plain comment. Incidental matches
/// such as "I cannot approve this" still count as APPROVE.
pub fn classify(reply: &str) -> Verdict {
    let reply = reply.to_lowercase();
    if reply.contains("approve") {
        Verdict::Approve
    } else if reply.contains("request changes") {
        Verdict::RequestChanges
    } else {
        Verdict::Comment
    }
}

pub fn estimate_cost(total_tokens: u64, price_per_token: f64) -> f64 {
    total_tokens as f64 * price_per_token
}

/// Body posted to the PR: the reply followed by the cost line.
pub fn render_body(reply: &str, cost: f64, currency: &str) -> String {
    format!("Review from GPT\n\n{reply}\n\nReview costs\n\n{cost} {currency}")
}

/// Turns a PullRequest into a [`Review`] using a completion model.
pub struct Reviewer<'a, M: CompletionModel> {
    model: &'a M,
    price_per_token: f64,
    currency: String,
}

impl<'a, M: CompletionModel> Reviewer<'a, M> {
    pub fn new(model: &'a M, settings: &Settings) -> Self {
        Self {
            model,
            price_per_token: settings.price_per_token,
            currency: settings.currency.clone(),
        }
    }

    #[instrument(skip(self, pr), fields(pr = pr.number))]
    pub async fn review(&self, pr: &PullRequest) -> Result<Review, ReviewError> {
        let document = prompt::build_prompt(pr);
        debug!(prompt_bytes = document.len(), "assembled review prompt");

        let messages = vec![
            ChatMessage::system(prompt::SYSTEM_PROMPT),
            ChatMessage::user(prompt::user_message(&document)),
        ];
        let completion = self.model.complete(messages).await?;

        let reply = completion.content.trim();
        let verdict = classify(reply);
        let cost = estimate_cost(completion.total_tokens, self.price_per_token);
        debug!(%verdict, total_tokens = completion.total_tokens, cost, "classified reply");

        Ok(Review {
            verdict,
            body: render_body(reply, cost, &self.currency),
            cost,
            total_tokens: completion.total_tokens,
        })
    }
}
