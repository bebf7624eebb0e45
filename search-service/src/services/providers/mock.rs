//! Mock provider implementation for testing.

use super::{Completion, CompletionProvider, CompletionRequest, ProviderError};
use async_trait::async_trait;
use std::sync::Mutex;

enum MockOutcome {
    Answer(Option<String>),
    Fail(String),
}

/// Mock completion provider that replies with a canned outcome and keeps
/// every request it was sent.
pub struct MockCompletionProvider {
    outcome: MockOutcome,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionProvider {
    pub fn answering(answer: impl Into<String>) -> Self {
        Self::with_outcome(MockOutcome::Answer(Some(answer.into())))
    }

    /// Simulates a response without usable choice content.
    pub fn without_content() -> Self {
        Self::with_outcome(MockOutcome::Answer(None))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_outcome(MockOutcome::Fail(message.into()))
    }

    fn with_outcome(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        match &self.outcome {
            MockOutcome::Answer(content) => Ok(Completion {
                content: content.clone(),
            }),
            MockOutcome::Fail(message) => Err(ProviderError::Api(message.clone())),
        }
    }
}
