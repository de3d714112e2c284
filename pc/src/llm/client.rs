//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, GenerationOptions, LlmError};

/// Stateless LLM client - each call is independent
///
/// Implementations perform exactly one remote exchange per call and never
/// retry; retry policy belongs to the caller.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Send a system + user prompt pair and return the generated text
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let request = CompletionRequest::new(system_prompt, user_prompt, options.clone());
        let response = self.complete(request).await?;
        Ok(response.content)
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::llm::{StopReason, TokenUsage};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::debug;

    /// Mock LLM client for unit tests
    ///
    /// Replays scripted results in order and records every request it sees.
    pub struct MockLlmClient {
        responses: Mutex<VecDeque<Result<String, LlmError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
        call_count: AtomicUsize,
    }

    impl MockLlmClient {
        pub fn new(responses: Vec<Result<String, LlmError>>) -> Self {
            debug!(response_count = %responses.len(), "MockLlmClient::new: called");
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
                call_count: AtomicUsize::new(0),
            }
        }

        /// Client that answers every call with the same text
        pub fn replying(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }

        /// Client whose single call fails with `err`
        pub fn failing(err: LlmError) -> Self {
            Self::new(vec![Err(err)])
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            debug!("MockLlmClient::complete: called");
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);

            let next = self.responses.lock().unwrap().pop_front();
            match next {
                Some(Ok(content)) => Ok(CompletionResponse {
                    content,
                    stop_reason: StopReason::EndTurn,
                    usage: TokenUsage::default(),
                }),
                Some(Err(e)) => Err(e),
                None => {
                    debug!("MockLlmClient::complete: no more mock responses");
                    Err(LlmError::MalformedResponse("No more mock responses".to_string()))
                }
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_client_returns_responses() {
            let client = MockLlmClient::new(vec![Ok("Response 1".to_string()), Ok("Response 2".to_string())]);
            let opts = GenerationOptions::default();

            let resp1 = client.generate("system", "user 1", &opts).await.unwrap();
            assert_eq!(resp1, "Response 1");

            let resp2 = client.generate("system", "user 2", &opts).await.unwrap();
            assert_eq!(resp2, "Response 2");

            assert_eq!(client.call_count(), 2);
            let requests = client.requests();
            assert_eq!(requests[1].user_prompt, "user 2");
        }

        #[tokio::test]
        async fn test_mock_client_scripted_error() {
            let client = MockLlmClient::failing(LlmError::Auth("bad key".to_string()));
            let result = client.generate("s", "u", &GenerationOptions::default()).await;
            assert!(matches!(result, Err(LlmError::Auth(_))));
        }

        #[tokio::test]
        async fn test_mock_client_errors_when_exhausted() {
            let client = MockLlmClient::new(vec![]);
            let result = client.generate("s", "u", &GenerationOptions::default()).await;
            assert!(result.is_err());
        }
    }
}
