//! A single logical conversation with the model.
//!
//! `ChatSession` owns the in-memory history and the provider. Each `send`
//! submits the whole history plus the new prompt, drains the reply, and on
//! success appends the user/assistant pair to the history. Failed or empty
//! turns leave the history untouched so the next request carries the same
//! context.

use std::time::{Duration, Instant};

use futures_util::StreamExt;
use tracing::{debug, warn};

use palaver_types::chat::{ChatHistory, ChatMessage, MessageRole};
use palaver_types::llm::{CompletionRequest, LlmError, Message, StopReason, StreamEvent, Usage};

use crate::llm::box_provider::BoxLlmProvider;

/// Request settings applied to every turn.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f64>,
    pub system_prompt: Option<String>,
    /// Use the streaming transport instead of a unary call.
    pub streaming: bool,
    /// Upper bound on events drained for one reply.
    pub max_stream_events: usize,
}

/// A completed reply.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub usage: Usage,
    pub stop_reason: Option<StopReason>,
    pub elapsed: Duration,
    /// The event bound was reached before the end-of-stream sentinel.
    pub truncated: bool,
}

/// Result of one `send`.
#[derive(Debug)]
pub enum SendOutcome {
    /// Non-empty reply; the exchange was appended to the history.
    Reply(Reply),
    /// The model produced no content.
    Empty,
    /// The transport failed; `partial` holds any text received before the error.
    Failed { error: LlmError, partial: String },
}

/// One conversation: provider, options, and accumulated history.
pub struct ChatSession {
    provider: BoxLlmProvider,
    options: SessionOptions,
    history: ChatHistory,
}

impl ChatSession {
    /// Seed a session with previously stored history.
    pub fn new(provider: BoxLlmProvider, options: SessionOptions, history: ChatHistory) -> Self {
        Self {
            provider,
            options,
            history,
        }
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Send one prompt and wait for the full reply.
    ///
    /// `on_delta` sees each streamed chunk as it arrives (the whole text once
    /// for unary calls).
    pub async fn send<F>(&mut self, text: &str, mut on_delta: F) -> SendOutcome
    where
        F: FnMut(&str),
    {
        let user_message = ChatMessage::new(MessageRole::User, text);
        let request = self.build_request(text);
        let start = Instant::now();

        debug!(
            provider = self.provider.name(),
            model = %request.model,
            context_messages = request.messages.len(),
            streaming = self.options.streaming,
            "Sending prompt"
        );

        let drained = if self.options.streaming {
            self.drain_stream(request, &mut on_delta).await
        } else {
            match self.provider.complete(&request).await {
                Ok(response) => {
                    on_delta(&response.content);
                    Ok(Drained {
                        text: response.content,
                        usage: response.usage,
                        stop_reason: Some(response.stop_reason),
                        truncated: false,
                    })
                }
                Err(error) => Err((error, String::new())),
            }
        };

        match drained {
            Err((error, partial)) => {
                warn!(error = %error, partial_len = partial.len(), "Model call failed");
                SendOutcome::Failed { error, partial }
            }
            Ok(drained) if drained.text.is_empty() => {
                warn!("Model returned no content");
                SendOutcome::Empty
            }
            Ok(drained) => {
                self.history.messages.push(user_message);
                self.history.add(MessageRole::Assistant, drained.text.clone());
                SendOutcome::Reply(Reply {
                    text: drained.text,
                    usage: drained.usage,
                    stop_reason: drained.stop_reason,
                    elapsed: start.elapsed(),
                    truncated: drained.truncated,
                })
            }
        }
    }

    /// Read stream events until the end-of-stream sentinel, the end of the
    /// stream, an error, or the event bound.
    async fn drain_stream<F>(
        &self,
        request: CompletionRequest,
        on_delta: &mut F,
    ) -> Result<Drained, (LlmError, String)>
    where
        F: FnMut(&str),
    {
        let mut stream = self.provider.stream(request);
        let mut drained = Drained::default();
        let mut events = 0usize;

        loop {
            if events >= self.options.max_stream_events {
                warn!(
                    limit = self.options.max_stream_events,
                    "Stream event limit reached, keeping partial reply"
                );
                drained.truncated = true;
                break;
            }

            let Some(item) = stream.next().await else {
                break;
            };
            events += 1;

            match item {
                Ok(StreamEvent::Connected) => {}
                Ok(StreamEvent::TextDelta { text }) => {
                    on_delta(&text);
                    drained.text.push_str(&text);
                }
                Ok(StreamEvent::MessageDelta { stop_reason }) => {
                    drained.stop_reason = Some(stop_reason);
                }
                Ok(StreamEvent::Usage(usage)) => drained.usage = usage,
                Ok(StreamEvent::Done) => break,
                Err(error) => return Err((error, drained.text)),
            }
        }

        debug!(
            events,
            chars = drained.text.len(),
            tokens = drained.usage.total(),
            "Stream drained"
        );
        Ok(drained)
    }

    fn build_request(&self, text: &str) -> CompletionRequest {
        let mut messages: Vec<Message> = self
            .history
            .messages
            .iter()
            .map(|m| Message {
                role: m.role,
                content: m.content.clone(),
            })
            .collect();
        messages.push(Message {
            role: MessageRole::User,
            content: text.to_string(),
        });

        CompletionRequest {
            model: self.options.model.clone(),
            messages,
            system: self.options.system_prompt.clone(),
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
            stream: self.options.streaming,
        }
    }
}

#[derive(Default)]
struct Drained {
    text: String,
    usage: Usage,
    stop_reason: Option<StopReason>,
    truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use palaver_types::llm::{CompletionResponse, ProviderCapabilities};

    use crate::llm::provider::{EventStream, LlmProvider};

    type Events = Vec<Result<StreamEvent, LlmError>>;

    enum Script {
        Stream(Events),
        Endless,
        Complete(Result<CompletionResponse, LlmError>),
    }

    struct ScriptedProvider {
        capabilities: ProviderCapabilities,
        scripts: Mutex<VecDeque<Script>>,
        calls: Arc<AtomicUsize>,
        requests: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    impl ScriptedProvider {
        fn new(scripts: Vec<Script>) -> Self {
            Self {
                capabilities: ProviderCapabilities {
                    streaming: true,
                    max_context_tokens: 1_000_000,
                    max_output_tokens: 8_192,
                },
                scripts: Mutex::new(scripts.into()),
                calls: Arc::new(AtomicUsize::new(0)),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn next_script(&self, request: &CompletionRequest) -> Script {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            self.scripts
                .lock()
                .unwrap()
                .pop_front()
                .expect("no script left")
        }
    }

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn capabilities(&self) -> &ProviderCapabilities {
            &self.capabilities
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            match self.next_script(request) {
                Script::Complete(result) => result,
                _ => panic!("expected a unary script"),
            }
        }

        fn stream(
            &self,
            request: CompletionRequest,
        ) -> EventStream {
            match self.next_script(&request) {
                Script::Stream(events) => Box::pin(futures_util::stream::iter(events)),
                Script::Endless => Box::pin(futures_util::stream::repeat_with(|| {
                    Ok(StreamEvent::TextDelta {
                        text: "x".to_string(),
                    })
                })),
                Script::Complete(_) => panic!("expected a stream script"),
            }
        }
    }

    fn options(streaming: bool) -> SessionOptions {
        SessionOptions {
            model: "gemini-1.5-flash".to_string(),
            max_tokens: 1024,
            temperature: None,
            system_prompt: None,
            streaming,
            max_stream_events: 100,
        }
    }

    fn delta(text: &str) -> Result<StreamEvent, LlmError> {
        Ok(StreamEvent::TextDelta {
            text: text.to_string(),
        })
    }

    struct Harness {
        session: ChatSession,
        calls: Arc<AtomicUsize>,
        requests: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    fn harness(scripts: Vec<Script>, streaming: bool, history: ChatHistory) -> Harness {
        let provider = ScriptedProvider::new(scripts);
        let calls = provider.calls.clone();
        let requests = provider.requests.clone();
        Harness {
            session: ChatSession::new(BoxLlmProvider::new(provider), options(streaming), history),
            calls,
            requests,
        }
    }

    #[tokio::test]
    async fn test_stream_concatenates_until_done() {
        let mut h = harness(
            vec![Script::Stream(vec![
                Ok(StreamEvent::Connected),
                delta("Hello, "),
                delta("world"),
                Ok(StreamEvent::MessageDelta {
                    stop_reason: StopReason::EndTurn,
                }),
                Ok(StreamEvent::Usage(Usage {
                    input_tokens: 3,
                    output_tokens: 2,
                })),
                Ok(StreamEvent::Done),
                delta("ignored after sentinel"),
            ])],
            true,
            ChatHistory::new(),
        );

        let mut seen = Vec::new();
        let outcome = h.session.send("hi", |d| seen.push(d.to_string())).await;

        let SendOutcome::Reply(reply) = outcome else {
            panic!("expected a reply");
        };
        assert_eq!(reply.text, "Hello, world");
        assert_eq!(reply.usage.output_tokens, 2);
        assert_eq!(reply.stop_reason, Some(StopReason::EndTurn));
        assert!(!reply.truncated);
        assert_eq!(seen, vec!["Hello, ", "world"]);

        let history = h.session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history.messages[0].role, MessageRole::User);
        assert_eq!(history.messages[0].content, "hi");
        assert_eq!(history.messages[1].role, MessageRole::Assistant);
        assert_eq!(history.messages[1].content, "Hello, world");
    }

    #[tokio::test]
    async fn test_stream_without_sentinel_ends_at_stream_end() {
        let mut h = harness(
            vec![Script::Stream(vec![delta("partial "), delta("answer")])],
            true,
            ChatHistory::new(),
        );
        let outcome = h.session.send("q", |_| {}).await;
        assert!(matches!(outcome, SendOutcome::Reply(ref r) if r.text == "partial answer"));
    }

    #[tokio::test]
    async fn test_empty_stream_is_soft_failure() {
        let mut h = harness(
            vec![Script::Stream(vec![
                Ok(StreamEvent::Connected),
                Ok(StreamEvent::Done),
            ])],
            true,
            ChatHistory::new(),
        );
        let outcome = h.session.send("hello?", |_| {}).await;
        assert!(matches!(outcome, SendOutcome::Empty));
        assert!(h.session.history().is_empty());
    }

    #[tokio::test]
    async fn test_whitespace_reply_is_still_a_reply() {
        let mut h = harness(
            vec![Script::Stream(vec![delta("  \n"), Ok(StreamEvent::Done)])],
            true,
            ChatHistory::new(),
        );
        let outcome = h.session.send("say nothing", |_| {}).await;
        assert!(matches!(outcome, SendOutcome::Reply(ref r) if r.text == "  \n"));
        assert_eq!(h.session.history().len(), 2);
    }

    #[tokio::test]
    async fn test_mid_stream_error_keeps_partial_and_history() {
        let mut h = harness(
            vec![Script::Stream(vec![
                delta("half an "),
                Err(LlmError::Stream("connection reset".to_string())),
                delta("never seen"),
            ])],
            true,
            ChatHistory::new(),
        );
        let outcome = h.session.send("q", |_| {}).await;
        match outcome {
            SendOutcome::Failed { error, partial } => {
                assert_eq!(partial, "half an ");
                assert!(error.to_string().contains("connection reset"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(h.session.history().is_empty());
    }

    #[tokio::test]
    async fn test_event_bound_truncates() {
        let mut h = harness(vec![Script::Endless], true, ChatHistory::new());
        let outcome = h.session.send("loop", |_| {}).await;
        let SendOutcome::Reply(reply) = outcome else {
            panic!("expected a truncated reply");
        };
        assert!(reply.truncated);
        assert_eq!(reply.text.len(), 100);
    }

    #[tokio::test]
    async fn test_unary_reply() {
        let mut h = harness(
            vec![Script::Complete(Ok(CompletionResponse {
                id: "r1".to_string(),
                content: "**bold** answer".to_string(),
                model: "gemini-1.5-flash".to_string(),
                stop_reason: StopReason::EndTurn,
                usage: Usage {
                    input_tokens: 5,
                    output_tokens: 4,
                },
            }))],
            false,
            ChatHistory::new(),
        );
        let mut seen = String::new();
        let outcome = h.session.send("q", |d| seen.push_str(d)).await;
        assert!(matches!(outcome, SendOutcome::Reply(ref r) if r.text == "**bold** answer"));
        assert_eq!(seen, "**bold** answer");
        assert_eq!(h.requests.lock().unwrap()[0].stream, false);
    }

    #[tokio::test]
    async fn test_unary_error() {
        let mut h = harness(
            vec![Script::Complete(Err(LlmError::AuthenticationFailed))],
            false,
            ChatHistory::new(),
        );
        let outcome = h.session.send("q", |_| {}).await;
        assert!(matches!(
            outcome,
            SendOutcome::Failed {
                error: LlmError::AuthenticationFailed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_request_carries_seeded_history() {
        let mut history = ChatHistory::new();
        history.add(MessageRole::User, "my name is Ada");
        history.add(MessageRole::Assistant, "Nice to meet you, Ada.");

        let mut h = harness(
            vec![Script::Stream(vec![delta("Ada"), Ok(StreamEvent::Done)])],
            true,
            history,
        );
        h.session.send("what is my name?", |_| {}).await;

        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
        let requests = h.requests.lock().unwrap();
        let messages = &requests[0].messages;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "my name is Ada");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[2].content, "what is my name?");
        assert_eq!(requests[0].model, "gemini-1.5-flash");
        assert!(requests[0].stream);
    }
}
