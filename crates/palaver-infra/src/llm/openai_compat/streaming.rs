//! Chunk-by-chunk translation of a chat-completions SSE response.

use futures_util::StreamExt;

use async_openai::types::chat::{ChatCompletionResponseStream, FinishReason};

use palaver_core::llm::provider::EventStream;
use palaver_types::llm::{LlmError, StopReason, StreamEvent, Usage};

/// Yields `Connected`, then a `TextDelta` per non-empty content piece, a
/// `MessageDelta` once a finish reason shows up, `Usage` from the trailing
/// usage chunk, and finally `Done`. A transport error is yielded as
/// `LlmError::Stream` and ends the stream.
pub fn map_openai_stream(stream: ChatCompletionResponseStream) -> EventStream {
    Box::pin(async_stream::try_stream! {
        yield StreamEvent::Connected;

        let mut stream = stream;

        while let Some(result) = stream.next().await {
            let chunk = result.map_err(|e| LlmError::Stream(e.to_string()))?;

            for choice in &chunk.choices {
                if let Some(text) = choice.delta.content.as_ref().filter(|t| !t.is_empty()) {
                    yield StreamEvent::TextDelta { text: text.clone() };
                }

                if let Some(finish_reason) = choice.finish_reason.as_ref() {
                    yield StreamEvent::MessageDelta {
                        stop_reason: map_finish_reason(finish_reason),
                    };
                }
            }

            // The final chunk carries usage with an empty choices array.
            if let Some(usage) = chunk.usage.as_ref() {
                yield StreamEvent::Usage(Usage {
                    input_tokens: usage.prompt_tokens,
                    output_tokens: usage.completion_tokens,
                });
            }
        }

        yield StreamEvent::Done;
    })
}

/// Translate an OpenAI finish reason into a [`StopReason`].
pub(crate) fn map_finish_reason(reason: &FinishReason) -> StopReason {
    match reason {
        FinishReason::Stop => StopReason::EndTurn,
        FinishReason::Length => StopReason::MaxTokens,
        FinishReason::ContentFilter => StopReason::ContentFilter,
        // Tools are never offered; treat a stray tool stop as a normal end.
        FinishReason::ToolCalls | FinishReason::FunctionCall => StopReason::EndTurn,
    }
}
