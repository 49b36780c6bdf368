//! Conversion of a [`CompletionRequest`] into the chat-completions body.

use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, ChatCompletionStreamOptions,
    CreateChatCompletionRequest,
};

use palaver_types::llm::{CompletionRequest, LlmError, Message, MessageRole};

/// Build the request body. An empty `request.model` falls back to
/// `default_model`; streamed requests ask for a trailing usage chunk.
pub(crate) fn chat_body(
    request: &CompletionRequest,
    default_model: &str,
    stream: bool,
) -> Result<CreateChatCompletionRequest, LlmError> {
    let messages: Vec<ChatCompletionRequestMessage> = request
        .system
        .iter()
        .map(|prompt| system_turn(prompt))
        .chain(request.messages.iter().map(chat_turn))
        .collect();

    if messages.is_empty() {
        return Err(LlmError::InvalidRequest("request has no messages".to_string()));
    }

    let model = Some(request.model.as_str())
        .filter(|m| !m.is_empty())
        .unwrap_or(default_model)
        .to_string();

    Ok(CreateChatCompletionRequest {
        model,
        messages,
        max_completion_tokens: Some(request.max_tokens),
        temperature: request.temperature.map(|t| t as f32),
        stream: stream.then_some(true),
        stream_options: stream.then_some(ChatCompletionStreamOptions {
            include_usage: Some(true),
            include_obfuscation: None,
        }),
        ..Default::default()
    })
}

fn chat_turn(message: &Message) -> ChatCompletionRequestMessage {
    let text = message.content.clone();
    match message.role {
        MessageRole::System => system_turn(&text),
        MessageRole::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(text),
            name: None,
        }),
        #[allow(deprecated)]
        MessageRole::Assistant => {
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(text)),
                refusal: None,
                name: None,
                audio: None,
                tool_calls: None,
                function_call: None,
            })
        }
    }
}

fn system_turn(text: &str) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
        content: ChatCompletionRequestSystemMessageContent::Text(text.to_string()),
        name: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: MessageRole, content: &str) -> Message {
        Message {
            role,
            content: content.to_string(),
        }
    }

    fn request(messages: Vec<Message>, system: Option<&str>) -> CompletionRequest {
        CompletionRequest {
            model: "gemini-1.5-flash".to_string(),
            messages,
            system: system.map(str::to_string),
            max_tokens: 1024,
            temperature: Some(0.7),
            stream: false,
        }
    }

    #[test]
    fn test_system_prompt_leads_the_conversation() {
        let req = request(
            vec![
                turn(MessageRole::User, "Hello"),
                turn(MessageRole::Assistant, "Hi there!"),
                turn(MessageRole::User, "How are you?"),
            ],
            Some("Be brief"),
        );

        let body = chat_body(&req, "unused", false).unwrap();

        assert_eq!(body.model, "gemini-1.5-flash");
        assert_eq!(body.messages.len(), 4);
        assert!(matches!(body.messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(body.messages[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(body.messages[2], ChatCompletionRequestMessage::Assistant(_)));
        assert_eq!(body.max_completion_tokens, Some(1024));
        assert!(body.stream.is_none());
        assert!(body.stream_options.is_none());
    }

    #[test]
    fn test_streamed_body_requests_usage() {
        let req = request(vec![turn(MessageRole::User, "Hello")], None);
        let body = chat_body(&req, "unused", true).unwrap();
        assert_eq!(body.stream, Some(true));
        assert_eq!(body.stream_options.unwrap().include_usage, Some(true));
    }

    #[test]
    fn test_blank_model_uses_default() {
        let mut req = request(vec![turn(MessageRole::User, "Hello")], None);
        req.model.clear();
        let body = chat_body(&req, "gemini-1.5-pro", false).unwrap();
        assert_eq!(body.model, "gemini-1.5-pro");
    }

    #[test]
    fn test_empty_conversation_is_rejected() {
        let err = chat_body(&request(Vec::new(), None), "m", false).unwrap_err();
        assert!(matches!(err, LlmError::InvalidRequest(_)));
    }
}
