//! Classification of `async-openai` failures into [`LlmError`].
//!
//! Gemini's compatibility layer reports some failures with Google status
//! names (`RESOURCE_EXHAUSTED`, `UNAVAILABLE`) instead of OpenAI codes, so
//! both vocabularies are matched.

use async_openai::error::{ApiError, OpenAIError};

use palaver_types::llm::LlmError;

const AUTH_MARKERS: &[&str] = &["authentication_error"];
const AUTH_PHRASES: &[&str] = &["Incorrect API key", "API key not valid"];
const RATE_MARKERS: &[&str] = &["rate_limit_exceeded", "rate_limit_error", "RESOURCE_EXHAUSTED"];
const OVERLOAD_MARKERS: &[&str] = &["server_error", "overloaded_error", "UNAVAILABLE"];

pub(crate) fn map_openai_error(err: OpenAIError) -> LlmError {
    match &err {
        OpenAIError::ApiError(api) => classify_api_error(api).unwrap_or_else(|| LlmError::Provider {
            message: err.to_string(),
        }),
        OpenAIError::Reqwest(http) => match http.status().map(|s| s.as_u16()) {
            Some(401 | 403) => LlmError::AuthenticationFailed,
            Some(429) => LlmError::RateLimited { retry_after_ms: None },
            Some(503 | 529) => LlmError::Overloaded(err.to_string()),
            _ => LlmError::Provider {
                message: err.to_string(),
            },
        },
        OpenAIError::JSONDeserialize(_, body) => {
            LlmError::Deserialization(format!("failed to parse response: {body}"))
        }
        OpenAIError::StreamError(inner) => LlmError::Stream(inner.to_string()),
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}

/// `None` when the error matches no known category.
fn classify_api_error(api: &ApiError) -> Option<LlmError> {
    let tags = [api.code.as_deref(), api.r#type.as_deref()];
    let tagged = |markers: &[&str]| tags.iter().flatten().any(|tag| markers.contains(tag));

    if tagged(AUTH_MARKERS) || AUTH_PHRASES.iter().any(|p| api.message.contains(p)) {
        Some(LlmError::AuthenticationFailed)
    } else if tagged(RATE_MARKERS) {
        Some(LlmError::RateLimited { retry_after_ms: None })
    } else if api.code.as_deref() == Some("context_length_exceeded")
        || api.message.contains("maximum context length")
    {
        Some(LlmError::ContextLengthExceeded)
    } else if tagged(OVERLOAD_MARKERS) {
        Some(LlmError::Overloaded(api.message.clone()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(message: &str, kind: Option<&str>, code: Option<&str>) -> OpenAIError {
        OpenAIError::ApiError(ApiError {
            message: message.to_string(),
            r#type: kind.map(str::to_string),
            param: None,
            code: code.map(str::to_string),
        })
    }

    #[test]
    fn test_gemini_bad_key_message() {
        let err = map_openai_error(api_error(
            "API key not valid. Please pass a valid API key.",
            None,
            None,
        ));
        assert!(matches!(err, LlmError::AuthenticationFailed));
    }

    #[test]
    fn test_rate_limit_by_type_or_google_status() {
        let openai = map_openai_error(api_error("slow down", Some("rate_limit_error"), None));
        let google = map_openai_error(api_error("quota", Some("RESOURCE_EXHAUSTED"), None));
        assert!(matches!(openai, LlmError::RateLimited { .. }));
        assert!(matches!(google, LlmError::RateLimited { .. }));
    }

    #[test]
    fn test_context_length_and_overload() {
        let long = map_openai_error(api_error("too long", None, Some("context_length_exceeded")));
        let busy = map_openai_error(api_error("try later", Some("UNAVAILABLE"), None));
        assert!(matches!(long, LlmError::ContextLengthExceeded));
        assert!(matches!(busy, LlmError::Overloaded(msg) if msg == "try later"));
    }

    #[test]
    fn test_unknown_api_error_is_provider_error() {
        let err = map_openai_error(api_error("odd", Some("mystery"), None));
        assert!(matches!(err, LlmError::Provider { .. }));
    }

    #[test]
    fn test_invalid_argument() {
        let err = map_openai_error(OpenAIError::InvalidArgument("bad arg".to_string()));
        assert!(matches!(err, LlmError::InvalidRequest(_)));
    }
}
