//! Hint requester.

use super::level::ClueLevel;
use super::prompt::build_prompt;
use super::transport::{Transport, TransportResponse};
use super::wire::{ErrorResponse, GenerateRequest, GenerateResponse};
use crate::error::HintError;
use tracing::{debug, info, warn};

/// Issues one generation request per hint.
///
/// The client holds no credential; it posts to whatever endpoint it is
/// given, normally the local proxy started by `cluekit serve`.
#[derive(Debug, Clone)]
pub struct HintClient<T> {
    transport: T,
    endpoint: String,
}

impl<T: Transport> HintClient<T> {
    /// Creates a client posting to `endpoint` through `transport`.
    pub fn new(transport: T, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    /// Returns the configured endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Requests a hint for `problem` at `level`.
    ///
    /// Empty or whitespace-only problems are rejected before any network
    /// call. No retries are made.
    ///
    /// # Errors
    ///
    /// - [`HintError::Validation`] for an empty problem
    /// - [`HintError::RemoteService`] for a non-2xx status
    /// - [`HintError::MalformedResponse`] for an unexpected success body
    /// - [`HintError::Transport`] for network failures
    pub fn request(&self, problem: &str, level: ClueLevel) -> Result<String, HintError> {
        let problem = problem.trim();
        if problem.is_empty() {
            return Err(HintError::Validation);
        }

        let prompt = build_prompt(level, problem);
        let body = serde_json::to_value(GenerateRequest::user_prompt(prompt))
            .map_err(|e| HintError::MalformedResponse(format!("request encoding: {e}")))?;

        info!(%level, endpoint = %self.endpoint, "requesting hint");
        let response = self.transport.post_json(&self.endpoint, &body)?;
        parse_response(&response)
    }
}

/// Maps a completed exchange onto the hint text or an error.
fn parse_response(response: &TransportResponse) -> Result<String, HintError> {
    if !response.is_success() {
        let message = serde_json::from_str::<ErrorResponse>(&response.body)
            .ok()
            .and_then(|e| e.error.message)
            .unwrap_or_else(|| fallback_message(&response.body));
        warn!(status = response.status, %message, "hint request failed upstream");
        return Err(HintError::RemoteService {
            status: response.status,
            message,
        });
    }

    let parsed: GenerateResponse = serde_json::from_str(&response.body).map_err(|e| {
        debug!(body = %response.body, "unparseable generation response");
        HintError::MalformedResponse(e.to_string())
    })?;

    parsed.first_text().map(str::to_string).ok_or_else(|| {
        debug!(body = %response.body, "generation response without text");
        HintError::MalformedResponse("missing candidates[0].content.parts[0].text".to_string())
    })
}

fn fallback_message(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        "API request failed".to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Scripted transport recording every call.
    struct ScriptedTransport {
        reply: std::result::Result<TransportResponse, HintError>,
        calls: Cell<usize>,
        last_body: RefCell<Option<serde_json::Value>>,
    }

    impl ScriptedTransport {
        fn replying(status: u16, body: &str) -> Self {
            Self {
                reply: Ok(TransportResponse {
                    status,
                    body: body.to_string(),
                }),
                calls: Cell::new(0),
                last_body: RefCell::new(None),
            }
        }

        fn failing(reason: &str) -> Self {
            Self {
                reply: Err(HintError::Transport(reason.to_string())),
                calls: Cell::new(0),
                last_body: RefCell::new(None),
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn post_json(
            &self,
            _url: &str,
            body: &serde_json::Value,
        ) -> std::result::Result<TransportResponse, HintError> {
            self.calls.set(self.calls.get() + 1);
            *self.last_body.borrow_mut() = Some(body.clone());
            self.reply.clone()
        }
    }

    const OK_BODY: &str = r#"{"candidates":[{"content":{"parts":[{"text":"Think about **sorting**."}]}}]}"#;

    #[test]
    fn test_success() {
        let client = HintClient::new(ScriptedTransport::replying(200, OK_BODY), "http://proxy");
        let hint = client.request("  Sort the array.  ", ClueLevel::HighLevel).unwrap();
        assert_eq!(hint, "Think about **sorting**.");
        assert_eq!(client.transport().calls.get(), 1);

        let body = client.transport().last_body.borrow().clone().unwrap();
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.starts_with(ClueLevel::HighLevel.instruction()));
        assert!(text.contains("Problem:\nSort the array.\n\nClue:"));
        assert_eq!(body["contents"][0]["role"], "user");
    }

    #[test]
    fn test_empty_problem_never_calls_transport() {
        let client = HintClient::new(ScriptedTransport::replying(200, OK_BODY), "http://proxy");
        for problem in ["", "   ", "\n\t"] {
            assert_eq!(
                client.request(problem, ClueLevel::Generic),
                Err(HintError::Validation)
            );
        }
        assert_eq!(client.transport().calls.get(), 0);
    }

    proptest::proptest! {
        #[test]
        fn whitespace_problem_makes_no_call(problem in "[ \t\r\n]{0,24}") {
            let client = HintClient::new(ScriptedTransport::replying(200, OK_BODY), "http://proxy");
            for level in ClueLevel::ALL {
                proptest::prop_assert_eq!(client.request(&problem, level), Err(HintError::Validation));
            }
            proptest::prop_assert_eq!(client.transport().calls.get(), 0);
        }
    }

    #[test]
    fn test_remote_error_uses_upstream_message() {
        let client = HintClient::new(
            ScriptedTransport::replying(400, r#"{"error":{"code":400,"message":"API key not valid"}}"#),
            "http://proxy",
        );
        assert_eq!(
            client.request("p", ClueLevel::Generic),
            Err(HintError::RemoteService {
                status: 400,
                message: "API key not valid".to_string()
            })
        );
    }

    #[test]
    fn test_remote_error_with_plain_body() {
        let client = HintClient::new(ScriptedTransport::replying(502, "Bad Gateway"), "http://proxy");
        assert_eq!(
            client.request("p", ClueLevel::Generic),
            Err(HintError::RemoteService {
                status: 502,
                message: "Bad Gateway".to_string()
            })
        );

        let client = HintClient::new(ScriptedTransport::replying(500, ""), "http://proxy");
        let err = client.request("p", ClueLevel::Generic).unwrap_err();
        assert!(err.to_string().contains("API request failed"));
    }

    #[test]
    fn test_malformed_success_bodies() {
        for body in ["not json", r#"{"candidates":[]}"#, r#"{"candidates":[{"content":{"parts":[]}}]}"#] {
            let client = HintClient::new(ScriptedTransport::replying(200, body), "http://proxy");
            assert!(matches!(
                client.request("p", ClueLevel::Generic),
                Err(HintError::MalformedResponse(_))
            ));
        }
    }

    #[test]
    fn test_transport_failure_is_terminal() {
        let client = HintClient::new(ScriptedTransport::failing("connection reset"), "http://proxy");
        assert_eq!(
            client.request("p", ClueLevel::Generic),
            Err(HintError::Transport("connection reset".to_string()))
        );
        assert_eq!(client.transport().calls.get(), 1);
    }
}
