use async_trait::async_trait;
use serde::Deserialize;

use crate::api::{ApiError, ApiRequest, ApiResponse, decode_json_response};
use crate::config::Messages;

/// Sends one JSON request. Implementations only report transport-level
/// failures; status handling happens in [`ApiClient`].
#[async_trait(?Send)]
pub trait ApiTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// Blocking user prompts (`window.alert` / `window.confirm` in the browser).
pub trait Prompter {
    fn alert(&self, message: &str);
    fn confirm(&self, message: &str) -> bool;
}

pub struct ApiClient<T, P> {
    transport: T,
    prompter: P,
    messages: Messages,
}

impl<T: ApiTransport, P: Prompter> ApiClient<T, P> {
    pub fn new(transport: T, prompter: P, messages: Messages) -> Self {
        Self {
            transport,
            prompter,
            messages,
        }
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    pub async fn request_json<R: for<'de> Deserialize<'de>>(
        &self,
        request: &ApiRequest,
    ) -> Result<R, ApiError> {
        let response = self.transport.send(request).await?;
        decode_json_response(&response)
    }

    /// Returns the decoded body on success. On any failure logs, shows the
    /// generic error alert exactly once, and returns `None`.
    pub async fn fetch_json<R: for<'de> Deserialize<'de>>(&self, request: &ApiRequest) -> Option<R> {
        match self.request_json(request).await {
            Ok(body) => Some(body),
            Err(error) => {
                tracing::error!(
                    method = request.method.as_str(),
                    path = %request.path,
                    error = %error,
                    "api request failed"
                );
                self.prompter.alert(&self.messages.generic_error);
                None
            }
        }
    }

    /// Poll variant of [`Self::fetch_json`]: failures are logged only.
    pub async fn poll_json<R: for<'de> Deserialize<'de>>(&self, request: &ApiRequest) -> Option<R> {
        match self.request_json(request).await {
            Ok(body) => Some(body),
            Err(error) => {
                tracing::warn!(path = %request.path, error = %error, "poll request failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiEndpoint;
    use crate::model::CommandReply;
    use std::cell::RefCell;

    struct FixedTransport(Result<ApiResponse, ApiError>);

    #[async_trait(?Send)]
    impl ApiTransport for FixedTransport {
        async fn send(&self, _request: &ApiRequest) -> Result<ApiResponse, ApiError> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct CountingPrompter {
        alerts: RefCell<Vec<String>>,
    }

    impl Prompter for CountingPrompter {
        fn alert(&self, message: &str) {
            self.alerts.borrow_mut().push(message.to_string());
        }

        fn confirm(&self, _message: &str) -> bool {
            true
        }
    }

    fn client(result: Result<ApiResponse, ApiError>) -> ApiClient<FixedTransport, CountingPrompter> {
        ApiClient::new(
            FixedTransport(result),
            CountingPrompter::default(),
            Messages::default(),
        )
    }

    #[tokio::test]
    async fn fetch_json_returns_body_on_success() {
        let client = client(Ok(ApiResponse {
            status: 200,
            body: r#"{"success":true}"#.to_string(),
        }));
        let request = ApiEndpoint::FriendAdd { friend_id: 1 }.to_request();

        let reply: Option<CommandReply> = client.fetch_json(&request).await;

        assert!(reply.is_some_and(|reply| reply.success));
        assert!(client.prompter().alerts.borrow().is_empty());
    }

    #[tokio::test]
    async fn fetch_json_alerts_once_on_network_failure() {
        let client = client(Err(ApiError::Network("offline".to_string())));
        let request = ApiEndpoint::FriendAdd { friend_id: 1 }.to_request();

        let reply: Option<CommandReply> = client.fetch_json(&request).await;

        assert!(reply.is_none());
        assert_eq!(
            client.prompter().alerts.borrow().as_slice(),
            ["Server request failed"]
        );
    }

    #[tokio::test]
    async fn fetch_json_alerts_once_on_error_status() {
        let client = client(Ok(ApiResponse {
            status: 500,
            body: String::new(),
        }));
        let request = ApiEndpoint::LobbyMembers { lobby_id: 1 }.to_request();

        let reply: Option<CommandReply> = client.fetch_json(&request).await;

        assert!(reply.is_none());
        assert_eq!(client.prompter().alerts.borrow().len(), 1);
    }

    #[tokio::test]
    async fn poll_json_is_silent_on_failure() {
        let client = client(Err(ApiError::Network("offline".to_string())));
        let request = ApiEndpoint::LobbyMembers { lobby_id: 1 }.to_request();

        let reply: Option<CommandReply> = client.poll_json(&request).await;

        assert!(reply.is_none());
        assert!(client.prompter().alerts.borrow().is_empty());
    }
}
