use super::*;

use arena_client_core::{ApiError, ApiRequest, ApiResponse, ApiTransport, HttpMethod, Prompter};
use async_trait::async_trait;
use gloo_net::http::Request;

/// `fetch` transport rooted at the configured API base.
pub(super) struct GlooTransport {
    api_base: String,
}

impl GlooTransport {
    pub(super) fn new(api_base: String) -> Self {
        Self { api_base }
    }
}

#[async_trait(?Send)]
impl ApiTransport for GlooTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = request.url(&self.api_base);
        let request_builder = match request.method {
            HttpMethod::Get => Request::get(&url),
            HttpMethod::Post => Request::post(&url),
        }
        .header("content-type", "application/json");

        let response = if let Some(body) = request.body.as_ref() {
            let body = serde_json::to_string(body).map_err(|error| {
                ApiError::Request(format!("failed to serialize request body: {error}"))
            })?;
            request_builder
                .body(body)
                .map_err(|error| ApiError::Request(format!("failed to build request: {error}")))?
                .send()
                .await
                .map_err(map_network_error)?
        } else {
            request_builder.send().await.map_err(map_network_error)?
        };

        let status = response.status();
        let body = response.text().await.map_err(map_network_error)?;
        Ok(ApiResponse { status, body })
    }
}

pub(super) fn map_network_error(error: gloo_net::Error) -> ApiError {
    ApiError::Network(error.to_string())
}

/// `window.alert` / `window.confirm`. Without a window, alerts are logged
/// and confirmations are declined.
pub(super) struct BrowserPrompter;

impl Prompter for BrowserPrompter {
    fn alert(&self, message: &str) {
        let Some(window) = web_sys::window() else {
            tracing::warn!(message, "alert without a window");
            return;
        };
        if window.alert_with_message(message).is_err() {
            tracing::warn!(message, "window.alert failed");
        }
    }

    fn confirm(&self, message: &str) -> bool {
        web_sys::window()
            .and_then(|window| window.confirm_with_message(message).ok())
            .unwrap_or(false)
    }
}

pub(super) fn build_client(config: &ClientConfig) -> BrowserClient {
    ApiClient::new(
        GlooTransport::new(config.api_base.clone()),
        BrowserPrompter,
        config.messages.clone(),
    )
}

/// Writes `text` to the clipboard, then shows the "copied" alert.
pub(super) async fn copy_text(text: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let promise = window.navigator().clipboard().write_text(text);
    match wasm_bindgen_futures::JsFuture::from(promise).await {
        Ok(_) => {
            let copied = config_snapshot().messages.copied;
            BrowserPrompter.alert(&copied);
        }
        Err(error) => {
            tracing::warn!(error = ?error, "clipboard write failed");
        }
    }
}

pub(super) fn reload_page() {
    if let Some(window) = web_sys::window() {
        if window.location().reload().is_err() {
            tracing::warn!("location.reload failed");
        }
    }
}

pub(super) fn navigate_to(target: &str) {
    if let Some(window) = web_sys::window() {
        if window.location().set_href(target).is_err() {
            tracing::warn!(url = target, "navigation failed");
        }
    }
}
