use serde::Deserialize;
use serde_json::{Value, json};

use crate::model::{LobbyId, MessageId, TicketId, TicketStatus, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn get(path: String) -> Self {
        Self {
            method: HttpMethod::Get,
            path,
            body: None,
        }
    }

    fn post(path: String, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            path,
            body: Some(body),
        }
    }

    /// Joins `path` onto a base such as `""` or `https://arena.example`.
    #[must_use]
    pub fn url(&self, api_base: &str) -> String {
        format!("{}{}", api_base.trim_end_matches('/'), self.path)
    }
}

/// Every call the client makes against the arena REST API.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiEndpoint {
    LobbyMembers {
        lobby_id: LobbyId,
    },
    LobbyKick {
        lobby_id: LobbyId,
        user_id: UserId,
    },
    LobbyBan {
        lobby_id: LobbyId,
        user_id: UserId,
    },
    LobbyMoveTeam {
        lobby_id: LobbyId,
        user_id: UserId,
        team_number: u8,
    },
    LobbyMessages {
        lobby_id: LobbyId,
        since_id: MessageId,
    },
    LobbySendMessage {
        lobby_id: LobbyId,
        text: String,
    },
    LobbyInvite {
        lobby_id: LobbyId,
    },
    LobbyJoin {
        lobby_id: LobbyId,
        password: Option<String>,
        invite_code: Option<String>,
    },
    TicketMessages {
        ticket_id: TicketId,
        since_id: MessageId,
    },
    TicketSendMessage {
        ticket_id: TicketId,
        text: String,
    },
    TicketUpdateStatus {
        ticket_id: TicketId,
        status: TicketStatus,
    },
    FriendAdd {
        friend_id: UserId,
    },
    FriendRemove {
        friend_id: UserId,
    },
}

impl ApiEndpoint {
    #[must_use]
    pub fn to_request(&self) -> ApiRequest {
        match self {
            Self::LobbyMembers { lobby_id } => {
                ApiRequest::get(format!("/api/lobby/{lobby_id}/members"))
            }
            Self::LobbyKick { lobby_id, user_id } => ApiRequest::post(
                format!("/api/lobby/{lobby_id}/kick"),
                json!({ "user_id": user_id }),
            ),
            Self::LobbyBan { lobby_id, user_id } => ApiRequest::post(
                format!("/api/lobby/{lobby_id}/ban"),
                json!({ "user_id": user_id }),
            ),
            Self::LobbyMoveTeam {
                lobby_id,
                user_id,
                team_number,
            } => ApiRequest::post(
                format!("/api/lobby/{lobby_id}/move-team"),
                json!({ "user_id": user_id, "team_number": team_number }),
            ),
            Self::LobbyMessages { lobby_id, since_id } => {
                ApiRequest::get(format!("/api/lobby/{lobby_id}/messages?since_id={since_id}"))
            }
            Self::LobbySendMessage { lobby_id, text } => ApiRequest::post(
                format!("/api/lobby/{lobby_id}/message"),
                json!({ "message": text }),
            ),
            Self::LobbyInvite { lobby_id } => {
                ApiRequest::get(format!("/api/lobby/{lobby_id}/invite"))
            }
            Self::LobbyJoin {
                lobby_id,
                password,
                invite_code,
            } => {
                let mut body = serde_json::Map::new();
                if let Some(password) = password {
                    body.insert("password".to_string(), Value::String(password.clone()));
                }
                if let Some(invite_code) = invite_code {
                    body.insert(
                        "invite_code".to_string(),
                        Value::String(invite_code.clone()),
                    );
                }
                ApiRequest::post(format!("/api/lobby/{lobby_id}/join"), Value::Object(body))
            }
            Self::TicketMessages {
                ticket_id,
                since_id,
            } => ApiRequest::get(format!(
                "/api/ticket/{ticket_id}/messages?since_id={since_id}"
            )),
            Self::TicketSendMessage { ticket_id, text } => ApiRequest::post(
                format!("/api/ticket/{ticket_id}/message"),
                json!({ "message": text }),
            ),
            Self::TicketUpdateStatus { ticket_id, status } => ApiRequest::post(
                format!("/api/ticket/{ticket_id}/status"),
                json!({ "status": status.as_str() }),
            ),
            Self::FriendAdd { friend_id } => {
                ApiRequest::post("/api/friends/add".to_string(), json!({ "friend_id": friend_id }))
            }
            Self::FriendRemove { friend_id } => ApiRequest::post(
                "/api/friends/remove".to_string(),
                json!({ "friend_id": friend_id }),
            ),
        }
    }
}

/// Raw reply handed back by a transport before any status handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request failed with status {status}")]
    Status {
        status: u16,
        message: Option<String>,
    },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("failed to build request: {0}")]
    Request(String),
}

impl ApiError {
    /// Message supplied by the server in the error body, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

fn error_body_message(raw: &str) -> Option<String> {
    let parsed: ApiErrorBody = serde_json::from_str(raw).ok()?;
    let from_error = match parsed.error {
        Some(Value::String(message)) => Some(message),
        Some(Value::Object(detail)) => detail
            .get("message")
            .and_then(Value::as_str)
            .map(ToString::to_string),
        _ => None,
    };
    from_error
        .or(parsed.message)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
}

pub fn decode_json_response<T: for<'de> Deserialize<'de>>(
    response: &ApiResponse,
) -> Result<T, ApiError> {
    if !(200..=299).contains(&response.status) {
        return Err(ApiError::Status {
            status: response.status,
            message: error_body_message(&response.body),
        });
    }

    serde_json::from_str(&response.body).map_err(|error| ApiError::Decode(error.to_string()))
}
