//! Incremental ticket and lobby chat transcripts.
//!
//! Both feeds request `?since_id=N` and append whatever comes back. The
//! watermark filter makes overlapping or late replies harmless, so a poll
//! that lands after `stop()` or after a restart never renders a message
//! twice.

use crate::api::ApiEndpoint;
use crate::config::Messages;
use crate::fetch::{ApiClient, ApiTransport, Prompter};
use crate::format::format_timestamp;
use crate::model::{
    ChatMessagesResponse, LobbyId, MessageId, TicketId, TicketMessagesResponse, TicketStatus,
    TranscriptMessage,
};
use crate::page::{ATTR_MESSAGE_ID, CLASS_CHAT_MESSAGE, CLASS_TICKET_MESSAGE, CLASS_TICKET_STATUS};
use crate::view::ViewNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptKind {
    Ticket,
    Chat,
}

impl TranscriptKind {
    #[must_use]
    pub fn message_class(self) -> &'static str {
        match self {
            Self::Ticket => CLASS_TICKET_MESSAGE,
            Self::Chat => CLASS_CHAT_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranscriptFeed {
    watermark: Option<MessageId>,
}

impl TranscriptFeed {
    #[must_use]
    pub fn from_rendered_ids(ids: impl IntoIterator<Item = MessageId>) -> Self {
        Self {
            watermark: ids.into_iter().max(),
        }
    }

    #[must_use]
    pub fn watermark(&self) -> Option<MessageId> {
        self.watermark
    }

    #[must_use]
    pub fn since_id(&self) -> MessageId {
        self.watermark.unwrap_or(0)
    }

    /// Keeps arrival order, drops anything at or below the watermark, and
    /// moves the watermark to the highest id accepted.
    pub fn accept(&mut self, batch: Vec<TranscriptMessage>) -> Vec<TranscriptMessage> {
        let mut accepted = Vec::with_capacity(batch.len());
        for message in batch {
            if self.watermark.is_some_and(|seen| message.id <= seen) {
                tracing::debug!(message_id = message.id, "dropping already rendered message");
                continue;
            }
            self.watermark = Some(message.id);
            accepted.push(message);
        }
        accepted
    }
}

#[must_use]
pub fn render_message(kind: TranscriptKind, message: &TranscriptMessage) -> ViewNode {
    let mut header = ViewNode::new("div").class("message-header");
    if !message.author.is_empty() {
        header = header.child(
            ViewNode::new("span")
                .class("message-author")
                .text(message.author.clone()),
        );
    }
    if !message.timestamp.is_empty() {
        header = header.child(
            ViewNode::new("span")
                .class("message-time")
                .text(format_timestamp(&message.timestamp)),
        );
    }
    ViewNode::new("div")
        .class(kind.message_class())
        .attr(ATTR_MESSAGE_ID, message.id.to_string())
        .child(header)
        .child(
            ViewNode::new("div")
                .class("message-text")
                .text(message.text.clone()),
        )
}

/// Appends the accepted part of `batch` to `container`; returns how many
/// nodes were added.
pub fn append_messages(
    container: &mut ViewNode,
    feed: &mut TranscriptFeed,
    kind: TranscriptKind,
    batch: Vec<TranscriptMessage>,
) -> usize {
    let accepted = feed.accept(batch);
    let count = accepted.len();
    container.children.extend(
        accepted
            .iter()
            .map(|message| render_message(kind, message)),
    );
    count
}

#[must_use]
pub fn render_ticket_status(status: &TicketStatus, messages: &Messages) -> ViewNode {
    ViewNode::new("span")
        .class(CLASS_TICKET_STATUS)
        .class(format!("status-{}", status.as_str()))
        .text(messages.ticket_status_label(status))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketTick {
    pub messages: Vec<TranscriptMessage>,
    pub status: Option<TicketStatus>,
}

pub async fn poll_ticket<T: ApiTransport, P: Prompter>(
    client: &ApiClient<T, P>,
    ticket_id: TicketId,
    feed: &TranscriptFeed,
) -> Option<TicketTick> {
    let request = ApiEndpoint::TicketMessages {
        ticket_id,
        since_id: feed.since_id(),
    }
    .to_request();
    let response: TicketMessagesResponse = client.poll_json(&request).await?;
    if !response.success {
        tracing::warn!(ticket_id, "ticket messages poll reported failure");
        return None;
    }
    Some(TicketTick {
        messages: response.messages,
        status: response.status,
    })
}

pub async fn poll_chat<T: ApiTransport, P: Prompter>(
    client: &ApiClient<T, P>,
    lobby_id: LobbyId,
    feed: &TranscriptFeed,
) -> Option<Vec<TranscriptMessage>> {
    let request = ApiEndpoint::LobbyMessages {
        lobby_id,
        since_id: feed.since_id(),
    }
    .to_request();
    let response: ChatMessagesResponse = client.poll_json(&request).await?;
    if !response.success {
        tracing::warn!(lobby_id, "lobby chat poll reported failure");
        return None;
    }
    Some(response.messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: MessageId) -> TranscriptMessage {
        TranscriptMessage {
            id,
            text: format!("message {id}"),
            timestamp: "2024-03-07T18:22:01".to_string(),
            author: "support".to_string(),
        }
    }

    fn ids(messages: &[TranscriptMessage]) -> Vec<MessageId> {
        messages.iter().map(|message| message.id).collect()
    }

    #[test]
    fn seeds_watermark_from_rendered_ids() {
        let feed = TranscriptFeed::from_rendered_ids([4, 9, 2]);
        assert_eq!(feed.since_id(), 9);
        assert_eq!(TranscriptFeed::from_rendered_ids(std::iter::empty()).since_id(), 0);
    }

    #[test]
    fn overlapping_replies_render_each_message_once() {
        let mut feed = TranscriptFeed::from_rendered_ids([10]);

        let first = feed.accept(vec![message(9), message(10), message(11), message(12)]);
        let second = feed.accept(vec![message(12), message(13)]);

        assert_eq!(ids(&first), vec![11, 12]);
        assert_eq!(ids(&second), vec![13]);
        assert_eq!(feed.watermark(), Some(13));
    }

    #[test]
    fn watermark_never_moves_backwards() {
        let mut feed = TranscriptFeed::default();
        feed.accept(vec![message(5)]);
        let stale = feed.accept(vec![message(3), message(4)]);

        assert!(stale.is_empty());
        assert_eq!(feed.since_id(), 5);
    }

    #[test]
    fn out_of_order_batch_keeps_arrival_order() {
        let mut feed = TranscriptFeed::default();
        let accepted = feed.accept(vec![message(7), message(6), message(8)]);
        assert_eq!(ids(&accepted), vec![7, 8]);
        assert_eq!(feed.watermark(), Some(8));
    }

    #[test]
    fn append_renders_message_nodes() {
        let mut container = ViewNode::new("div");
        let mut feed = TranscriptFeed::default();

        let added = append_messages(
            &mut container,
            &mut feed,
            TranscriptKind::Chat,
            vec![message(1), message(2)],
        );

        assert_eq!(added, 2);
        let nodes = container.find_all_by_class(CLASS_CHAT_MESSAGE);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].data("message-id"), Some("2"));
        let time = nodes[0].find_by_class("message-time").map(ViewNode::text_content);
        assert_eq!(time.as_deref(), Some("07.03.2024 18:22"));
    }

    #[test]
    fn ticket_status_badge_uses_status_class() {
        let badge = render_ticket_status(&TicketStatus::InProgress, &Messages::default());
        assert!(badge.has_class(CLASS_TICKET_STATUS));
        assert!(badge.has_class("status-in_progress"));
        assert_eq!(badge.text_content(), "In progress");
    }

    #[test]
    fn ticket_status_badge_uses_configured_label() {
        let mut messages = Messages::default();
        messages
            .ticket_status_labels
            .insert("resolved".to_string(), "Решён".to_string());

        let badge = render_ticket_status(&TicketStatus::Resolved, &messages);
        assert!(badge.has_class("status-resolved"));
        assert_eq!(badge.text_content(), "Решён");
    }
}
