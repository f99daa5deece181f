use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, VecDeque};

use arena_client_core::lobby::rendered_member_ids;
use arena_client_core::page::{
    ATTR_ACTION, ATTR_FRIEND_ACTION, ATTR_USER_ID, CLASS_MEMBER_ITEM, CLASS_MEMBERS_LIST,
    CLASS_TEAM_SECTION,
};
use arena_client_core::transcript::append_messages;
use arena_client_core::{
    ActionEffect, ApiClient, ApiError, ApiRequest, ApiResponse, ApiTransport, DataAttributes,
    HttpMethod, LobbyMode, Messages, Prompter, TicketStatus, TranscriptFeed, TranscriptKind,
    UserCommand, ViewNode, Viewer, handle_input, poll_chat, poll_lobby, poll_ticket,
    reconcile_members, run_command,
};
use async_trait::async_trait;
use serde_json::{Value, json};

#[derive(Default)]
struct ScriptedTransport {
    replies: RefCell<VecDeque<Result<ApiResponse, ApiError>>>,
    sent: RefCell<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    fn reply(self, status: u16, body: Value) -> Self {
        self.replies.borrow_mut().push_back(Ok(ApiResponse {
            status,
            body: body.to_string(),
        }));
        self
    }

    fn fail(self, error: ApiError) -> Self {
        self.replies.borrow_mut().push_back(Err(error));
        self
    }
}

#[async_trait(?Send)]
impl ApiTransport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.sent.borrow_mut().push(request.clone());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("no scripted reply".to_string())))
    }
}

struct RecordingPrompter {
    alerts: RefCell<Vec<String>>,
    confirms: Cell<usize>,
    answer: bool,
}

impl RecordingPrompter {
    fn answering(answer: bool) -> Self {
        Self {
            alerts: RefCell::new(Vec::new()),
            confirms: Cell::new(0),
            answer,
        }
    }
}

impl Prompter for RecordingPrompter {
    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }

    fn confirm(&self, _message: &str) -> bool {
        self.confirms.set(self.confirms.get() + 1);
        self.answer
    }
}

type TestClient = ApiClient<ScriptedTransport, RecordingPrompter>;

fn client(transport: ScriptedTransport, confirm: bool) -> TestClient {
    ApiClient::new(
        transport,
        RecordingPrompter::answering(confirm),
        Messages::default(),
    )
}

fn sent(client: &TestClient) -> Vec<ApiRequest> {
    client.transport().sent.borrow().clone()
}

fn alerts(client: &TestClient) -> Vec<String> {
    client.prompter().alerts.borrow().clone()
}

fn kick_control(user_id: &str) -> DataAttributes {
    DataAttributes::new()
        .with(ATTR_ACTION, "kick")
        .with(ATTR_USER_ID, user_id)
}

#[tokio::test]
async fn lobby_tick_renders_fetched_members() -> anyhow::Result<()> {
    let transport = ScriptedTransport::default().reply(
        200,
        json!({
            "success": true,
            "status": "open",
            "mode": "2x2",
            "members": [
                {"user_id": 1, "username": "alice", "level": 4, "ggp": 1500, "team_number": 1, "is_creator": true},
                {"user_id": 2, "username": "bob", "team_number": 2},
                {"user_id": 3, "username": "carol", "team_number": 7}
            ]
        }),
    );
    let client = client(transport, true);

    let snapshot = poll_lobby(&client, 4)
        .await
        .ok_or_else(|| anyhow::anyhow!("expected a lobby snapshot"))?;
    assert_eq!(snapshot.mode, LobbyMode::TwoVsTwo);

    let mut list = ViewNode::new("div").class(CLASS_MEMBERS_LIST);
    let viewer = Viewer {
        user_id: Some(1),
        is_creator: true,
    };
    let report = reconcile_members(&mut list, &snapshot, &viewer, client.messages());

    assert_eq!(report.added, vec![1, 2, 3]);
    assert_eq!(rendered_member_ids(&list), BTreeSet::from([1, 2, 3]));
    assert_eq!(sent(&client)[0].path, "/api/lobby/4/members");
    Ok(())
}

#[tokio::test]
async fn lobby_tick_without_status_renders_single_team() -> anyhow::Result<()> {
    let transport = ScriptedTransport::default().reply(
        200,
        json!({
            "success": true,
            "members": [{"user_id": 1, "username": "alice", "team_number": 1}],
            "mode": "2x2"
        }),
    );
    let client = client(transport, true);

    let snapshot = poll_lobby(&client, 4)
        .await
        .ok_or_else(|| anyhow::anyhow!("expected a lobby snapshot"))?;
    assert_eq!(snapshot.status, None);

    let mut list = ViewNode::new("div").class(CLASS_MEMBERS_LIST);
    let viewer = Viewer {
        user_id: Some(1),
        is_creator: true,
    };
    reconcile_members(&mut list, &snapshot, &viewer, client.messages());

    let sections = list.find_all_by_class(CLASS_TEAM_SECTION);
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].data("team-number"), Some("1"));
    let members: Vec<_> = sections[0]
        .find_all_by_class(CLASS_MEMBER_ITEM)
        .into_iter()
        .filter_map(|node| node.data("user-id"))
        .collect();
    assert_eq!(members, vec!["1"]);
    Ok(())
}

#[tokio::test]
async fn failed_lobby_tick_is_quiet_and_leaves_view_alone() {
    let transport = ScriptedTransport::default()
        .fail(ApiError::Network("offline".to_string()))
        .reply(200, json!({"success": false, "status": "open", "mode": "1x1"}));
    let client = client(transport, true);

    assert!(poll_lobby(&client, 4).await.is_none());
    assert!(poll_lobby(&client, 4).await.is_none());
    assert!(alerts(&client).is_empty());
}

#[tokio::test]
async fn ticket_ticks_request_since_watermark_and_skip_overlap() -> anyhow::Result<()> {
    let transport = ScriptedTransport::default()
        .reply(
            200,
            json!({
                "success": true,
                "status": "in_progress",
                "messages": [
                    {"id": 11, "message": "hi", "created_at": "2024-03-07T18:22:01", "username": "support"},
                    {"id": 12, "message": "more", "created_at": "2024-03-07T18:23:01", "username": "support"}
                ]
            }),
        )
        .reply(
            200,
            json!({
                "success": true,
                "status": "in_progress",
                "messages": [{"id": 12, "message": "more"}, {"id": 13, "message": "done"}]
            }),
        );
    let client = client(transport, true);
    let mut feed = TranscriptFeed::from_rendered_ids([10]);
    let mut transcript = ViewNode::new("div").class("ticket-messages");

    let first = poll_ticket(&client, 3, &feed)
        .await
        .ok_or_else(|| anyhow::anyhow!("first tick"))?;
    assert_eq!(first.status, Some(TicketStatus::InProgress));
    append_messages(&mut transcript, &mut feed, TranscriptKind::Ticket, first.messages);

    let second = poll_ticket(&client, 3, &feed)
        .await
        .ok_or_else(|| anyhow::anyhow!("second tick"))?;
    append_messages(&mut transcript, &mut feed, TranscriptKind::Ticket, second.messages);

    let rendered: Vec<_> = transcript
        .find_all_by_class("ticket-message")
        .into_iter()
        .filter_map(|node| node.data("message-id"))
        .collect();
    assert_eq!(rendered, vec!["11", "12", "13"]);

    let paths: Vec<_> = sent(&client).into_iter().map(|request| request.path).collect();
    assert_eq!(
        paths,
        vec![
            "/api/ticket/3/messages?since_id=10",
            "/api/ticket/3/messages?since_id=12"
        ]
    );
    Ok(())
}

#[tokio::test]
async fn chat_tick_uses_lobby_messages_endpoint() -> anyhow::Result<()> {
    let transport = ScriptedTransport::default().reply(
        200,
        json!({"success": true, "messages": [{"id": 1, "message": "gl hf", "username": "bob"}]}),
    );
    let client = client(transport, true);
    let feed = TranscriptFeed::default();

    let messages = poll_chat(&client, 9, &feed)
        .await
        .ok_or_else(|| anyhow::anyhow!("chat tick"))?;

    assert_eq!(messages.len(), 1);
    assert_eq!(sent(&client)[0].path, "/api/lobby/9/messages?since_id=0");
    Ok(())
}

#[tokio::test]
async fn unrendered_chat_batch_is_requested_again() -> anyhow::Result<()> {
    let transport = ScriptedTransport::default()
        .reply(200, json!({"success": true, "messages": [{"id": 5, "message": "gl"}]}))
        .reply(200, json!({"success": true, "messages": [{"id": 5, "message": "gl"}]}));
    let client = client(transport, true);
    let mut feed = TranscriptFeed::from_rendered_ids([4]);

    // Nowhere to render: the batch is dropped and the feed is not touched.
    poll_chat(&client, 9, &feed)
        .await
        .ok_or_else(|| anyhow::anyhow!("first chat tick"))?;
    assert_eq!(feed.watermark(), Some(4));

    let batch = poll_chat(&client, 9, &feed)
        .await
        .ok_or_else(|| anyhow::anyhow!("second chat tick"))?;
    let mut transcript = ViewNode::new("div").class("chat-messages");
    let added = append_messages(&mut transcript, &mut feed, TranscriptKind::Chat, batch);

    let paths: Vec<_> = sent(&client).into_iter().map(|request| request.path).collect();
    assert_eq!(
        paths,
        vec!["/api/lobby/9/messages?since_id=4", "/api/lobby/9/messages?since_id=4"]
    );
    assert_eq!(added, 1);
    assert_eq!(feed.watermark(), Some(5));
    Ok(())
}

#[tokio::test]
async fn declined_kick_sends_nothing() {
    let client = client(ScriptedTransport::default(), false);

    let effect = handle_input(&client, UserCommand::member(4, &kick_control("2"))).await;

    assert_eq!(effect, ActionEffect::Nothing);
    assert_eq!(client.prompter().confirms.get(), 1);
    assert!(sent(&client).is_empty());
}

#[tokio::test]
async fn missing_user_id_sends_nothing_and_stays_silent() {
    let client = client(ScriptedTransport::default(), true);
    let control = DataAttributes::new().with(ATTR_ACTION, "ban");

    let effect = handle_input(&client, UserCommand::member(4, &control)).await;

    assert_eq!(effect, ActionEffect::Nothing);
    assert_eq!(client.prompter().confirms.get(), 0);
    assert!(sent(&client).is_empty());
    assert!(alerts(&client).is_empty());
}

#[tokio::test]
async fn failed_kick_shows_server_error_once() {
    let transport = ScriptedTransport::default().reply(
        403,
        json!({"success": false, "error": "Only the lobby creator can kick players"}),
    );
    let client = client(transport, true);

    let effect = handle_input(&client, UserCommand::member(4, &kick_control("2"))).await;

    assert_eq!(effect, ActionEffect::Nothing);
    assert_eq!(alerts(&client), vec!["Only the lobby creator can kick players"]);
    let requests = sent(&client);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Post);
    assert_eq!(requests[0].body, Some(json!({"user_id": 2})));
}

#[tokio::test]
async fn failed_ban_without_server_message_uses_fallback() {
    let transport = ScriptedTransport::default().fail(ApiError::Network("offline".to_string()));
    let client = client(transport, true);
    let control = DataAttributes::new()
        .with(ATTR_ACTION, "ban")
        .with(ATTR_USER_ID, "2");

    handle_input(&client, UserCommand::member(4, &control)).await;

    assert_eq!(alerts(&client), vec!["Action failed"]);
}

#[tokio::test]
async fn successful_move_waits_for_next_poll() {
    let transport = ScriptedTransport::default().reply(200, json!({"success": true}));
    let client = client(transport, true);
    let control = DataAttributes::new()
        .with(ATTR_ACTION, "move")
        .with(ATTR_USER_ID, "2")
        .with("data-team-number", "1");

    let effect = handle_input(&client, UserCommand::member(4, &control)).await;

    assert_eq!(effect, ActionEffect::AwaitNextPoll);
    assert_eq!(client.prompter().confirms.get(), 0);
    assert_eq!(sent(&client)[0].path, "/api/lobby/4/move-team");
}

#[tokio::test]
async fn swap_is_a_no_op() {
    let client = client(ScriptedTransport::default(), true);
    let control = DataAttributes::new()
        .with(ATTR_ACTION, "swap")
        .with(ATTR_USER_ID, "2");

    let effect = handle_input(&client, UserCommand::member(4, &control)).await;

    assert_eq!(effect, ActionEffect::Nothing);
    assert!(sent(&client).is_empty());
}

#[tokio::test]
async fn add_friend_alerts_then_reloads() {
    let transport = ScriptedTransport::default().reply(200, json!({"success": true}));
    let client = client(transport, true);
    let control = DataAttributes::new()
        .with(ATTR_FRIEND_ACTION, "add")
        .with(ATTR_USER_ID, "7");

    let effect = handle_input(&client, UserCommand::friend(&control)).await;

    assert_eq!(effect, ActionEffect::ReloadPage);
    assert_eq!(alerts(&client), vec!["Friend added"]);
    assert_eq!(sent(&client)[0].body, Some(json!({"friend_id": 7})));
}

#[tokio::test]
async fn declined_friend_removal_sends_nothing() {
    let client = client(ScriptedTransport::default(), false);
    let control = DataAttributes::new()
        .with(ATTR_FRIEND_ACTION, "remove")
        .with(ATTR_USER_ID, "7");

    let effect = handle_input(&client, UserCommand::friend(&control)).await;

    assert_eq!(effect, ActionEffect::Nothing);
    assert!(sent(&client).is_empty());
}

#[tokio::test]
async fn friend_failure_shows_generic_alert_once() {
    let transport = ScriptedTransport::default().reply(500, json!({"error": "db down"}));
    let client = client(transport, true);
    let control = DataAttributes::new()
        .with(ATTR_FRIEND_ACTION, "remove")
        .with(ATTR_USER_ID, "7");

    let effect = handle_input(&client, UserCommand::friend(&control)).await;

    assert_eq!(effect, ActionEffect::Nothing);
    assert_eq!(alerts(&client), vec!["Server request failed"]);
}

#[tokio::test]
async fn sending_a_message_clears_the_composer() {
    let transport =
        ScriptedTransport::default().reply(200, json!({"success": true, "message_id": 44}));
    let client = client(transport, true);

    let effect = handle_input(&client, UserCommand::send_ticket_message(3, " thanks ")).await;

    assert_eq!(effect, ActionEffect::ClearComposer);
    assert_eq!(sent(&client)[0].body, Some(json!({"message": "thanks"})));
}

#[tokio::test]
async fn blank_message_never_reaches_the_server() {
    let client = client(ScriptedTransport::default(), true);

    let effect = handle_input(&client, UserCommand::send_lobby_message(3, "   ")).await;

    assert_eq!(effect, ActionEffect::Nothing);
    assert!(sent(&client).is_empty());
    assert!(alerts(&client).is_empty());
}

#[tokio::test]
async fn status_update_reports_new_status() -> anyhow::Result<()> {
    let transport =
        ScriptedTransport::default().reply(200, json!({"success": true, "status": "resolved"}));
    let client = client(transport, true);
    let command = UserCommand::update_ticket_status(3, "resolved")?;

    let effect = run_command(&client, command).await;

    assert_eq!(effect, ActionEffect::TicketStatusChanged(TicketStatus::Resolved));
    Ok(())
}

#[tokio::test]
async fn invite_copies_url() {
    let transport = ScriptedTransport::default().reply(
        200,
        json!({"success": true, "invite_code": "abc", "invite_url": "https://arena.example/lobby/join/abc"}),
    );
    let client = client(transport, true);

    let effect = run_command(&client, UserCommand::CopyLobbyInvite { lobby_id: 4 }).await;

    assert_eq!(
        effect,
        ActionEffect::CopyToClipboard("https://arena.example/lobby/join/abc".to_string())
    );
}

#[tokio::test]
async fn join_navigates_to_redirect() {
    let transport = ScriptedTransport::default()
        .reply(200, json!({"success": true, "redirect_url": "/lobby/4"}))
        .reply(400, json!({"success": false, "error": "Wrong password"}));
    let client = client(transport, true);

    let joined = run_command(&client, UserCommand::join_lobby(4, Some("pw"), None)).await;
    let rejected = run_command(&client, UserCommand::join_lobby(4, Some("bad"), None)).await;

    assert_eq!(joined, ActionEffect::Navigate("/lobby/4".to_string()));
    assert_eq!(rejected, ActionEffect::Nothing);
    assert_eq!(alerts(&client), vec!["Wrong password"]);
}
