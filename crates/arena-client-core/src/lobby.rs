use std::collections::BTreeSet;

use crate::api::ApiEndpoint;
use crate::config::Messages;
use crate::fetch::{ApiClient, ApiTransport, Prompter};
use crate::format::format_balance;
use crate::model::{LobbyId, LobbyMembersResponse, LobbyMode, LobbyStatus, Member, Team, UserId};
use crate::page::{
    ATTR_ACTION, ATTR_TEAM_NUMBER, ATTR_USER_ID, CLASS_MEMBER_ACTION, CLASS_MEMBER_ITEM,
    CLASS_TEAM_SECTION, Viewer,
};
use crate::view::ViewNode;

/// One successful members poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbySnapshot {
    pub members: Vec<Member>,
    /// Absent when the server leaves it out; the indicator is then left as
    /// rendered.
    pub status: Option<LobbyStatus>,
    pub mode: LobbyMode,
}

impl From<LobbyMembersResponse> for LobbySnapshot {
    fn from(response: LobbyMembersResponse) -> Self {
        Self {
            members: response.members,
            status: response.status,
            mode: response.mode,
        }
    }
}

/// One lobby tick's fetch. `None` on any failure, including a 2xx reply
/// with `success: false`; the caller keeps its timer running either way.
pub async fn poll_lobby<T: ApiTransport, P: Prompter>(
    client: &ApiClient<T, P>,
    lobby_id: LobbyId,
) -> Option<LobbySnapshot> {
    let request = ApiEndpoint::LobbyMembers { lobby_id }.to_request();
    let response: LobbyMembersResponse = client.poll_json(&request).await?;
    if !response.success {
        tracing::warn!(lobby_id, "lobby members poll reported failure");
        return None;
    }
    Some(response.into())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<UserId>,
    pub removed: Vec<UserId>,
    pub retained: usize,
}

impl ReconcileReport {
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[must_use]
pub fn rendered_member_ids(container: &ViewNode) -> BTreeSet<UserId> {
    container
        .find_all_by_class(CLASS_MEMBER_ITEM)
        .into_iter()
        .filter_map(|node| node.data("user-id"))
        .filter_map(|raw| raw.parse().ok())
        .collect()
}

/// Rebuilds `container` from `snapshot`. The container always ends up
/// holding exactly the snapshot's members; the report is informational.
pub fn reconcile_members(
    container: &mut ViewNode,
    snapshot: &LobbySnapshot,
    viewer: &Viewer,
    messages: &Messages,
) -> ReconcileReport {
    let previous = rendered_member_ids(container);
    let next: BTreeSet<UserId> = snapshot.members.iter().map(|member| member.user_id).collect();

    let report = ReconcileReport {
        added: next.difference(&previous).copied().collect(),
        removed: previous.difference(&next).copied().collect(),
        retained: next.intersection(&previous).count(),
    };

    let children = if snapshot.mode.is_team_mode() {
        render_team_sections(&snapshot.members, viewer, messages, &snapshot.mode)
    } else {
        snapshot
            .members
            .iter()
            .map(|member| render_member(member, viewer, messages, &snapshot.mode))
            .collect()
    };
    container.replace_children(children);

    if !report.is_unchanged() {
        tracing::debug!(
            added = report.added.len(),
            removed = report.removed.len(),
            mode = %snapshot.mode,
            "lobby members changed"
        );
    }
    report
}

fn render_team_sections(
    members: &[Member],
    viewer: &Viewer,
    messages: &Messages,
    mode: &LobbyMode,
) -> Vec<ViewNode> {
    Team::ALL
        .iter()
        .filter_map(|team| {
            let roster: Vec<&Member> = members
                .iter()
                .filter(|member| member.team() == *team)
                .collect();
            if roster.is_empty() {
                return None;
            }
            let number = team.number();
            let mut section = ViewNode::new("section")
                .class(CLASS_TEAM_SECTION)
                .attr(ATTR_TEAM_NUMBER, number.to_string())
                .child(
                    ViewNode::new("h4")
                        .class("team-title")
                        .text(format!("{} {number}", messages.team_label)),
                );
            for member in roster {
                section = section.child(render_member(member, viewer, messages, mode));
            }
            Some(section)
        })
        .collect()
}

fn render_member(
    member: &Member,
    viewer: &Viewer,
    messages: &Messages,
    mode: &LobbyMode,
) -> ViewNode {
    let mut name = ViewNode::new("div")
        .class("member-info")
        .child(
            ViewNode::new("span")
                .class("member-name")
                .text(member.username.clone()),
        );
    if member.is_creator {
        name = name.child(
            ViewNode::new("span")
                .class("creator-badge")
                .text(messages.creator_badge.clone()),
        );
    }
    name = name
        .child(
            ViewNode::new("span")
                .class("member-level")
                .text(format!("Lvl {}", member.level)),
        )
        .child(
            ViewNode::new("span")
                .class("member-balance")
                .text(format_balance(member.ggp)),
        );

    let mut item = ViewNode::new("div")
        .class(CLASS_MEMBER_ITEM)
        .attr(ATTR_USER_ID, member.user_id.to_string())
        .child(
            ViewNode::new("div")
                .class("member-avatar")
                .text(member.avatar_initial()),
        )
        .child(name);

    if viewer.can_manage(member.user_id) {
        item = item.child(render_member_actions(member, mode));
    }
    item
}

fn action_button(action: &str, label: &str, user_id: UserId) -> ViewNode {
    ViewNode::new("button")
        .class(CLASS_MEMBER_ACTION)
        .class(format!("member-action-{action}"))
        .attr("type", "button")
        .attr(ATTR_ACTION, action)
        .attr(ATTR_USER_ID, user_id.to_string())
        .text(label)
}

fn render_member_actions(member: &Member, mode: &LobbyMode) -> ViewNode {
    let mut actions = ViewNode::new("div")
        .class("member-actions")
        .child(action_button("swap", "Swap", member.user_id))
        .child(action_button("kick", "Kick", member.user_id))
        .child(action_button("ban", "Ban", member.user_id));
    if mode.is_team_mode() {
        let target = member.team().other().number();
        actions = actions.child(
            action_button("move", &format!("Move to team {target}"), member.user_id)
                .attr(ATTR_TEAM_NUMBER, target.to_string()),
        );
    }
    actions
}
