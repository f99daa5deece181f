use super::*;

use arena_client_core::lobby::{LobbySnapshot, reconcile_members};
use arena_client_core::page::{ATTR_USER_ID, CLASS_MEMBER_ITEM, highest_message_id};
use arena_client_core::transcript::{TranscriptKind, append_messages, render_ticket_status};
use arena_client_core::{DataAttributes, TicketStatus, TranscriptMessage, ViewNode, Viewer};
use web_sys::{Document, HtmlSelectElement, HtmlTextAreaElement};

pub(super) fn document() -> Result<Document, String> {
    let window = web_sys::window().ok_or_else(|| "window is unavailable".to_string())?;
    window
        .document()
        .ok_or_else(|| "document is unavailable".to_string())
}

pub(super) fn query_first(selector: &str) -> Option<Element> {
    document().ok()?.query_selector(selector).ok().flatten()
}

pub(super) fn query_all(selector: &str) -> Vec<Element> {
    let Ok(document) = document() else {
        return Vec::new();
    };
    let Ok(list) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub(super) fn query_all_within(root: &Element, selector: &str) -> Vec<Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Every `data-*` attribute on `element`.
pub(super) fn data_attributes(element: &Element) -> DataAttributes {
    element
        .get_attribute_names()
        .iter()
        .filter_map(|name| name.as_string())
        .filter(|name| name.starts_with("data-"))
        .filter_map(|name| {
            let value = element.get_attribute(&name)?;
            Some((name, value))
        })
        .collect()
}

/// Element the event was dispatched to, or its nearest ancestor matching
/// `selector`.
pub(super) fn closest_target(event: &web_sys::Event, selector: &str) -> Option<Element> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    target.closest(selector).ok().flatten()
}

fn build_element(document: &Document, node: &ViewNode) -> Result<Element, String> {
    let element = document
        .create_element(node.tag)
        .map_err(|_| format!("failed to create {} element", node.tag))?;
    if !node.classes.is_empty() {
        element.set_class_name(&node.classes.join(" "));
    }
    for (name, value) in &node.attributes {
        element
            .set_attribute(name, value)
            .map_err(|_| format!("failed to set attribute {name}"))?;
    }
    if let Some(text) = &node.text {
        element.set_text_content(Some(text));
    }
    for child in &node.children {
        let child = build_element(document, child)?;
        element
            .append_child(&child)
            .map_err(|_| "failed to append child element".to_string())?;
    }
    Ok(element)
}

pub(super) fn append_nodes(target: &Element, nodes: &[ViewNode]) -> Result<(), String> {
    let document = document()?;
    for node in nodes {
        let element = build_element(&document, node)?;
        target
            .append_child(&element)
            .map_err(|_| "failed to append rendered node".to_string())?;
    }
    Ok(())
}

pub(super) fn replace_with_nodes(target: &Element, nodes: &[ViewNode]) -> Result<(), String> {
    target.set_inner_html("");
    append_nodes(target, nodes)
}

/// The ids already on the page, as a container the reconciler can diff.
fn rendered_members(list: &Element) -> ViewNode {
    query_all_within(list, MEMBER_ITEM_SELECTOR)
        .into_iter()
        .filter_map(|item| item.get_attribute(ATTR_USER_ID))
        .fold(ViewNode::new("div"), |container, user_id| {
            container.child(
                ViewNode::new("div")
                    .class(CLASS_MEMBER_ITEM)
                    .attr(ATTR_USER_ID, user_id),
            )
        })
}

pub(super) fn apply_lobby_snapshot(snapshot: &LobbySnapshot, viewer: &Viewer) -> Result<(), String> {
    if let Some(list) = query_first(MEMBERS_LIST_SELECTOR) {
        let mut container = rendered_members(&list);
        let messages = config_snapshot().messages;
        let report = reconcile_members(&mut container, snapshot, viewer, &messages);
        if !report.is_unchanged() {
            tracing::info!(
                added = ?report.added,
                removed = ?report.removed,
                "lobby roster updated"
            );
        }
        replace_with_nodes(&list, &container.children)?;
    }
    let Some(status) = snapshot.status.as_ref() else {
        return Ok(());
    };
    if let Some(indicator) = query_first(LOBBY_STATUS_SELECTOR) {
        match indicator.get_attribute(ATTR_LOBBY_STATUS) {
            Some(shown) if shown == status.as_str() => return Ok(()),
            // Template text without a recorded value is taken as current.
            None => {
                let _ = indicator.set_attribute(ATTR_LOBBY_STATUS, status.as_str());
                return Ok(());
            }
            Some(_) => {}
        }
        let label = config_snapshot().messages.lobby_status_label(status);
        indicator.set_text_content(Some(&label));
        let _ = indicator.set_attribute(ATTR_LOBBY_STATUS, status.as_str());
    }
    Ok(())
}

/// Seeds a transcript feed from the messages the server already rendered.
pub(super) fn rendered_feed(message_selector: &str) -> TranscriptFeed {
    let rendered: Vec<DataAttributes> = query_all(message_selector)
        .iter()
        .map(data_attributes)
        .collect();
    TranscriptFeed::from_rendered_ids(highest_message_id(&rendered))
}

pub(super) fn append_transcript(
    container_selector: &str,
    feed: &mut TranscriptFeed,
    kind: TranscriptKind,
    batch: Vec<TranscriptMessage>,
) -> Result<usize, String> {
    let Some(target) = query_first(container_selector) else {
        return Ok(0);
    };
    let mut container = ViewNode::new("div");
    let added = append_messages(&mut container, feed, kind, batch);
    append_nodes(&target, &container.children)?;
    if added > 0 {
        target.set_scroll_top(target.scroll_height());
    }
    Ok(added)
}

/// Leaves an indicator that already shows `status` untouched, so the
/// server-rendered label survives until the status actually changes.
pub(super) fn apply_ticket_status(status: &TicketStatus) {
    let badge = render_ticket_status(status, &config_snapshot().messages);
    let current_class = format!("{STATUS_CLASS_PREFIX}{}", status.as_str());
    for indicator in query_all(TICKET_STATUS_SELECTOR) {
        let class_list = indicator.class_list();
        if class_list.contains(&current_class) {
            continue;
        }
        let stale: Vec<String> = (0..class_list.length())
            .filter_map(|index| class_list.item(index))
            .filter(|class| class.starts_with(STATUS_CLASS_PREFIX))
            .collect();
        for class in stale {
            let _ = class_list.remove_1(&class);
        }
        for class in &badge.classes {
            let _ = class_list.add_1(class);
        }
        indicator.set_text_content(badge.text.as_deref());
    }
}

pub(super) fn composer_input(form: &Element) -> Option<HtmlElement> {
    form.query_selector(COMPOSER_INPUT_SELECTOR)
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
}

pub(super) fn field_value(element: &Element) -> Option<String> {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        return Some(input.value());
    }
    if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        return Some(area.value());
    }
    element
        .dyn_ref::<HtmlSelectElement>()
        .map(HtmlSelectElement::value)
}

pub(super) fn clear_composer(composer: &HtmlElement) {
    if let Some(input) = composer.dyn_ref::<HtmlInputElement>() {
        input.set_value("");
    } else if let Some(area) = composer.dyn_ref::<HtmlTextAreaElement>() {
        area.set_value("");
    }
    let _ = composer.focus();
}
