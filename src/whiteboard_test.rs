use super::*;
use crate::element::{Circle, Placement};

fn circle(uuid: &str) -> Element {
    Element::Circle(Circle { uuid: uuid.into(), radius: 5, ..Circle::default() })
}

fn order(wb: &Whiteboard) -> Vec<&str> {
    wb.elements().map(Element::uuid).collect()
}

fn board_with(ids: &[&str]) -> Whiteboard {
    let mut wb = Whiteboard::new("Sketch", "Alice", Transport::WebSocket);
    for id in ids {
        wb.add_element(circle(id));
    }
    wb
}

#[test]
fn new_whiteboard_defaults() {
    let wb = Whiteboard::new("Sketch", "Alice", Transport::LongPolling);
    assert_eq!((wb.width, wb.height), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
    assert_eq!(wb.element_count(), 0);
    assert_eq!(wb.users_count(), 0);
    assert_eq!(wb.transport.as_str(), "long-polling");
    assert_ne!(wb.id, Whiteboard::new("Sketch", "Alice", Transport::LongPolling).id);
}

#[test]
fn roster_keeps_names_per_sender() {
    let mut wb = board_with(&[]);
    wb.add_user("s1", "Alice");
    wb.add_user("s2", "Bob");
    wb.add_user("s2", "Bobby");
    assert_eq!(wb.users_count(), 2);
    assert_eq!(wb.user_name("s2"), Some("Bobby"));
    assert_eq!(wb.user_name("missing"), None);
}

#[test]
fn add_appends_in_paint_order() {
    let wb = board_with(&["a", "b", "c"]);
    assert_eq!(order(&wb), ["a", "b", "c"]);
}

#[test]
fn re_adding_existing_id_replaces_in_place() {
    let mut wb = board_with(&["a", "b", "c"]);
    let mut replacement = circle("a");
    if let Some(p) = replacement.as_positionable_mut() {
        *p = Placement { x: 5, y: 5, rotation_degree: 0 };
    }
    wb.add_element(replacement);
    assert_eq!(order(&wb), ["a", "b", "c"]);
    assert_eq!(wb.element("a").and_then(Element::as_positionable).map(|p| p.x), Some(5));
}

#[test]
fn remove_preserves_remaining_order() {
    let mut wb = board_with(&["a", "b", "c", "d"]);
    assert!(wb.remove_element("b").is_some());
    assert!(wb.remove_element("b").is_none());
    assert_eq!(order(&wb), ["a", "c", "d"]);
}

#[test]
fn bring_to_front_moves_to_last() {
    let mut wb = board_with(&["a", "b", "c"]);
    assert_eq!(wb.bring_to_front("a").map(Element::uuid), Some("a"));
    assert_eq!(order(&wb), ["b", "c", "a"]);
}

#[test]
fn bring_to_front_of_topmost_is_idempotent() {
    let mut wb = board_with(&["a", "b", "c"]);
    wb.bring_to_front("c");
    wb.bring_to_front("c");
    assert_eq!(order(&wb), ["a", "b", "c"]);
}

#[test]
fn bring_to_back_moves_to_first_keeping_others() {
    let mut wb = board_with(&["a", "b", "c", "d"]);
    assert_eq!(wb.bring_to_back("c").map(Element::uuid), Some("c"));
    assert_eq!(order(&wb), ["c", "a", "b", "d"]);
}

#[test]
fn z_order_ops_on_missing_id_do_nothing() {
    let mut wb = board_with(&["a", "b"]);
    assert!(wb.bring_to_front("zz").is_none());
    assert!(wb.bring_to_back("zz").is_none());
    assert_eq!(order(&wb), ["a", "b"]);
}

#[test]
fn clear_and_resize() {
    let mut wb = board_with(&["a", "b"]);
    wb.clear_elements();
    assert_eq!(wb.element_count(), 0);
    wb.resize(1000, 700);
    assert_eq!((wb.width, wb.height), (1000, 700));
}

#[test]
fn touch_resets_idle_clock() {
    let mut wb = board_with(&[]);
    std::thread::sleep(Duration::from_millis(20));
    assert!(wb.idle_for() >= Duration::from_millis(20));
    wb.touch();
    assert!(wb.idle_for() < Duration::from_millis(20));
}

#[test]
fn transport_wire_names() {
    assert_eq!(serde_json::to_string(&Transport::WebSocket).unwrap(), "\"websocket\"");
    assert_eq!(serde_json::to_string(&Transport::LongPolling).unwrap(), "\"long-polling\"");
    let parsed: Transport = serde_json::from_str("\"streaming\"").unwrap();
    assert_eq!(parsed, Transport::Streaming);
}

#[test]
fn gmt_formatting() {
    assert_eq!(format_gmt_millis(0), "1970-Jan-01 00:00:00 (GMT)");
    assert_eq!(format_gmt_millis(1_317_137_069_000), "2011-Sep-27 15:24:29 (GMT)");
}

#[test]
fn gmt_formatting_converts_offsets_and_pads() {
    let at = time::macros::datetime!(2024-03-05 01:02:03 +02:00);
    assert_eq!(format_gmt(at), "2024-Mar-04 23:02:03 (GMT)");
}
