use super::*;
use crate::element::TruncatedElement;
use serde_json::json;

fn create_circle_json(whiteboard_id: Uuid) -> String {
    json!({
        "action": "create",
        "whiteboardId": whiteboard_id,
        "element": {"type": "Circle", "properties": {"uuid": "c1", "x": 10, "y": 10, "radius": 5}},
        "user": "Alice",
        "timestamp": 1000
    })
    .to_string()
}

#[test]
fn decode_create_message() {
    let wb = Uuid::new_v4();
    let ccd = decode_client(&create_circle_json(wb)).expect("should decode");
    assert_eq!(ccd.action, ClientAction::Create);
    assert_eq!(ccd.whiteboard_id, wb);
    assert_eq!(ccd.user, "Alice");
    assert_eq!(ccd.timestamp, 1000);
    assert!(ccd.parameters.is_empty());
    let element = ccd.element.expect("element present");
    assert_eq!(element.kind(), ElementKind::Circle);
    assert_eq!(element.uuid(), "c1");
}

#[test]
fn decode_all_action_tags() {
    let wb = Uuid::new_v4();
    let cases = [
        ("join", ClientAction::Join),
        ("create", ClientAction::Create),
        ("update", ClientAction::Update),
        ("remove", ClientAction::Remove),
        ("clone", ClientAction::Clone),
        ("move", ClientAction::Move),
        ("toFront", ClientAction::BringToFront),
        ("toBack", ClientAction::BringToBack),
        ("clear", ClientAction::Clear),
        ("resize", ClientAction::Resize),
        ("explode", ClientAction::Unknown),
    ];
    for (tag, expected) in cases {
        let raw = json!({"action": tag, "whiteboardId": wb, "user": "u", "timestamp": 1}).to_string();
        let ccd = decode_client(&raw).unwrap();
        assert_eq!(ccd.action, expected, "tag {tag}");
        if expected != ClientAction::Unknown {
            assert_eq!(expected.as_str(), tag);
        }
    }
}

#[test]
fn numeric_parameters_are_stringified() {
    let raw = json!({
        "action": "resize",
        "whiteboardId": Uuid::new_v4(),
        "parameters": {"width": 1000, "height": "700", "nested": {"x": 1}}
    })
    .to_string();
    let ccd = decode_client(&raw).unwrap();
    assert_eq!(ccd.parameters.get("width").map(String::as_str), Some("1000"));
    assert_eq!(ccd.parameters.get("height").map(String::as_str), Some("700"));
    assert!(!ccd.parameters.contains_key("nested"));
}

#[test]
fn null_element_and_parameters_decode_as_absent() {
    let raw = json!({"action": "clear", "whiteboardId": Uuid::new_v4(), "element": null, "parameters": null}).to_string();
    let ccd = decode_client(&raw).unwrap();
    assert!(ccd.element.is_none());
    assert!(ccd.parameters.is_empty());
}

#[test]
fn unknown_element_type_is_named() {
    let raw = json!({
        "action": "create",
        "whiteboardId": Uuid::new_v4(),
        "element": {"type": "Hexagon", "properties": {"uuid": "h"}}
    })
    .to_string();
    let err = decode_client(&raw).unwrap_err();
    assert!(matches!(&err, CodecError::UnknownElementType(t) if t == "Hexagon"));
    assert_eq!(err.error_code(), "E_UNKNOWN_ELEMENT_TYPE");
}

#[test]
fn malformed_json_is_rejected() {
    let err = decode_client("{not json").unwrap_err();
    assert!(matches!(err, CodecError::Malformed(_)));
    assert_eq!(err.error_code(), "E_MALFORMED_MESSAGE");

    let missing_board = json!({"action": "clear"}).to_string();
    assert!(matches!(decode_client(&missing_board), Err(CodecError::Malformed(_))));
}

#[test]
fn encode_server_message_with_nulls() {
    let scd = ServerChangedData::new(ClientAction::Clear, 42).with_message("cleared");
    let value: serde_json::Value = serde_json::from_str(&encode_server(&scd).unwrap()).unwrap();
    assert_eq!(
        value,
        json!({"action": "clear", "element": null, "message": "cleared", "timestamp": 42, "parameters": null})
    );
}

#[test]
fn encode_server_message_with_truncated_element_and_parameters() {
    let ccd = decode_client(&create_circle_json(Uuid::new_v4())).unwrap();
    let element = ccd.element.unwrap();
    let scd = ServerChangedData::new(ClientAction::BringToBack, 7)
        .with_element(BroadcastElement::Truncated(TruncatedElement::of(&element)))
        .with_parameter("a", "1");
    let value: serde_json::Value = serde_json::from_str(&encode_server(&scd).unwrap()).unwrap();
    assert_eq!(value["action"], "toBack");
    assert_eq!(value["element"], json!({"type": "Circle", "properties": {"uuid": "c1"}}));
    assert_eq!(value["parameters"], json!({"a": "1"}));
}

#[test]
fn restored_whiteboard_messages() {
    assert!(RestoredWhiteboard::from_elements(Vec::new()).is_none());

    let ccd = decode_client(&create_circle_json(Uuid::new_v4())).unwrap();
    let one = RestoredWhiteboard::from_elements(vec![ccd.element.clone().unwrap()]).unwrap();
    assert_eq!(one.message, "1 whiteboard element has been restored");

    let three = RestoredWhiteboard::from_elements(vec![ccd.element.unwrap(); 3]).unwrap();
    assert_eq!(three.message, "3 whiteboard elements have been restored");
}
