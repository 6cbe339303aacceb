use super::*;
use crate::element::{Circle, Element};

fn create_request(title: &str, creator: &str) -> CreateWhiteboard {
    CreateWhiteboard { title: title.into(), creator: creator.into(), width: None, height: None, transport: None }
}

async fn created(registry: &WhiteboardRegistry) -> Membership {
    create(registry, &HubConfig::default(), create_request("Sketch", "Alice"))
        .await
        .expect("create should succeed")
}

#[tokio::test]
async fn create_registers_whiteboard_with_creator_in_roster() {
    let registry = WhiteboardRegistry::new();
    let membership = created(&registry).await;

    let handle = registry.get(membership.whiteboard_id).await.expect("registered");
    let wb = handle.lock().await;
    assert_eq!(wb.title, "Sketch");
    assert_eq!((wb.width, wb.height), (800, 500));
    assert_eq!(wb.transport, Transport::WebSocket);
    assert_eq!(wb.user_name(&membership.sender_id.to_string()), Some("Alice"));
}

#[tokio::test]
async fn create_honours_canvas_and_transport() {
    let registry = WhiteboardRegistry::new();
    let request = CreateWhiteboard {
        width: Some(1024),
        height: Some(600),
        transport: Some(Transport::Streaming),
        ..create_request("Big", "Alice")
    };
    let membership = create(&registry, &HubConfig::default(), request).await.unwrap();

    let handle = registry.get(membership.whiteboard_id).await.unwrap();
    let wb = handle.lock().await;
    assert_eq!((wb.width, wb.height), (1024, 600));
    assert_eq!(wb.transport, Transport::Streaming);
}

#[tokio::test]
async fn create_rejects_blank_fields_and_empty_canvas() {
    let registry = WhiteboardRegistry::new();
    let config = HubConfig::default();

    let err = create(&registry, &config, create_request("  ", "Alice")).await.unwrap_err();
    assert!(matches!(err, LobbyError::MissingField("title")));

    let err = create(&registry, &config, create_request("Sketch", "")).await.unwrap_err();
    assert!(matches!(err, LobbyError::MissingField("creator")));

    let request = CreateWhiteboard { width: Some(0), ..create_request("Sketch", "Alice") };
    let err = create(&registry, &config, request).await.unwrap_err();
    assert_eq!(err.error_code(), "E_INVALID_CANVAS");
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn join_adds_new_sender() {
    let registry = WhiteboardRegistry::new();
    let owner = created(&registry).await;

    let guest = join(&registry, owner.whiteboard_id, "Bob").await.unwrap();
    assert_eq!(guest.whiteboard_id, owner.whiteboard_id);
    assert_ne!(guest.sender_id, owner.sender_id);

    let handle = registry.get(owner.whiteboard_id).await.unwrap();
    let wb = handle.lock().await;
    assert_eq!(wb.users_count(), 2);
    assert_eq!(wb.user_name(&guest.sender_id.to_string()), Some("Bob"));
}

#[tokio::test]
async fn join_unknown_whiteboard_is_not_found() {
    let registry = WhiteboardRegistry::new();
    let err = join(&registry, Uuid::new_v4(), "Bob").await.unwrap_err();
    assert_eq!(err.error_code(), "E_WHITEBOARD_NOT_FOUND");
}

#[tokio::test]
async fn describe_greets_creator_then_joiner() {
    let registry = WhiteboardRegistry::new();
    let owner = created(&registry).await;

    let info = describe(&registry, owner.whiteboard_id, owner.sender_id).await.unwrap();
    assert_eq!(info.greeting, "Hello Alice! You have created this whiteboard.");
    assert_eq!(info.users_count, 1);
    assert_eq!(info.user, "Alice");
    assert_eq!(info.pub_sub_url, format!("/pubsub/{}/{}.topic", owner.whiteboard_id, owner.sender_id));
    assert!(info.creation_date.ends_with("(GMT)"));

    let guest = join(&registry, owner.whiteboard_id, "Bob").await.unwrap();
    let info = describe(&registry, owner.whiteboard_id, guest.sender_id).await.unwrap();
    assert_eq!(info.greeting, "Hello Bob! You have joined or refreshed this whiteboard.");
    assert_eq!(info.users_count, 2);
}

#[tokio::test]
async fn describe_unknown_sender_is_rejected() {
    let registry = WhiteboardRegistry::new();
    let owner = created(&registry).await;
    let err = describe(&registry, owner.whiteboard_id, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, LobbyError::UnknownSender { .. }));
}

#[tokio::test]
async fn restore_returns_elements_in_paint_order() {
    let registry = WhiteboardRegistry::new();
    let owner = created(&registry).await;
    assert!(restore(&registry, owner.whiteboard_id).await.unwrap().is_none());

    {
        let handle = registry.get(owner.whiteboard_id).await.unwrap();
        let mut wb = handle.lock().await;
        for id in ["a", "b"] {
            wb.add_element(Element::Circle(Circle { uuid: id.into(), ..Circle::default() }));
        }
    }

    let restored = restore(&registry, owner.whiteboard_id).await.unwrap().unwrap();
    let ids: Vec<&str> = restored.elements.iter().map(Element::uuid).collect();
    assert_eq!(ids, ["a", "b"]);
    assert_eq!(restored.message, "2 whiteboard elements have been restored");
}

#[tokio::test]
async fn restore_resets_idle_clock() {
    let registry = WhiteboardRegistry::new();
    let owner = created(&registry).await;

    tokio::time::sleep(std::time::Duration::from_millis(60)).await;
    restore(&registry, owner.whiteboard_id).await.unwrap();

    let evicted = registry.evict_idle(std::time::Duration::from_millis(40)).await;
    assert!(evicted.is_empty(), "restored whiteboard should count as active");
    assert!(registry.get(owner.whiteboard_id).await.is_some());
}
