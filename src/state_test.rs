use super::*;

#[tokio::test]
async fn hub_shares_the_registry() {
    let state = test_helpers::test_app_state();
    assert!(Arc::ptr_eq(&state.registry, state.hub.registry()));

    let id = test_helpers::seed_whiteboard(&state).await;
    assert!(state.hub.registry().get(id).await.is_some());
}

#[test]
fn clones_share_inner_state() {
    let state = test_helpers::test_app_state();
    let clone = state.clone();
    assert!(Arc::ptr_eq(&state.registry, &clone.registry));
    assert!(Arc::ptr_eq(&state.hub, &clone.hub));
    assert!(Arc::ptr_eq(&state.config, &clone.config));
}
