use super::test_helpers::*;
use crate::auth::provider::current_identity;

#[tokio::test]
async fn provider_without_token_resolves_none() {
    let state = test_app_state();
    let provider = state.provider_for(None);
    assert!(current_identity(&provider).await.unwrap().is_none());
}

#[tokio::test]
async fn provider_with_seeded_session_resolves_identity() {
    let state = test_app_state();
    let token = seed_session(&state, "u1");
    let provider = state.provider_for(Some(token));
    let resolved = current_identity(&provider).await.unwrap();
    assert_eq!(resolved.unwrap().uid, "u1");
}

#[tokio::test]
async fn clones_share_the_session_store() {
    let state = test_app_state();
    let clone = state.clone();
    let token = seed_session(&state, "u1");
    let provider = clone.provider_for(Some(token));
    assert!(current_identity(&provider).await.unwrap().is_some());
}
