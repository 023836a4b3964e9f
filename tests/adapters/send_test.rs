//! Send precondition tests: failures that must occur before any network call.

use std::sync::Arc;

use chatbridge::adapters::personal::PersonalAdapter;
use chatbridge::adapters::{ChannelAdapter, SendError};
use chatbridge::identity::{RawConversationRecord, RawProfile};
use chatbridge::providers::personal::PersonalClient;

fn adapter() -> PersonalAdapter {
    let client = Arc::new(PersonalClient::new("http://127.0.0.1:1".to_owned()));
    let adapter = PersonalAdapter::new(client);
    adapter.seed_records_for_testing(vec![RawConversationRecord::Personal {
        conversation_id: Some("c1".to_owned()),
        thread_id: None,
        peer_id: None,
        profile: RawProfile::named("Ann"),
    }]);
    adapter
}

#[tokio::test]
async fn send_without_selection_fails_with_no_active_conversation() {
    let adapter = adapter();
    let result = adapter.send_text("hello").await;
    assert!(matches!(result, Err(SendError::NoActiveConversation)));
}

#[tokio::test]
async fn blank_text_fails_with_empty_message() {
    let adapter = adapter();
    adapter.select_conversation("c1");
    let result = adapter.send_text("   \n\t ").await;
    assert!(matches!(result, Err(SendError::EmptyMessage)));
}

#[tokio::test]
async fn empty_string_fails_with_empty_message() {
    let adapter = adapter();
    adapter.select_conversation("c1");
    let result = adapter.send_text("").await;
    assert!(matches!(result, Err(SendError::EmptyMessage)));
}
