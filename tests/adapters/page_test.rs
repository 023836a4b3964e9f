//! Page-messaging recipient resolution tests.

use std::sync::Arc;

use chatbridge::adapters::page::PageAdapter;
use chatbridge::adapters::{ChannelAdapter, SendError};
use chatbridge::identity::{RawConversationRecord, RawProfile};
use chatbridge::providers::page::PageClient;

fn adapter_with_thread(recipient_id: Option<&str>) -> PageAdapter {
    let client = Arc::new(PageClient::new(
        "http://127.0.0.1:1".to_owned(),
        "page-1".to_owned(),
        "token".to_owned(),
    ));
    let adapter = PageAdapter::new(client);
    adapter.seed_records_for_testing(vec![RawConversationRecord::PageMessaging {
        thread_key: "x".to_owned(),
        recipient_id: recipient_id.map(str::to_owned),
        profile: RawProfile::named("visitor"),
    }]);
    adapter
}

#[tokio::test]
async fn unresolved_recipient_fails_before_any_network_call() {
    let adapter = adapter_with_thread(None);
    adapter.select_conversation("x");

    let result = adapter.send_text("hello").await;
    assert!(
        matches!(result, Err(SendError::RecipientUnresolved(ref id)) if id.as_str() == "x"),
        "expected RecipientUnresolved, got {result:?}"
    );
}

#[tokio::test]
async fn blank_text_is_rejected_before_recipient_resolution() {
    let adapter = adapter_with_thread(None);
    adapter.select_conversation("x");

    let result = adapter.send_text("  ").await;
    assert!(matches!(result, Err(SendError::EmptyMessage)));
}
