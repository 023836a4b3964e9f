//! Selection and message-snapshot behavior of the personal adapter.

use std::sync::Arc;

use chatbridge::adapters::personal::PersonalAdapter;
use chatbridge::adapters::ChannelAdapter;
use chatbridge::identity::{RawConversationRecord, RawProfile};
use chatbridge::providers::personal::PersonalClient;
use chatbridge::types::{Message, Sender};

fn adapter_with_two_records() -> PersonalAdapter {
    // Client is never called by selection or snapshot reads.
    let client = Arc::new(PersonalClient::new("http://127.0.0.1:1".to_owned()));
    let adapter = PersonalAdapter::new(client);
    adapter.seed_records_for_testing(vec![
        RawConversationRecord::Personal {
            conversation_id: Some("c1".to_owned()),
            thread_id: None,
            peer_id: None,
            profile: RawProfile {
                name: "Ann".to_owned(),
                preview: "hi".to_owned(),
                last_activity: 0,
                unread: 3,
            },
        },
        RawConversationRecord::Personal {
            conversation_id: None,
            thread_id: Some("t2".to_owned()),
            peer_id: None,
            profile: RawProfile::named("Bob"),
        },
    ]);
    adapter
}

fn message(id: &str, text: &str) -> Message {
    Message {
        id: id.to_owned(),
        text: text.to_owned(),
        sent_at_label: "10:00".to_owned(),
        sender: Sender::User,
    }
}

#[test]
fn unknown_id_leaves_previous_selection_unchanged() {
    let adapter = adapter_with_two_records();
    adapter.select_conversation("c1");
    assert_eq!(adapter.active_conversation().as_deref(), Some("c1"));

    // Idempotent-miss law: a stale or bogus id must not clear the selection.
    adapter.select_conversation("missing");
    assert_eq!(adapter.active_conversation().as_deref(), Some("c1"));
}

#[test]
fn selecting_thread_resolved_record_exposes_its_messages() {
    let adapter = adapter_with_two_records();
    adapter.select_conversation("t2");
    adapter.seed_messages_for_testing(vec![message("m1", "hello from t2")]);

    let messages = adapter.messages_for_active();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "hello from t2");

    // The snapshot attaches loaded messages only to the active conversation.
    let list = adapter.list_conversations();
    let second = list.iter().find(|c| c.id == "t2");
    assert!(matches!(second, Some(c) if c.messages.len() == 1));
    let first = list.iter().find(|c| c.id == "c1");
    assert!(matches!(first, Some(c) if c.messages.is_empty()));
}

#[test]
fn empty_sentinel_id_is_never_selectable() {
    let adapter = adapter_with_two_records();
    adapter.seed_records_for_testing(vec![RawConversationRecord::Personal {
        conversation_id: None,
        thread_id: None,
        peer_id: None,
        profile: RawProfile::named("ghost"),
    }]);

    adapter.select_conversation("");
    assert_eq!(adapter.active_conversation(), None);
}

#[test]
fn nothing_active_yields_empty_messages() {
    let adapter = adapter_with_two_records();
    assert_eq!(adapter.active_conversation(), None);
    assert!(adapter.messages_for_active().is_empty());
}

#[test]
fn selecting_a_conversation_zeroes_its_unread_count() {
    let adapter = adapter_with_two_records();
    let before = adapter.list_conversations();
    let unread_before = before.iter().find(|c| c.id == "c1").map(|c| c.unread_count);
    assert_eq!(unread_before, Some(3));

    adapter.select_conversation("c1");
    let after = adapter.list_conversations();
    let unread_after = after.iter().find(|c| c.id == "c1").map(|c| c.unread_count);
    assert_eq!(unread_after, Some(0));
}

#[test]
fn switching_selection_drops_messages_of_the_previous_record() {
    let adapter = adapter_with_two_records();
    adapter.select_conversation("c1");
    adapter.seed_messages_for_testing(vec![message("m1", "for c1")]);

    adapter.select_conversation("t2");
    assert!(adapter.messages_for_active().is_empty());

    // Re-selecting the already-active record keeps its messages.
    adapter.seed_messages_for_testing(vec![message("m2", "for t2")]);
    adapter.select_conversation("t2");
    assert_eq!(adapter.messages_for_active().len(), 1);
}
