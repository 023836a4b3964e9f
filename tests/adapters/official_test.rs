//! Official-account channel-id parsing and account selection tests.

use std::sync::Arc;

use chatbridge::adapters::official::{account_id_from_channel_id, OfficialAdapter};
use chatbridge::adapters::ChannelAdapter;
use chatbridge::providers::official::OfficialClient;

fn adapter() -> OfficialAdapter {
    let client = Arc::new(OfficialClient::new(
        "http://127.0.0.1:1".to_owned(),
        "token".to_owned(),
    ));
    OfficialAdapter::new(client)
}

#[test]
fn channel_id_with_account_suffix_resolves() {
    assert_eq!(
        account_id_from_channel_id("official-account-acct42"),
        Some("acct42")
    );
}

#[test]
fn empty_suffix_means_no_account_selected() {
    // An empty-string account id must never be treated as valid.
    assert_eq!(account_id_from_channel_id("official-account-"), None);
}

#[test]
fn unrelated_ids_mean_no_account_selected() {
    assert_eq!(account_id_from_channel_id("official-account"), None);
    assert_eq!(account_id_from_channel_id("page-acct42"), None);
    assert_eq!(account_id_from_channel_id(""), None);
}

#[test]
fn select_account_sets_and_clears() {
    let adapter = adapter();
    adapter.select_account("official-account-acct42");
    assert_eq!(adapter.account_id().as_deref(), Some("acct42"));

    adapter.select_account("official-account-");
    assert_eq!(adapter.account_id(), None);
}

#[tokio::test]
async fn refresh_without_account_is_an_empty_no_op() {
    let adapter = adapter();
    let refreshed = adapter.refresh().await;
    assert!(matches!(refreshed, Ok(0)));
    assert!(adapter.list_conversations().is_empty());
}
