//! Chat panel polling and compose behaviour

mod support;

use parlor_client::UserId;
use parlor_client::views::ChatState;
use parlor_client::views::chat::{NO_CONTACTS, NO_MESSAGES, SELECT_PROMPT};
use serde_json::json;
use std::time::Duration;
use support::{Harness, ViewEvent, contact, settle};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_messages(h: &Harness, contact_id: i64, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/messages/1/{contact_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&h.server)
        .await;
}

#[tokio::test]
async fn test_activation_resets_conversation_and_lists_contacts() {
    let h = Harness::start().await.with_tokens(Some("T1"), None).signed_in(1);
    Mock::given(method("GET"))
        .and(path("/api/friends/list/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"userId": 2, "username": "bob"},
            {"userId": 3, "email": "carol@example.com"},
            {"username": "no-id"}
        ])))
        .mount(&h.server)
        .await;

    let panel = h.chat_panel();
    let contacts = panel.activate().await.unwrap();

    assert_eq!(contacts.len(), 2);
    assert_eq!(contacts[1].display_name(), "carol@example.com");
    assert_eq!(panel.state(), ChatState::NoContactSelected);
    let events = h.view.events();
    assert!(events.contains(&ViewEvent::ComposeVisible(false)));
    assert!(events.contains(&ViewEvent::ChatLabel(SELECT_PROMPT.to_string())));
    assert!(events.contains(&ViewEvent::MessagesCleared));
    assert!(events.contains(&ViewEvent::Contacts(contacts, None)));
}

#[tokio::test]
async fn test_empty_contact_list_shows_placeholder() {
    let h = Harness::start().await.with_tokens(Some("T1"), None).signed_in(1);
    Mock::given(method("GET"))
        .and(path("/api/friends/list/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&h.server)
        .await;

    h.chat_panel().activate().await.unwrap();
    assert!(h.view.contains(&ViewEvent::ContactsPlaceholder(NO_CONTACTS.to_string())));
}

#[tokio::test]
async fn test_activation_waits_for_identity() {
    let h = Harness::start().await.with_tokens(Some("T1"), None);
    Mock::given(method("GET"))
        .and(path("/api/friends/list/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&h.server)
        .await;

    let panel = h.chat_panel();
    let activation = tokio::spawn({
        let panel = panel.clone();
        async move { panel.activate().await }
    });

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(!activation.is_finished());
    assert_eq!(h.hits("/api/friends/list/9").await, 0);

    h.session.set_user_id(UserId::from(9));
    activation.await.unwrap().unwrap();
    assert_eq!(h.hits("/api/friends/list/9").await, 1);
}

#[tokio::test]
async fn test_selecting_contact_fetches_now_and_keeps_polling() {
    let h = Harness::start().await.with_tokens(Some("T1"), None).signed_in(1);
    mount_messages(
        &h,
        2,
        json!([
            {"sender": {"userId": 2, "username": "bob"}, "messageText": "hi", "createdAt": "not a date"},
            {"sender": {"userId": 1, "username": "alice"}, "messageText": "hello", "createdAt": null}
        ]),
    )
    .await;

    let panel = h.chat_panel();
    panel.select_contact(contact(2, "bob")).await.unwrap();

    assert_eq!(h.hits("/api/messages/1/2").await, 1);
    assert_eq!(panel.polling_contact(), Some(UserId::from(2)));
    assert!(h.view.contains(&ViewEvent::ChatLabel("Chat with bob".to_string())));
    assert!(h.view.contains(&ViewEvent::ComposeVisible(true)));
    assert!(h.view.contains(&ViewEvent::Scrolled));

    let rendered = h.view.last_messages().unwrap();
    assert!(!rendered[0].own);
    assert_eq!(rendered[0].sender_label, "bob");
    assert_eq!(rendered[0].timestamp, "not a date");
    assert!(rendered[1].own);
    assert_eq!(rendered[1].sender_label, "You");
    assert_eq!(rendered[1].timestamp, "");

    settle(4).await;
    assert!(h.hits("/api/messages/1/2").await >= 3);
}

#[tokio::test]
async fn test_switching_contacts_leaves_one_timer_on_latest() {
    let h = Harness::start().await.with_tokens(Some("T1"), None).signed_in(1);
    mount_messages(&h, 2, json!([])).await;
    mount_messages(&h, 3, json!([])).await;

    let panel = h.chat_panel();
    panel.select_contact(contact(2, "bob")).await.unwrap();
    panel.select_contact(contact(3, "carol")).await.unwrap();
    assert_eq!(panel.polling_contact(), Some(UserId::from(3)));

    settle(1).await;
    let bob_before = h.hits("/api/messages/1/2").await;
    let carol_before = h.hits("/api/messages/1/3").await;
    settle(4).await;

    assert_eq!(h.hits("/api/messages/1/2").await, bob_before);
    assert!(h.hits("/api/messages/1/3").await > carol_before);
}

#[tokio::test]
async fn test_stale_message_list_is_discarded() {
    let h = Harness::start().await.with_tokens(Some("T1"), None).signed_in(1);
    Mock::given(method("GET"))
        .and(path("/api/messages/1/2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"sender": {"userId": 2}, "messageText": "old"}]))
                .set_delay(Duration::from_millis(150)),
        )
        .mount(&h.server)
        .await;
    mount_messages(
        &h,
        3,
        json!([{"sender": {"userId": 3}, "messageText": "new"}]),
    )
    .await;

    let panel = h.chat_panel();
    let slow = tokio::spawn({
        let panel = panel.clone();
        async move { panel.select_contact(contact(2, "bob")).await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    panel.select_contact(contact(3, "carol")).await.unwrap();
    slow.await.unwrap().unwrap();

    let texts: Vec<String> = h
        .view
        .events()
        .into_iter()
        .filter_map(|e| match e {
            ViewEvent::Messages(m) => Some(m[0].text.clone()),
            _ => None,
        })
        .collect();
    assert!(texts.iter().all(|t| t == "new"), "rendered {texts:?}");
}

#[tokio::test]
async fn test_empty_conversation_shows_placeholder() {
    let h = Harness::start().await.with_tokens(Some("T1"), None).signed_in(1);
    mount_messages(&h, 2, json!([])).await;

    h.chat_panel().select_contact(contact(2, "bob")).await.unwrap();
    assert!(h.view.contains(&ViewEvent::MessagesPlaceholder(NO_MESSAGES.to_string())));
    assert!(!h.view.contains(&ViewEvent::Scrolled));
}

#[tokio::test]
async fn test_polling_survives_failed_fetches() {
    let h = Harness::start().await.with_tokens(Some("T1"), None).signed_in(1);
    Mock::given(method("GET"))
        .and(path("/api/messages/1/2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;

    let panel = h.chat_panel();
    assert!(panel.select_contact(contact(2, "bob")).await.is_err());
    settle(4).await;

    assert!(panel.is_polling());
    assert!(h.hits("/api/messages/1/2").await >= 3);
}

#[tokio::test]
async fn test_blank_message_makes_no_request() {
    let h = Harness::start().await.with_tokens(Some("T1"), None).signed_in(1);
    mount_messages(&h, 2, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/messages/send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .expect(0)
        .mount(&h.server)
        .await;

    let panel = h.chat_panel();
    // No contact selected yet
    assert!(!panel.send_message("hello").await.unwrap());

    panel.select_contact(contact(2, "bob")).await.unwrap();
    assert!(!panel.send_message("").await.unwrap());
    assert!(!panel.send_message("   \t ").await.unwrap());
    assert!(!h.view.contains(&ViewEvent::InputCleared));
}

#[tokio::test]
async fn test_sending_posts_form_clears_input_and_refetches() {
    let h = Harness::start().await.with_tokens(Some("T1"), None).signed_in(1);
    mount_messages(&h, 2, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/messages/send"))
        .and(body_string_contains("fromUserId=1"))
        .and(body_string_contains("toUserId=2"))
        .and(body_string_contains("content=see+you+soon"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .expect(1)
        .mount(&h.server)
        .await;

    let panel = h.chat_panel();
    panel.select_contact(contact(2, "bob")).await.unwrap();
    let before = h.hits("/api/messages/1/2").await;

    assert!(panel.send_message("  see you soon ").await.unwrap());
    assert!(h.view.contains(&ViewEvent::InputCleared));
    assert!(h.hits("/api/messages/1/2").await > before);
}

#[tokio::test]
async fn test_dropping_panel_stops_polling() {
    let h = Harness::start().await.with_tokens(Some("T1"), None).signed_in(1);
    mount_messages(&h, 2, json!([])).await;

    let panel = h.chat_panel();
    panel.select_contact(contact(2, "bob")).await.unwrap();
    drop(panel);

    settle(1).await;
    let after_drop = h.hits("/api/messages/1/2").await;
    settle(4).await;
    assert_eq!(h.hits("/api/messages/1/2").await, after_drop);
}

#[tokio::test]
async fn test_rejected_send_still_clears_input_and_refetches() {
    let h = Harness::start().await.with_tokens(Some("T1"), None).signed_in(1);
    mount_messages(&h, 2, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/messages/send"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&h.server)
        .await;

    let panel = h.chat_panel();
    panel.select_contact(contact(2, "bob")).await.unwrap();
    let before = h.hits("/api/messages/1/2").await;

    assert!(panel.send_message("hello").await.unwrap());
    assert!(h.view.contains(&ViewEvent::InputCleared));
    assert_eq!(h.hits("/api/messages/1/2").await, before + 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_selections_leave_a_live_timer() {
    let h = Harness::start().await.with_tokens(Some("T1"), None).signed_in(1);
    mount_messages(&h, 2, json!([{"sender": {"userId": 2}, "messageText": "from bob"}])).await;
    mount_messages(&h, 3, json!([{"sender": {"userId": 3}, "messageText": "from carol"}])).await;

    let panel = h.chat_panel();
    let selections: Vec<_> = (0..10)
        .map(|i| {
            let panel = panel.clone();
            let target = if i % 2 == 0 { contact(2, "bob") } else { contact(3, "carol") };
            tokio::spawn(async move { panel.select_contact(target).await })
        })
        .collect();
    for selection in selections {
        selection.await.unwrap().unwrap();
    }

    let polled = panel.polling_contact().unwrap();
    let rendered = |h: &Harness| {
        h.view
            .events()
            .into_iter()
            .filter(|e| matches!(e, ViewEvent::Messages(_)))
            .count()
    };
    let before = rendered(&h);
    settle(4).await;

    // The surviving timer renders; its results are not treated as stale
    assert!(rendered(&h) > before);
    assert_eq!(panel.polling_contact(), Some(polled));
}
