#![allow(clippy::unwrap_used)]
// Integration tests for `Mutation` and the `League` facade.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crease_core::{
    ApiClient, ChannelNotifier, ClientFactory, CoreError, League, MessageOverrides, Mutation,
    MutationOptions, Notification, RecordId, Resource, RetryPolicy, StaticToken,
    TransportConfig, Variant,
};

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ClientFactory::new(
        &server.uri(),
        &TransportConfig::default(),
        Arc::new(StaticToken::new("tok")),
    )
    .unwrap()
    .with_retry(RetryPolicy::none())
    .client(true);
    (server, client)
}

// ── Mutation ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_post_notifies_default_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/game/sponsor/"))
        .and(body_json(json!({"name": "Acme"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1, "name": "Acme"})))
        .expect(1)
        .mount(&server)
        .await;

    let (notifier, mut rx) = ChannelNotifier::new();
    let mutation = Mutation::new(client, Arc::new(notifier), MutationOptions::default());

    let body = mutation
        .post("/game/sponsor/", &json!({"name": "Acme"}))
        .await
        .unwrap();
    assert_eq!(body["id"], 1);
    assert_eq!(rx.try_recv().unwrap(), Notification::success("Created successfully"));
    assert_eq!(mutation.state().error, None);
    assert!(!mutation.state().loading);
}

#[tokio::test]
async fn test_overlapping_calls_stay_loading_until_last_settles() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/game/sponsor/"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"id": 1}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/game/player/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 2})))
        .mount(&server)
        .await;

    let mutation = Mutation::new(
        client,
        Arc::new(ChannelNotifier::new().0),
        MutationOptions::default().silent(),
    );

    let body = json!({});
    let slow = mutation.post("/game/sponsor/", &body);
    let fast = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        mutation.post("/game/player/", &json!({})).await.unwrap();
        assert!(mutation.state().loading, "slow call is still in flight");
    };
    let (slow, ()) = tokio::join!(slow, fast);

    slow.unwrap();
    assert!(!mutation.state().loading);
    assert_eq!(mutation.state().error, None);
}

#[tokio::test]
async fn test_failure_notifies_and_stores_error() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/game/teams/5/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "bad name"})))
        .mount(&server)
        .await;

    let errors = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&errors);
    let (notifier, mut rx) = ChannelNotifier::new();
    let mutation = Mutation::new(
        client,
        Arc::new(notifier),
        MutationOptions::default().on_error(move |e| {
            assert_eq!(e.status(), Some(400));
            seen.fetch_add(1, Ordering::SeqCst);
        }),
    );

    let err = mutation
        .put("/game/teams/", &RecordId::from(5), &json!({"name": ""}))
        .await
        .unwrap_err();

    let n = rx.try_recv().unwrap();
    assert_eq!(n.variant, Variant::Error);
    assert_eq!(n.title, "Request failed");
    assert_eq!(n.description.as_deref(), Some(err.to_string().as_str()));
    assert_eq!(mutation.state().error, Some(err));
    assert_eq!(errors.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_message_precedence() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let (notifier, mut rx) = ChannelNotifier::new();
    let mutation = Mutation::new(
        client,
        Arc::new(notifier),
        MutationOptions::default().success_message("Gone"),
    );

    mutation
        .delete("/game/voting/", &RecordId::from(3))
        .await
        .unwrap();
    assert_eq!(rx.try_recv().unwrap().title, "Gone");

    mutation
        .delete_with(
            "/game/voting/",
            &RecordId::from(3),
            MessageOverrides {
                success: Some("Poll removed".into()),
                error: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(rx.try_recv().unwrap().title, "Poll removed");
}

#[tokio::test]
async fn test_silent_mutation_still_calls_back() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let (notifier, mut rx) = ChannelNotifier::new();
    let mutation = Mutation::new(
        client,
        Arc::new(notifier),
        MutationOptions::default().silent().on_success(move |body| {
            assert_eq!(body["ok"], true);
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    mutation.post("/user/", &json!({"email": "a@b.c"})).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(rx.try_recv().is_err());
}

// ── League ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_league_rejects_invalid_payload_before_request() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let league = League::new(client);
    let err = league
        .create(Resource::Teams, &json!({"name": "  "}))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        CoreError::ValidationFailed {
            message: "Team name is required".into()
        }
    );
}

#[tokio::test]
async fn test_league_update_uses_item_endpoint_and_label() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/game/tournament/2/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2, "name": "Cup"})))
        .expect(1)
        .mount(&server)
        .await;

    let (notifier, mut rx) = ChannelNotifier::new();
    let league = League::new(client).with_notifier(Arc::new(notifier));

    league
        .update(Resource::Tournaments, &RecordId::from(2), &json!({"name": "Cup"}))
        .await
        .unwrap();
    assert_eq!(
        rx.try_recv().unwrap(),
        Notification::success("Tournament updated successfully")
    );
}

#[tokio::test]
async fn test_league_collection_targets_resource_path() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/game/player/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&server)
        .await;

    let league = League::new(client);
    let players = league.collection(Resource::Players);
    players.mount().await.unwrap();
    assert_eq!(players.items().len(), 1);
}
