#![allow(clippy::unwrap_used)]
// Integration tests for `NotificationClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shakwa_api::{Error, NotificationClient, RecordId, Session};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, NotificationClient) {
    let server = MockServer::start().await;
    let origin = Url::parse(&server.uri()).unwrap();
    let session = Session::with_token(SecretString::from("trader-token".to_string()));
    let client =
        NotificationClient::with_client(reqwest::Client::new(), &origin, "/api", session).unwrap();
    (server, client)
}

fn page_body() -> serde_json::Value {
    json!({
        "notifications": [
            {
                "id": 3,
                "title_ar": "تم تعيين الشكوى",
                "title_en": "Complaint assigned",
                "message_ar": "تم تعيين الشكوى رقم 19 للجنة الفنية",
                "message_en": "Complaint #19 was assigned to the technical committee",
                "is_read": false,
                "action_url": "/complaints/19",
                "created_at": "2026-03-01T10:00:00Z"
            },
            {
                "id": 2,
                "title_en": "Payment reviewed",
                "message_en": "Your payment receipt was approved",
                "is_read": true,
                "created_at": "2026-02-28T08:00:00Z"
            }
        ],
        "unread_count": 5,
        "total": 12
    })
}

// ── List ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_notifications() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .and(query_param("skip", "0"))
        .and(query_param("limit", "20"))
        .and(header("authorization", "Bearer trader-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body()))
        .expect(1)
        .mount(&server)
        .await;

    let page = client.list_notifications(0, 20).await.unwrap();

    assert_eq!(page.notifications.len(), 2);
    assert_eq!(page.unread_count, 5);
    assert_eq!(page.total, Some(12));
    assert_eq!(page.notifications[0].id, RecordId::Number(3));
    assert_eq!(page.notifications[0].action_url.as_deref(), Some("/complaints/19"));
    assert!(page.notifications[1].is_read);
    assert!(page.notifications[1].title_ar.is_empty());
}

#[tokio::test]
async fn test_unread_count() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/notifications/unread-count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unread_count": 9 })))
        .mount(&server)
        .await;

    assert_eq!(client.unread_count().await.unwrap(), 9);
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_mark_read() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/notifications/3/read"))
        .and(header("authorization", "Bearer trader-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    client.mark_read("3").await.unwrap();
}

#[tokio::test]
async fn test_mark_all_read() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/notifications/mark-all-read"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.mark_all_read().await.unwrap();
}

#[tokio::test]
async fn test_delete_notification() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/notifications/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_notification("3").await.unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_session_expired() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_notifications(0, 20).await;
    assert!(
        matches!(result, Err(Error::SessionExpired)),
        "expected SessionExpired, got: {result:?}"
    );
}

#[tokio::test]
async fn test_not_found_with_detail_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/notifications/99"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "detail": "Notification not found", "code": "not_found" })),
        )
        .mount(&server)
        .await;

    let err = client.delete_notification("99").await.unwrap_err();
    assert!(err.is_not_found());
    match err {
        Error::Api {
            status,
            ref message,
            ref code,
        } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Notification not found");
            assert_eq!(code.as_deref(), Some("not_found"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_with_plain_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/notifications/mark-all-read"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client.mark_all_read().await.unwrap_err();
    assert!(err.is_transient());
    assert!(matches!(err, Error::Api { status: 502, ref message, .. } if message == "bad gateway"));
}

#[tokio::test]
async fn test_malformed_page_keeps_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    match client.list_notifications(0, 20).await {
        Err(Error::Deserialization { body, .. }) => assert!(body.contains("maintenance")),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_credential_skips_request() {
    let server = MockServer::start().await;
    let origin = Url::parse(&server.uri()).unwrap();
    let client = NotificationClient::with_client(
        reqwest::Client::new(),
        &origin,
        "/api",
        Session::anonymous(),
    )
    .unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = client.list_notifications(0, 20).await;
    assert!(matches!(result, Err(Error::MissingCredential)));
}
