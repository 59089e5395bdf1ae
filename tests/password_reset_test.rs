//! HTTP tests for the password reset request and confirm steps.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use accounts_api::config::{RESET_CONFIRM_MESSAGE, RESET_REQUEST_MESSAGE};
use accounts_api::utils::templates::RESET_QR_FILENAME;
use common::{error_fields, years_ago, RecordingMailer, TestApp, PASSWORD};

const NEW_PASSWORD: &str = "Brandnew-pass9";

async fn request_reset(app: &TestApp, email: &str) -> (StatusCode, Value) {
    app.request(
        Method::POST,
        "/api/user/password-reset/",
        Some(json!({ "email": email })),
        None,
    )
    .await
}

async fn confirm(
    app: &TestApp,
    uid: &str,
    token: &str,
    new_password: &str,
    repeat: &str,
) -> (StatusCode, Value) {
    app.request(
        Method::POST,
        "/api/user/password-reset/confirm/",
        Some(json!({
            "uid": uid,
            "token": token,
            "new_password": new_password,
            "re_new_password": repeat,
        })),
        None,
    )
    .await
}

/// Pull `(uid, token)` out of the last reset email's link.
fn link_parts(app: &TestApp) -> (String, String) {
    let sent = app.mailer.sent();
    let email = sent.last().expect("a reset email was sent");
    let link = email
        .body
        .lines()
        .find(|line| line.contains("/password-reset/confirm/"))
        .expect("reset link in body");

    let mut parts = link.trim().rsplitn(3, '/');
    let token = parts.next().unwrap().to_string();
    let uid = parts.next().unwrap().to_string();
    (uid, token)
}

async fn app_with_user() -> TestApp {
    let app = TestApp::new();
    let (status, _) = app.register("a@x.com", years_ago(30)).await;
    assert_eq!(status, StatusCode::CREATED);
    app
}

#[tokio::test]
async fn test_request_unknown_and_known_email_look_the_same() {
    let app = app_with_user().await;

    let (known_status, known_body) = request_reset(&app, "a@x.com").await;
    let (unknown_status, unknown_body) = request_reset(&app, "nobody@x.com").await;

    assert_eq!(known_status, StatusCode::OK);
    assert_eq!(unknown_status, StatusCode::OK);
    assert_eq!(known_body, unknown_body);
    assert_eq!(known_body["message"], RESET_REQUEST_MESSAGE);

    assert_eq!(app.mailer.sent().len(), 1);
}

#[tokio::test]
async fn test_request_sends_link_to_account_email() {
    let app = app_with_user().await;
    request_reset(&app, "a@X.com").await;

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "a@x.com");
    assert!(sent[0]
        .body
        .contains(&format!("{}/password-reset/confirm/", app.config.frontend_url)));
}

#[tokio::test]
async fn test_request_attaches_qr_code_of_link() {
    let app = app_with_user().await;
    request_reset(&app, "a@x.com").await;

    let sent = app.mailer.sent();
    let qr = sent[0]
        .attachment(RESET_QR_FILENAME)
        .expect("reset email carries a QR code");
    assert_eq!(qr.content_type, "image/png");
    assert!(qr.content.starts_with(b"\x89PNG"));
}

#[tokio::test]
async fn test_request_skips_inactive_account() {
    let app = app_with_user().await;
    app.users.update("a@x.com", |u| u.is_active = false);

    let (status, _) = request_reset(&app, "a@x.com").await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_request_send_failure_is_500_only_for_real_account() {
    let app = TestApp::with_mailer(RecordingMailer::failing());
    app.register("a@x.com", years_ago(30)).await;

    let (status, body) = request_reset(&app, "a@x.com").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "EMAIL_DISPATCH_ERROR");

    let (status, _) = request_reset(&app, "nobody@x.com").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_confirm_changes_password_once() {
    let app = app_with_user().await;
    request_reset(&app, "a@x.com").await;
    let (uid, token) = link_parts(&app);

    let (status, body) = confirm(&app, &uid, &token, NEW_PASSWORD, NEW_PASSWORD).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], RESET_CONFIRM_MESSAGE);

    let (status, _) = app.login("a@x.com", PASSWORD).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    app.token_for("a@x.com", NEW_PASSWORD).await;

    // Same link again: bound to the old password hash
    let (status, body) = confirm(&app, &uid, &token, "Another-pass77", "Another-pass77").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["token"]);
    app.token_for("a@x.com", NEW_PASSWORD).await;
}

#[tokio::test]
async fn test_confirm_mismatch_leaves_password() {
    let app = app_with_user().await;
    request_reset(&app, "a@x.com").await;
    let (uid, token) = link_parts(&app);
    let before = app.users.get_by_email("a@x.com").unwrap().password_hash;

    let (status, body) = confirm(&app, &uid, &token, NEW_PASSWORD, "Brandnew-pass8").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["re_new_password"]);

    assert_eq!(app.users.get_by_email("a@x.com").unwrap().password_hash, before);
    app.token_for("a@x.com", PASSWORD).await;
}

#[tokio::test]
async fn test_confirm_rejects_weak_password() {
    let app = app_with_user().await;
    request_reset(&app, "a@x.com").await;
    let (uid, token) = link_parts(&app);

    for weak in ["12345678", "password", "short"] {
        let (status, body) = confirm(&app, &uid, &token, weak, weak).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{weak} accepted");
        assert_eq!(error_fields(&body), vec!["new_password"]);
    }

    app.token_for("a@x.com", PASSWORD).await;
}

#[tokio::test]
async fn test_confirm_rejects_unknown_uid() {
    let app = app_with_user().await;
    request_reset(&app, "a@x.com").await;
    let (_, token) = link_parts(&app);

    let (status, body) = confirm(&app, "bm9ib2R5", &token, NEW_PASSWORD, NEW_PASSWORD).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["uid"]);
}

#[tokio::test]
async fn test_confirm_rejects_forged_token() {
    let app = app_with_user().await;
    request_reset(&app, "a@x.com").await;
    let (uid, _) = link_parts(&app);

    let (status, body) = confirm(&app, &uid, "forged.token.value", NEW_PASSWORD, NEW_PASSWORD).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["token"]);
}
