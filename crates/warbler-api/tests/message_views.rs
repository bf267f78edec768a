mod common;

use axum::http::StatusCode;
use common::TestClient;
use warbler_api::flash::MAX_FLASHES;

#[tokio::test]
async fn test_add_delete_message() {
    let (mut c, testuser, _) = TestClient::with_users();
    c.login_as(testuser.id);

    let resp = c.post("/messages/new", &[("text", "Hello")]).await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location.as_deref(), Some("/users/1"));

    let messages = c.state.db.user_messages(testuser.id, 100).unwrap();
    assert_eq!(messages.len(), 1);
    let msg = &messages[0];
    assert_eq!(msg.text, "Hello");

    let resp = c.post(&format!("/messages/{}/delete", msg.id), &[]).await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert!(c.state.db.get_message(msg.id).unwrap().is_none());

    // Logged out: posting is refused
    c.logout();
    let resp = c.post("/messages/new", &[("text", "yeet")]).await;
    assert_eq!(resp.status, StatusCode::FOUND);
    let resp = c.post_follow("/messages/new", &[("text", "yeet")]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Access unauthorized."));
    assert!(c.state.db.user_messages(testuser.id, 100).unwrap().is_empty());

    // Logged out: deleting is refused
    let msg = c.state.db.create_message(testuser.id, "yeet").unwrap();
    let resp = c.post(&format!("/messages/{}/delete", msg.id), &[]).await;
    assert_eq!(resp.status, StatusCode::FOUND);
    let resp = c.post_follow(&format!("/messages/{}/delete", msg.id), &[]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Access unauthorized."));
    assert!(c.state.db.get_message(msg.id).unwrap().is_some());
}

#[tokio::test]
async fn test_cannot_delete_other_users_message() {
    let (mut c, testuser, testuser2) = TestClient::with_users();
    c.login_as(testuser2.id);

    let msg = c.state.db.create_message(testuser.id, "yeet").unwrap();

    let resp = c.post(&format!("/messages/{}/delete", msg.id), &[]).await;
    assert_eq!(resp.status, StatusCode::FOUND);
    let resp = c.post_follow(&format!("/messages/{}/delete", msg.id), &[]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Access unauthorized."));

    assert!(c.state.db.get_message(msg.id).unwrap().is_some());
}

#[tokio::test]
async fn test_unauthorized_flash_shows_once() {
    let (mut c, _, _) = TestClient::with_users();

    let resp = c.post_follow("/messages/new", &[("text", "yeet")]).await;
    assert!(resp.body.contains("Access unauthorized."));

    let resp = c.get("/").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(!resp.body.contains("Access unauthorized."));
}

#[tokio::test]
async fn test_add_message_logged_out_with_empty_form() {
    let (mut c, _, _) = TestClient::with_users();

    let resp = c.post("/messages/new", &[]).await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location.as_deref(), Some("/"));

    let resp = c.get("/").await;
    assert!(resp.body.contains("Access unauthorized."));
}

#[tokio::test]
async fn test_repeated_unauthorized_flashes_are_capped() {
    let (mut c, _, _) = TestClient::with_users();

    for _ in 0..MAX_FLASHES * 3 {
        c.post("/messages/new", &[]).await;
    }

    let resp = c.get("/").await;
    assert_eq!(resp.body.matches("Access unauthorized.").count(), MAX_FLASHES);
}

#[tokio::test]
async fn test_invalid_message_rerenders_form() {
    let (mut c, testuser, _) = TestClient::with_users();
    c.login_as(testuser.id);

    let too_long = "x".repeat(141);
    let resp = c.post("/messages/new", &[("text", too_long.as_str())]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Invalid message"));

    let resp = c.post("/messages/new", &[("text", "")]).await;
    assert_eq!(resp.status, StatusCode::OK);

    // Surrounding whitespace does not count towards the limit
    let padded = format!("hi{}", " ".repeat(140));
    let resp = c.post("/messages/new", &[("text", padded.as_str())]).await;
    assert_eq!(resp.status, StatusCode::FOUND);
    let messages = c.state.db.user_messages(testuser.id, 100).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "hi");
}

#[tokio::test]
async fn test_show_message() {
    let (mut c, testuser, _) = TestClient::with_users();
    let msg = c.state.db.create_message(testuser.id, "<b>bold</b> claim").unwrap();

    let resp = c.get(&format!("/messages/{}", msg.id)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("&lt;b&gt;bold&lt;/b&gt; claim"));
    assert!(!resp.body.contains("/delete"));

    c.login_as(testuser.id);
    let resp = c.get(&format!("/messages/{}", msg.id)).await;
    assert!(resp.body.contains(&format!("/messages/{}/delete", msg.id)));

    let resp = c.get("/messages/999").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_likes() {
    let (mut c, testuser, testuser2) = TestClient::with_users();
    let msg = c.state.db.create_message(testuser.id, "like me").unwrap();

    // Own messages cannot be liked
    c.login_as(testuser.id);
    let resp = c.post(&format!("/users/add_like/{}", msg.id), &[]).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    c.login_as(testuser2.id);
    let resp = c.post(&format!("/users/add_like/{}", msg.id), &[]).await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(c.state.db.liked_message_ids(testuser2.id).unwrap(), vec![msg.id]);

    let resp = c.get(&format!("/users/{}/likes", testuser2.id)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("like me"));

    // Second press unlikes
    c.post(&format!("/users/add_like/{}", msg.id), &[]).await;
    assert!(c.state.db.liked_message_ids(testuser2.id).unwrap().is_empty());
}
