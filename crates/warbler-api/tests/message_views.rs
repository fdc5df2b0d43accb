mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{TestApp, assert_unauthorized, body_json, location};
use warbler_types::api::HomeResponse;
use warbler_types::models::Message;

#[tokio::test]
async fn add_message() {
    let app = TestApp::new();
    let u = app.seed_user("testuser");
    let cookie = app.session_for(&u);

    let resp = app
        .post_json("/messages/new", Some(&cookie), json!({ "text": "Hello" }))
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/users/{}", u.id));

    let messages = app.db().messages_for_user(u.id).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "Hello");
}

#[tokio::test]
async fn add_message_anonymous_is_refused() {
    let app = TestApp::new();
    app.seed_user("testuser");

    let resp = app.post_json("/messages/new", None, json!({ "text": "Hello" })).await;
    assert_unauthorized(&resp);
    assert_eq!(app.count("messages"), 0);
}

#[tokio::test]
async fn add_message_validates_length() {
    let app = TestApp::new();
    let u = app.seed_user("testuser");
    let cookie = app.session_for(&u);

    for text in ["   ".to_string(), "x".repeat(141)] {
        let resp = app
            .post_json("/messages/new", Some(&cookie), json!({ "text": text }))
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    let resp = app
        .post_json("/messages/new", Some(&cookie), json!({ "text": "x".repeat(140) }))
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.count("messages"), 1);
}

#[tokio::test]
async fn show_message() {
    let app = TestApp::new();
    let u = app.seed_user("testuser");
    let m = app.seed_message(&u, "this is a test message");

    let resp = app.get(&format!("/messages/{}", m.id), None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let shown: Message = body_json(resp).await;
    assert_eq!(shown.text, "this is a test message");
    assert_eq!(shown.user_id, u.id);
    assert_eq!(shown.username, "testuser");

    let resp = app.get("/messages/99999", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_own_message() {
    let app = TestApp::new();
    let u = app.seed_user("testuser");
    let m = app.seed_message(&u, "regrettable");
    let cookie = app.session_for(&u);

    let resp = app.post(&format!("/messages/{}/delete", m.id), Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(app.db().get_message(m.id).unwrap().is_none());
}

#[tokio::test]
async fn delete_someone_elses_message_is_refused() {
    let app = TestApp::new();
    let author = app.seed_user("author");
    let other = app.seed_user("other");
    let m = app.seed_message(&author, "mine");

    let resp = app
        .post(&format!("/messages/{}/delete", m.id), Some(&app.session_for(&other)))
        .await;
    assert_unauthorized(&resp);

    let resp = app.post(&format!("/messages/{}/delete", m.id), None).await;
    assert_unauthorized(&resp);

    assert!(app.db().get_message(m.id).unwrap().is_some());
}

#[tokio::test]
async fn liked_message_count_on_profile_tracks_toggles() {
    let app = TestApp::new();
    let author = app.seed_user("test111");
    let liker = app.seed_user("testliker");
    let m1 = app.seed_message(&author, "this is a test message");
    app.seed_message(&author, "warble is fun");
    let cookie = app.session_for(&liker);

    app.post(&format!("/messages/{}/like", m1.id), Some(&cookie)).await;
    assert_eq!(app.db().user_stats(liker.id).unwrap().likes, 1);

    app.post(&format!("/messages/{}/like", m1.id), Some(&cookie)).await;
    assert_eq!(app.db().user_stats(liker.id).unwrap().likes, 0);
    assert_eq!(app.count("likes"), 0);
}

#[tokio::test]
async fn home_timeline_shows_followed_users() {
    let app = TestApp::new();
    let me = app.seed_user("me");
    let friend = app.seed_user("friend");
    let stranger = app.seed_user("stranger");
    app.db().follow(me.id, friend.id).unwrap();

    app.seed_message(&me, "mine");
    app.seed_message(&friend, "theirs");
    app.seed_message(&stranger, "not for me");

    let home: HomeResponse = body_json(app.get("/", Some(&app.session_for(&me))).await).await;
    let texts: Vec<_> = home.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["theirs", "mine"]);

    let anon: HomeResponse = body_json(app.get("/", None).await).await;
    assert!(anon.user.is_none());
    assert!(anon.messages.is_empty());
}
