mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{multipart, TestApp};
use devnet_backend::model::content::{Content, ContentType, ExtraFields};
use devnet_backend::service::MAX_WRITE_ATTEMPTS;
use tower::ServiceExt;

fn question() -> Content {
    Content::new(bson::oid::ObjectId::new(), ExtraFields::empty(ContentType::Question))
}

fn post(payload: serde_json::Value) -> Content {
    Content::new(bson::oid::ObjectId::new(), ExtraFields::from_parts(ContentType::Post, payload).unwrap())
}

#[tokio::test]
async fn test_create_content_from_multipart() {
    let app = TestApp::new();
    let (_, token) = app.user("alice").await;

    let req = multipart(
        "/api/contents",
        &token,
        &[
            ("contentType", None, None, b"Post".to_vec()),
            ("title", None, None, b"Lifetimes explained".to_vec()),
            ("tags", None, None, b"rust, lifetimes".to_vec()),
            ("extraFields", None, None, br#"{"description":"short read"}"#.to_vec()),
            ("image", Some("cover.png"), Some("image/png"), vec![1, 2, 3, 4]),
        ],
    );
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Content created");
    assert_eq!(body["saved"]["title"], "Lifetimes explained");
    assert_eq!(body["saved"]["tags"], json!(["rust", "lifetimes"]));
    assert!(body["saved"]["image"].as_str().unwrap().starts_with("/uploads/image-"));
}

#[tokio::test]
async fn test_create_content_requires_type_and_token() {
    let app = TestApp::new();
    let (_, token) = app.user("alice").await;

    let (status, body) = app.send(multipart("/api/contents", &token, &[("title", None, None, b"x".to_vec())])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "contentType is required");

    let (status, body) = app.json("PATCH", &format!("/api/contents/{}", bson::oid::ObjectId::new()), None, json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Access denied. No token provided.");
}

#[tokio::test]
async fn test_list_paginates_newest_first() {
    let app = TestApp::new();
    let (owner, _) = app.user("alice").await;
    for i in 0..25 {
        let mut c = post(json!({}));
        c.title = format!("post {}", i);
        c.created_at = format!("2024-01-01T00:00:{:02}.000Z", i);
        app.content(owner, c).await;
    }

    let (status, body) = app.get("/api/contents?page=2&limit=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["contents"].as_array().unwrap().len(), 10);
    assert_eq!(body["contents"][0]["title"], "post 14");
    assert_eq!(body["pagination"], json!({ "total": 25, "page": 2, "pages": 3 }));

    let (_, body) = app.get("/api/contents?page=abc&limit=-4", None).await;
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["contents"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_like_and_dislike_are_exclusive_toggles() {
    let app = TestApp::new();
    let (owner, _) = app.user("alice").await;
    let (bob, token) = app.user("bob").await;
    let id = app.content(owner, post(json!({}))).await.id.unwrap();
    let uri = |action: &str| format!("/api/contents/{}/{}", id, action);

    let (status, body) = app.json("POST", &uri("like"), Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["likes"], json!([bob.to_hex()]));

    let (_, body) = app.json("POST", &uri("dislike"), Some(&token), json!({})).await;
    assert_eq!(body["content"]["likes"], json!([]));
    assert_eq!(body["content"]["dislikes"], json!([bob.to_hex()]));

    let (_, body) = app.json("POST", &uri("dislike"), Some(&token), json!({})).await;
    assert_eq!(body["content"]["dislikes"], json!([]));
}

#[tokio::test]
async fn test_save_toggle_and_saved_listing() {
    let app = TestApp::new();
    let (owner, _) = app.user("alice").await;
    let (_, token) = app.user("bob").await;
    let id = app.content(owner, post(json!({}))).await.id.unwrap();

    let (_, body) = app.json("POST", &format!("/api/contents/{}/save", id), Some(&token), json!({})).await;
    assert_eq!(body["message"], "Content saved successfully");
    let (_, saved) = app.get("/api/contents/saved", Some(&token)).await;
    assert_eq!(saved.as_array().unwrap().len(), 1);

    let (_, body) = app.json("POST", &format!("/api/contents/{}/save", id), Some(&token), json!({})).await;
    assert_eq!(body["message"], "Content unsaved successfully");
    let (_, saved) = app.get("/api/contents/saved", Some(&token)).await;
    assert!(saved.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_repost_creates_and_removes_copy() {
    let app = TestApp::new();
    let (owner, _) = app.user("alice").await;
    let (bob, token) = app.user("bob").await;
    let id = app.content(owner, post(json!({ "title": "orig" }))).await.id.unwrap();
    let uri = format!("/api/contents/{}/repost", id);

    let (status, body) = app.json("POST", &uri, Some(&token), json!({ "repostNote": "worth a read" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["content"]["reposts"], json!([bob.to_hex()]));
    assert_eq!(body["repost"]["originalContentId"], id.to_hex());
    assert_eq!(body["repost"]["repostNote"], "worth a read");
    assert_eq!(app.contents.all().len(), 2);

    let (_, reposted) = app.get("/api/contents/reposted", Some(&token)).await;
    assert_eq!(reposted.as_array().unwrap().len(), 1);

    let (status, body) = app.json("POST", &uri, Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Content unreposted successfully");
    assert_eq!(app.contents.all().len(), 1);
}

#[tokio::test]
async fn test_answer_vote_and_accept_flow() {
    let app = TestApp::new();
    let (asker, asker_token) = app.user("asker").await;
    let (_, answerer_token) = app.user("answerer").await;
    let (_, voter_token) = app.user("voter").await;
    let id = app.content(asker, question()).await.id.unwrap();
    let uri = |action: &str| format!("/api/contents/{}/{}", id, action);

    let (_, body) = app.json("POST", &uri("comment"), Some(&voter_token), json!({ "text": "which edition?" })).await;
    assert_eq!(body["comments"][0]["isAnswer"], false);
    let (status, body) = app.json("POST", &uri("answer"), Some(&answerer_token), json!({ "text": "2021" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comments"][1]["username"], "answerer");
    assert_eq!(body["comments"][1]["isAnswer"], true);

    let vote = |direction: &str| json!({ "commentIndex": 1, "direction": direction });
    let (_, body) = app.json("POST", &uri("vote-answer"), Some(&voter_token), vote("up")).await;
    assert_eq!(body["message"], "Vote up registered successfully");
    assert_eq!(body["content"]["comments"][1]["votes"], 1);

    let (status, body) = app.json("POST", &uri("vote-answer"), Some(&voter_token), vote("up")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You have already upvoted this answer");

    let (_, body) = app.json("POST", &uri("vote-answer"), Some(&voter_token), vote("down")).await;
    assert_eq!(body["content"]["comments"][1]["votes"], -1);

    let (status, _) = app.json("POST", &uri("vote-answer"), Some(&voter_token), json!({ "commentIndex": 0, "direction": "up" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.json("POST", &uri("accept-answer"), Some(&voter_token), json!({ "commentIndex": 1 })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.json("POST", &uri("accept-answer"), Some(&asker_token), json!({ "commentIndex": 1 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["solved"], true);
    assert_eq!(body["content"]["comments"][1]["acceptedAnswer"], true);

    let (_, unanswered) = app.get("/api/contents/questions/unanswered", None).await;
    assert!(unanswered.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_only_owner_updates_and_deletes() {
    let app = TestApp::new();
    let (owner, owner_token) = app.user("alice").await;
    let (_, other_token) = app.user("bob").await;
    let id = app.content(owner, post(json!({ "description": "draft" }))).await.id.unwrap();
    let uri = format!("/api/contents/{}", id);

    let (status, _) = app.json("PATCH", &uri, Some(&other_token), json!({ "title": "hijack" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .json("PATCH", &uri, Some(&owner_token), json!({ "title": "Final", "extraFields": { "description": "done" } }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updatedContent"]["title"], "Final");
    assert_eq!(body["updatedContent"]["extraFields"]["description"], "done");

    let (status, _) = app.json("DELETE", &uri, Some(&other_token), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = app.json("DELETE", &uri, Some(&owner_token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Content deleted successfully");

    let (status, _) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_id_is_bad_request() {
    let app = TestApp::new();
    let (status, _) = app.get("/api/contents/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_questions_by_tags_and_trending() {
    let app = TestApp::new();
    let (owner, _) = app.user("alice").await;
    let (fan, _) = app.user("bob").await;

    let mut tagged = question();
    tagged.tags = vec!["rust".to_string()];
    tagged.title = "tagged".to_string();
    app.content(owner, tagged).await;

    let mut popular = question();
    popular.title = "popular".to_string();
    popular.likes.insert(fan);
    popular.saves.insert(fan);
    app.content(owner, popular).await;

    let (_, body) = app.get("/api/contents/questions/tags?tags=rust,go", None).await;
    let titles: Vec<&str> = body.as_array().unwrap().iter().map(|c| c["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["tagged"]);

    let (_, body) = app.get("/api/contents/questions/trending", None).await;
    assert_eq!(body[0]["title"], "popular");
}

#[tokio::test]
async fn test_create_folds_loose_form_fields_into_extra_fields() {
    let app = TestApp::new();
    let (_, token) = app.user("alice").await;

    let req = multipart(
        "/api/contents",
        &token,
        &[
            ("contentType", None, None, b"Project".to_vec()),
            ("title", None, None, b"Borrow checker visualiser".to_vec()),
            ("repositoryUrl", None, None, b"https://example.com/bcv".to_vec()),
            ("technologies", None, None, br#"["rust","wasm"]"#.to_vec()),
        ],
    );
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["saved"]["extraFields"]["repositoryUrl"], "https://example.com/bcv");
    assert_eq!(body["saved"]["extraFields"]["technologies"], json!(["rust", "wasm"]));

    // an explicit payload wins over loose fields
    let req = multipart(
        "/api/contents",
        &token,
        &[
            ("contentType", None, None, b"Job".to_vec()),
            ("company", None, None, b"Ignored Inc".to_vec()),
            ("extraFields", None, None, br#"{"company":"Acme"}"#.to_vec()),
        ],
    );
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["saved"]["extraFields"]["company"], "Acme");
}

#[tokio::test]
async fn test_update_accepts_multipart_image() {
    let app = TestApp::new();
    let (owner, owner_token) = app.user("alice").await;
    let (_, other_token) = app.user("bob").await;
    let id = app.content(owner, post(json!({ "description": "draft" }))).await.id.unwrap();
    let uri = format!("/api/contents/{}", id);
    let stored_files = || std::fs::read_dir(&app.upload_dir).map(|d| d.count()).unwrap_or(0);

    let hijack = common::multipart_with(
        "PATCH",
        &uri,
        &other_token,
        &[("image", Some("evil.png"), Some("image/png"), vec![1, 2, 3])],
    );
    let (status, _) = app.send(hijack).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(stored_files(), 0);

    let not_image = common::multipart_with(
        "PATCH",
        &uri,
        &owner_token,
        &[("image", Some("notes.txt"), Some("text/plain"), b"hello".to_vec())],
    );
    let (status, body) = app.send(not_image).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Only image files are allowed!");

    let req = common::multipart_with(
        "PATCH",
        &uri,
        &owner_token,
        &[
            ("title", None, None, b"With cover".to_vec()),
            ("extraFields", None, None, br#"{"description":"final"}"#.to_vec()),
            ("image", Some("cover.png"), Some("image/png"), vec![9, 8, 7]),
        ],
    );
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updatedContent"]["title"], "With cover");
    assert_eq!(body["updatedContent"]["extraFields"]["description"], "final");
    let image = body["updatedContent"]["image"].as_str().unwrap();
    assert!(image.starts_with("/uploads/image-"));
    assert_eq!(stored_files(), 1);
}

#[tokio::test]
async fn test_huge_page_number_returns_empty_page() {
    let app = TestApp::new();
    let (owner, _) = app.user("alice").await;
    app.content(owner, post(json!({}))).await;

    let (status, body) = app.get("/api/contents?page=9223372036854775807&limit=100", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["contents"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_failed_repost_insert_rolls_back_membership() {
    let app = TestApp::new();
    let (owner, _) = app.user("alice").await;
    let (bob, token) = app.user("bob").await;
    let id = app.content(owner, post(json!({}))).await.id.unwrap();
    let uri = format!("/api/contents/{}/repost", id);

    app.contents.fail_inserts(true);
    let (status, _) = app.json("POST", &uri, Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let original = app.contents.find(&id).unwrap();
    assert!(!original.reposts.contains(&bob));
    assert_eq!(app.contents.all().len(), 1);

    // the next attempt reposts instead of taking the unrepost branch
    app.contents.fail_inserts(false);
    let (status, body) = app.json("POST", &uri, Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Content reposted successfully");
    assert_eq!(app.contents.all().len(), 2);
}

#[tokio::test]
async fn test_stale_writes_are_retried_then_conflict() {
    let app = TestApp::new();
    let (owner, _) = app.user("alice").await;
    let (bob, token) = app.user("bob").await;
    let id = app.content(owner, post(json!({}))).await.id.unwrap();
    let uri = format!("/api/contents/{}/like", id);

    app.contents.make_stale(MAX_WRITE_ATTEMPTS - 1);
    let (status, body) = app.json("POST", &uri, Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["likes"], json!([bob.to_hex()]));

    app.contents.make_stale(MAX_WRITE_ATTEMPTS);
    let (status, body) = app.json("POST", &uri, Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");
    assert!(app.contents.find(&id).unwrap().likes.contains(&bob));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_likes_do_not_lose_updates() {
    let app = TestApp::new();
    let (owner, _) = app.user("alice").await;
    let id = app.content(owner, post(json!({}))).await.id.unwrap();

    let mut tokens = Vec::new();
    for i in 0..12 {
        tokens.push(app.user(&format!("fan{}", i)).await);
    }

    let handles: Vec<_> = tokens
        .iter()
        .map(|(_, token)| {
            let router = app.router.clone();
            let req = common::request("POST", &format!("/api/contents/{}/like", id), Some(token), Some(json!({})));
            tokio::spawn(async move { router.oneshot(req).await.unwrap().status() })
        })
        .collect();

    let mut liked = 0;
    for handle in handles {
        let status = handle.await.unwrap();
        assert!(status == StatusCode::OK || status == StatusCode::CONFLICT, "unexpected status {}", status);
        if status == StatusCode::OK {
            liked += 1;
        }
    }
    let stored = app.contents.find(&id).unwrap();
    assert_eq!(stored.likes.len(), liked);
    assert!(liked > 0);
}
