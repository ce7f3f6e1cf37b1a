mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{multipart, TestApp};
use devnet_backend::model::content::{Content, ContentType, ExtraFields};

#[tokio::test]
async fn test_search_matches_users_and_legacy_titles() {
    let app = TestApp::new();
    let (owner, _) = app.user("borrowmaster").await;

    let mut legacy = Content::new(
        owner,
        ExtraFields::from_parts(ContentType::Post, json!({ "postTitle": "Borrow checker (deep dive)" })).unwrap(),
    );
    legacy.title = String::new();
    app.content(owner, legacy).await;
    app.content(owner, Content::new(owner, ExtraFields::empty(ContentType::Job))).await;

    let (status, body) = app.get("/api/search?q=borrow", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 1);
    let contents = body["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0]["title"], "Borrow checker (deep dive)");
    assert_eq!(contents[0]["type"], "Post");

    // regex metacharacters are matched literally
    let (_, body) = app.get("/api/search?q=%28deep", None).await;
    assert_eq!(body["contents"].as_array().unwrap().len(), 1);

    let (status, body) = app.get("/api/search?q=%20%20", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Query parameter is required");
}

#[tokio::test]
async fn test_upload_single_image_is_served_back() {
    let app = TestApp::new();
    let (_, token) = app.user("uploader").await;

    let req = multipart("/api/uploads", &token, &[("image", Some("Shot.PNG"), Some("image/png"), vec![9; 16])]);
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "File uploaded successfully");
    let url = body["imageUrl"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/image-") && url.ends_with(".png"));

    let resp = tower::ServiceExt::oneshot(app.router.clone(), common::request("GET", &url, None, None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_upload_rejections() {
    let app = TestApp::with_uploads(|config| {
        config.max_file_size = 1024;
        config.max_files = 2;
    });
    let (_, token) = app.user("uploader").await;

    let (status, body) = app
        .send(multipart("/api/uploads", &token, &[("image", Some("notes.txt"), Some("text/plain"), b"hello".to_vec())]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Only image files are allowed!");

    let (status, _) = app
        .send(multipart("/api/uploads", &token, &[("image", Some("big.png"), Some("image/png"), vec![0; 2048])]))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (status, body) = app.send(multipart("/api/uploads", &token, &[("other", None, None, b"x".to_vec())])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file uploaded");

    let three: Vec<_> = (0..3).map(|_| ("images", Some("a.png"), Some("image/png"), vec![1u8; 8])).collect();
    let (status, body) = app.send(multipart("/api/uploads/multiple", &token, &three)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Too many files. Maximum is 2.");

    let two: Vec<_> = (0..2).map(|_| ("images", Some("a.png"), Some("image/png"), vec![1u8; 8])).collect();
    let (status, body) = app.send(multipart("/api/uploads/multiple", &token, &two)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imageUrls"].as_array().unwrap().len(), 2);
    assert_eq!(body["message"], "2 files uploaded successfully");
}

#[tokio::test]
async fn test_uploads_require_token_and_unknown_routes_are_json() {
    let app = TestApp::new();
    let (status, _) = app.send(common::request("POST", "/api/uploads", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get("/api/nothing-here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");

    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
