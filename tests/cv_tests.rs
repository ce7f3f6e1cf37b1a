mod common;

use axum::body::to_bytes;
use axum::http::{header, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use common::{request, TestApp};

#[tokio::test]
async fn test_first_cv_is_default_and_default_moves() {
    let app = TestApp::new();
    let (_, token) = app.user("ada").await;

    let (status, first) = app.json("POST", "/api/cv-profile", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["title"], "CV 1");
    assert_eq!(first["isDefault"], true);
    assert_eq!(first["fullName"], "ada Tester");

    let (_, second) = app.json("POST", "/api/cv-profile", Some(&token), json!({ "title": "Backend" })).await;
    assert_eq!(second["isDefault"], false);

    let second_id = second["_id"].as_str().unwrap();
    let (status, body) = app.json("PUT", &format!("/api/cv-profile/default/{}", second_id), Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isDefault"], true);

    let (_, all) = app.get("/api/cv-profile/all", Some(&token)).await;
    let defaults: Vec<_> = all.as_array().unwrap().iter().filter(|cv| cv["isDefault"] == true).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0]["_id"], second_id);

    let (_, current) = app.get("/api/cv-profile", Some(&token)).await;
    assert_eq!(current["title"], "Backend");
}

#[tokio::test]
async fn test_cv_cap_and_duplicate() {
    let app = TestApp::new();
    let (_, token) = app.user("ada").await;

    let (_, first) = app.json("POST", "/api/cv-profile", Some(&token), json!({ "title": "Main" })).await;
    let first_id = first["_id"].as_str().unwrap().to_string();

    let (status, copy) = app.json("POST", &format!("/api/cv-profile/duplicate/{}", first_id), Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(copy["title"], "Main (Copy)");
    assert_eq!(copy["isDefault"], false);
    assert_ne!(copy["_id"], first["_id"]);

    for _ in 0..3 {
        let (status, _) = app.json("POST", "/api/cv-profile", Some(&token), json!({})).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, body) = app.json("POST", "/api/cv-profile", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Maximum number of CV profiles reached (5). Please delete an existing CV to create a new one."
    );
    let (status, _) = app.json("POST", &format!("/api/cv-profile/duplicate/{}", first_id), Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_other_users_cannot_touch_a_cv() {
    let app = TestApp::new();
    let (_, owner_token) = app.user("ada").await;
    let (_, other_token) = app.user("eve").await;

    let (_, cv) = app.json("POST", "/api/cv-profile", Some(&owner_token), json!({})).await;
    let uri = format!("/api/cv-profile/{}", cv["_id"].as_str().unwrap());

    let (status, body) = app.get(&uri, Some(&other_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "CV profile not found");
    let (status, _) = app.json("DELETE", &uri, Some(&other_token), json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.json("DELETE", &uri, Some(&owner_token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "CV profile deleted");
}

#[tokio::test]
async fn test_public_visibility_and_search_by_user() {
    let app = TestApp::new();
    let (owner, token) = app.user("ada").await;
    let (_, cv) = app.json("POST", "/api/cv-profile", Some(&token), json!({ "headline": "Engineer" })).await;
    let id = cv["_id"].as_str().unwrap().to_string();

    let (status, body) = app.get(&format!("/api/cv-profile/public/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Public CV not found");
    let (status, _) = app.get(&format!("/api/cv-profile/search/by-user/{}", owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.json("PUT", &format!("/api/cv-profile/public/{}", id), Some(&token), json!({})).await;
    assert_eq!(body["isPublic"], true);

    let (status, body) = app.get(&format!("/api/cv-profile/public/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["headline"], "Engineer");
    assert_eq!(body["user"]["username"], "ada");

    let (_, body) = app.get(&format!("/api/cv-profile/user/{}", owner), None).await;
    assert_eq!(body["_id"], id);
    let (_, body) = app.get(&format!("/api/cv-profile/search/by-user/{}", owner), None).await;
    assert_eq!(body["_id"], id);

    app.json("PUT", &format!("/api/cv-profile/private/{}", id), Some(&token), json!({})).await;
    let (status, _) = app.get(&format!("/api/cv-profile/user/{}", owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sync_creates_from_profile_and_image_update() {
    let app = TestApp::new();
    let (_, token) = app.user("ada").await;
    app.json("PUT", "/api/user/profile", Some(&token), json!({ "bio": "Poet of science", "skills": ["Rust", "Math"] }))
        .await;

    let (status, body) = app.json("POST", "/api/cv-profile/sync", Some(&token), json!({ "sections": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No sections selected to sync");

    let (status, cv) =
        app.json("POST", "/api/cv-profile/sync", Some(&token), json!({ "sections": ["basicInfo", "skills"] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cv["isDefault"], true);
    assert_eq!(cv["summary"], "Poet of science");
    assert_eq!(cv["contact"]["email"], "ada@example.com");
    assert_eq!(cv["skills"].as_array().unwrap().len(), 2);

    let image_uri = format!("/api/cv-profile/{}/image", cv["_id"].as_str().unwrap());
    let (status, body) = app.json("PUT", &image_uri, Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No image data provided");

    let (status, body) = app.json("PUT", &image_uri, Some(&token), json!({ "imageData": "data:image/png;base64,AAAA" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["profileImage"], "data:image/png;base64,AAAA");
}

#[tokio::test]
async fn test_pdf_download() {
    let app = TestApp::new();
    let (_, token) = app.user("ada").await;
    let (_, cv) = app
        .json(
            "POST",
            "/api/cv-profile",
            Some(&token),
            json!({
                "fullName": "Ada Lovelace",
                "summary": "Wrote the first program.",
                "workExperience": [{ "title": "Analyst", "company": "Engine Co", "highlights": ["Notes G"] }],
                "skills": [{ "name": "Mathematics", "level": "Expert" }],
            }),
        )
        .await;
    let uri = format!("/api/cv-profile/{}/pdf", cv["_id"].as_str().unwrap());

    let resp = app.router.clone().oneshot(request("GET", &uri, Some(&token), None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(resp.headers()[header::CONTENT_DISPOSITION], "attachment; filename=\"cv-Ada Lovelace.pdf\"");
    let bytes = to_bytes(resp.into_body(), 16 * 1024 * 1024).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}
