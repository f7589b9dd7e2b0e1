mod common;

use actix_web::{App, http::StatusCode, test};
use serde_json::Value;
use uuid::Uuid;

use common::{Part, TestEnv, bearer, bearer_named, multipart, png};
use feed_be::handlers;

macro_rules! app {
    ($env:expr) => {
        test::init_service(
            App::new()
                .app_data($env.state.clone())
                .configure(handlers::configure),
        )
        .await
    };
}

fn create_request(user: Uuid, parts: &[Part<'_>]) -> test::TestRequest {
    let (content_type, body) = multipart(parts);
    test::TestRequest::post()
        .uri("/feed/post")
        .insert_header(bearer(user))
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
}

fn update_request(user: Uuid, post_id: &str, parts: &[Part<'_>]) -> test::TestRequest {
    let (content_type, body) = multipart(parts);
    test::TestRequest::put()
        .uri(&format!("/feed/post/{}", post_id))
        .insert_header(bearer(user))
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
}

fn get_request(user: Uuid, uri: &str) -> test::TestRequest {
    test::TestRequest::get()
        .uri(uri)
        .insert_header(bearer(user))
}

#[actix_web::test]
async fn create_then_list_shows_newest_post_first() {
    let env = TestEnv::new().await;
    let app = app!(env);

    let first = create_request(env.alice.id, &[Part::Text("title", "Older post"), Part::Text("content", "Older content"), png()]).to_request();
    let resp = test::call_service(&app, first).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let second = create_request(env.alice.id, &[Part::Text("title", "Newer post"), Part::Text("content", "Newer content"), png()]).to_request();
    let created: Value = test::call_and_read_body_json(&app, second).await;
    assert_eq!(created["message"], "Post created successfully!");
    assert_eq!(created["creator"]["name"], "Alice");
    assert_eq!(created["creator"]["id"], env.alice.id.to_string());
    let new_id = created["post"]["id"].as_str().unwrap().to_string();

    let listed: Value = test::call_and_read_body_json(&app, get_request(env.bob.id, "/feed/posts?page=1").to_request()).await;
    assert_eq!(listed["totalItems"], 2);
    assert_eq!(listed["posts"][0]["id"], new_id.as_str());
    assert_eq!(listed["posts"][0]["creator"]["name"], "Alice");
    assert!(listed["posts"][0]["imageUrl"].as_str().unwrap().ends_with("-photo.png"));
    assert_eq!(env.stored_images(), 2);
    assert_eq!(env.user(env.alice.id).await.posts.len(), 2);
}

#[actix_web::test]
async fn pages_hold_at_most_two_posts() {
    let env = TestEnv::new().await;
    let app = app!(env);

    for n in 0..3 {
        let title = format!("Post number {}", n);
        let req = create_request(env.alice.id, &[Part::Text("title", &title), Part::Text("content", "Body text"), png()]).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    for (uri, expected) in [("/feed/posts", 2), ("/feed/posts?page=2", 1), ("/feed/posts?page=abc", 2), ("/feed/posts?page=7", 0)] {
        let page: Value = test::call_and_read_body_json(&app, get_request(env.alice.id, uri).to_request()).await;
        assert_eq!(page["posts"].as_array().unwrap().len(), expected, "{uri}");
        assert_eq!(page["totalItems"], 3, "{uri}");
    }
}

#[actix_web::test]
async fn non_image_upload_is_unprocessable_and_stores_nothing() {
    let env = TestEnv::new().await;
    let app = app!(env);

    let req = create_request(
        env.alice.id,
        &[
            Part::Text("title", "Plain text"),
            Part::Text("content", "Not an image"),
            Part::File { name: "image", file_name: "notes.txt", content_type: "text/plain", bytes: b"hello" },
        ],
    ).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "No image provided");

    let listed: Value = test::call_and_read_body_json(&app, get_request(env.alice.id, "/feed/posts").to_request()).await;
    assert_eq!(listed["totalItems"], 0);
    assert_eq!(env.stored_images(), 0);
}

#[actix_web::test]
async fn oversized_upload_is_rejected_before_storage() {
    let env = TestEnv::new().await;
    let app = app!(env);

    let big = vec![0u8; 1024 * 1024 + 1];
    let req = create_request(
        env.alice.id,
        &[
            Part::Text("title", "Huge picture"),
            Part::Text("content", "Far too many bytes"),
            Part::File { name: "image", file_name: "big.png", content_type: "image/png", bytes: &big },
        ],
    ).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(env.stored_images(), 0);
}

#[actix_web::test]
async fn oversized_non_image_is_dropped_like_any_other_rejected_file() {
    let env = TestEnv::new().await;
    let app = app!(env);

    let big = vec![b'a'; 1024 * 1024 + 1];
    let req = create_request(
        env.alice.id,
        &[
            Part::Text("title", "Huge text file"),
            Part::Text("content", "Not a picture at all"),
            Part::File { name: "image", file_name: "notes.txt", content_type: "text/plain", bytes: &big },
        ],
    ).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "No image provided");
    assert_eq!(env.stored_images(), 0);
}

#[actix_web::test]
async fn first_post_from_unknown_caller_provisions_the_user() {
    let env = TestEnv::new().await;
    let app = app!(env);
    let carol = Uuid::new_v4();

    let (content_type, body) = multipart(&[Part::Text("title", "Hello there"), Part::Text("content", "First words"), png()]);
    let req = test::TestRequest::post()
        .uri("/feed/post")
        .insert_header(bearer_named(carol, Some("Carol")))
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["creator"]["name"], "Carol");

    let post_id: Uuid = created["post"]["id"].as_str().unwrap().parse().unwrap();
    assert_eq!(env.user(carol).await.posts, vec![post_id]);
}

#[actix_web::test]
async fn short_title_reports_field_errors_and_discards_upload() {
    let env = TestEnv::new().await;
    let app = app!(env);

    let req = create_request(env.alice.id, &[Part::Text("title", "Hi"), Part::Text("content", "Long enough"), png()]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"][0]["field"], "title");
    assert_eq!(env.stored_images(), 0);
}

#[actix_web::test]
async fn requests_without_token_are_unauthorized() {
    let env = TestEnv::new().await;
    let app = app!(env);

    let req = test::TestRequest::get().uri("/feed/posts").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/feed/posts")
        .insert_header(("Authorization", "Bearer not.a.jwt"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn update_by_other_user_is_forbidden() {
    let env = TestEnv::new().await;
    let app = app!(env);

    let req = create_request(env.alice.id, &[Part::Text("title", "Alice's post"), Part::Text("content", "Original body"), png()]).to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = created["post"]["id"].as_str().unwrap().to_string();
    let image_url = created["post"]["imageUrl"].as_str().unwrap().to_string();

    let req = update_request(
        env.bob.id,
        &post_id,
        &[Part::Text("title", "Bob was here"), Part::Text("content", "Replaced body"), Part::Text("image", &image_url)],
    ).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let fetched: Value = test::call_and_read_body_json(&app, get_request(env.alice.id, &format!("/feed/post/{}", post_id)).to_request()).await;
    assert_eq!(fetched["post"]["title"], "Alice's post");
    assert_eq!(fetched["post"]["content"], "Original body");
    assert_eq!(env.stored_images(), 1);
}

#[actix_web::test]
async fn owner_update_with_new_image_replaces_file_and_broadcasts() {
    let env = TestEnv::new().await;
    let app = app!(env);
    let mut events = env.state.notifier.subscribe().unwrap();

    let req = create_request(env.alice.id, &[Part::Text("title", "Alice's post"), Part::Text("content", "Original body"), png()]).to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = created["post"]["id"].as_str().unwrap().to_string();
    let create_event = events.recv().await.unwrap();
    assert_eq!(create_event.data["action"], "create");
    assert_eq!(create_event.data["post"]["creator"]["name"], "Alice");

    let jpeg = Part::File { name: "image", file_name: "new.jpg", content_type: "image/jpeg", bytes: b"jpeg bytes" };
    let req = update_request(env.alice.id, &post_id, &[Part::Text("title", "Edited title"), Part::Text("content", "Edited body"), jpeg]).to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["message"], "Post updated");
    assert!(updated["post"]["imageUrl"].as_str().unwrap().ends_with("-new.jpg"));
    assert_eq!(env.stored_images(), 1);

    let update_event = events.recv().await.unwrap();
    assert_eq!(update_event.event, "posts");
    assert_eq!(update_event.data["action"], "update");
    assert_eq!(update_event.data["post"]["title"], "Edited title");
}

#[actix_web::test]
async fn update_without_image_reference_is_rejected() {
    let env = TestEnv::new().await;
    let app = app!(env);

    let req = create_request(env.alice.id, &[Part::Text("title", "Alice's post"), Part::Text("content", "Original body"), png()]).to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = created["post"]["id"].as_str().unwrap().to_string();

    let req = update_request(env.alice.id, &post_id, &[Part::Text("title", "Edited title"), Part::Text("content", "Edited body")]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "No file picked");
}

#[actix_web::test]
async fn owner_delete_removes_post_link_and_image() {
    let env = TestEnv::new().await;
    let app = app!(env);

    let req = create_request(env.alice.id, &[Part::Text("title", "Short lived"), Part::Text("content", "Gone soon"), png()]).to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = created["post"]["id"].as_str().unwrap().to_string();
    let uri = format!("/feed/post/{}", post_id);

    let req = test::TestRequest::delete().uri(&uri).insert_header(bearer(env.bob.id)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let mut events = env.state.notifier.subscribe().unwrap();
    let req = test::TestRequest::delete().uri(&uri).insert_header(bearer(env.alice.id)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(&app, get_request(env.alice.id, &uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(env.user(env.alice.id).await.posts.is_empty());
    assert_eq!(env.stored_images(), 0);

    let event = events.recv().await.unwrap();
    assert_eq!(event.data, serde_json::json!({"action": "delete", "id": post_id}));
}

#[actix_web::test]
async fn malformed_post_id_is_not_found() {
    let env = TestEnv::new().await;
    let app = app!(env);

    let resp = test::call_service(&app, get_request(env.alice.id, "/feed/post/not-a-uuid").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Could not find post");
}

#[actix_web::test]
async fn status_round_trip() {
    let env = TestEnv::new().await;
    let app = app!(env);

    let resp = test::call_service(&app, get_request(env.alice.id, "/feed/status").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::patch()
        .uri("/feed/status")
        .insert_header(bearer(env.alice.id))
        .set_json(serde_json::json!({"status": "Writing Rust"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let body: Value = test::call_and_read_body_json(&app, get_request(env.alice.id, "/feed/status").to_request()).await;
    assert_eq!(body["status"], "Writing Rust");
}
