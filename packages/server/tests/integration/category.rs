use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::common::{BlogForm, TestApp, routes};

fn timestamp(value: &Value) -> DateTime<Utc> {
    serde_json::from_value(value.clone()).expect("timestamp")
}

#[tokio::test]
async fn only_staff_can_manage_categories() {
    let app = TestApp::spawn().await;
    let alice = app.create_authenticated_user("alice").await;

    let res = app
        .post_with_token(routes::CATEGORIES, &json!({"name": "Tech"}), &alice)
        .await;

    assert_eq!(res.status, 403);
    assert_eq!(res.code(), "PERMISSION_DENIED");
}

#[tokio::test]
async fn slug_is_derived_from_the_name() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff_user("editor").await;

    let res = app
        .post_with_token(routes::CATEGORIES, &json!({"name": "Tech News"}), &staff)
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["slug"], "tech-news");

    let dup = app
        .post_with_token(routes::CATEGORIES, &json!({"name": "Tech News"}), &staff)
        .await;
    assert_eq!(dup.status, 400);
    assert_eq!(dup.code(), "NAME_TAKEN");
}

#[tokio::test]
async fn rename_rederives_the_slug() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff_user("editor").await;
    let id = app.create_category(&staff, "Tech").await;

    let res = app
        .put_with_token(&routes::category(id), &json!({"name": "Hard Tech"}), &staff)
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["name"], "Hard Tech");
    assert_eq!(res.body["slug"], "hard-tech");
    assert_eq!(res.body["description"], "About things");
}

#[tokio::test]
async fn new_blog_moves_category_to_the_front() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff_user("editor").await;
    let tech = app.create_category(&staff, "Tech").await;
    app.create_category(&staff, "Life").await;
    let before = app.get_without_token(&routes::category(tech)).await;

    let alice = app.create_authenticated_user("alice").await;
    app.create_blog(&alice, "Rust", "Tech").await;

    let after = app.get_without_token(&routes::category(tech)).await;
    assert!(timestamp(&after.body["modified_at"]) > timestamp(&before.body["modified_at"]));

    let list = app.get_without_token(routes::CATEGORIES).await;
    assert_eq!(list.status, 200);
    assert_eq!(list.body[0]["name"], "Tech");
}

#[tokio::test]
async fn blog_update_advances_category_modified_at() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff_user("editor").await;
    let tech = app.create_category(&staff, "Tech").await;
    let life = app.create_category(&staff, "Life").await;
    let alice = app.create_authenticated_user("alice").await;
    let slug = app.create_blog(&alice, "Rust", "Tech").await;

    let before = app.get_without_token(&routes::category(tech)).await;
    let res = app
        .put_form(
            &routes::blog(&slug),
            BlogForm::default().field("body", "Edited."),
            &alice,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    let after = app.get_without_token(&routes::category(tech)).await;
    assert!(timestamp(&after.body["modified_at"]) > timestamp(&before.body["modified_at"]));

    let before = app.get_without_token(&routes::category(life)).await;
    let moved = app
        .put_form(
            &routes::blog(&slug),
            BlogForm::default().field("category", "Life"),
            &alice,
        )
        .await;
    assert_eq!(moved.status, 200, "{}", moved.text);
    assert_eq!(moved.body["category"], "Life");
    let after = app.get_without_token(&routes::category(life)).await;
    assert!(timestamp(&after.body["modified_at"]) > timestamp(&before.body["modified_at"]));
}

#[tokio::test]
async fn deleting_a_category_removes_its_blogs() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff_user("editor").await;
    let id = app.create_category(&staff, "Tech").await;
    let alice = app.create_authenticated_user("alice").await;
    let slug = app.create_blog(&alice, "Rust", "Tech").await;

    let res = app.delete_with_token(&routes::category(id), &staff).await;
    assert_eq!(res.status, 204);

    assert_eq!(app.get_without_token(&routes::category(id)).await.status, 404);
    assert_eq!(app.get_without_token(&routes::blog(&slug)).await.status, 404);
}

#[tokio::test]
async fn missing_category_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(&routes::category(9999)).await;

    assert_eq!(res.status, 404);
}
