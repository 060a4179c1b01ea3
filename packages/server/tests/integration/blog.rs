use serde_json::json;

use crate::common::{BlogForm, TestApp, routes};

/// Active author and staff tokens plus a "Tech" category.
async fn setup() -> (TestApp, String) {
    let app = TestApp::spawn().await;
    let staff = app.create_staff_user("editor").await;
    app.create_category(&staff, "Tech").await;
    let alice = app.create_authenticated_user("alice").await;
    (app, alice)
}

mod create {
    use super::*;

    #[tokio::test]
    async fn slug_is_derived_from_the_title() {
        let (app, alice) = setup().await;

        let res = app
            .post_form(routes::BLOGS, BlogForm::new("Hello World", "Tech"), &alice)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["slug"], "hello-world");
        assert_eq!(res.body["category"], "Tech");
        assert_eq!(res.body["author_username"], "alice");
        assert_eq!(res.body["comment_count"], 0);
        assert_eq!(res.body["like_count"], 0);
    }

    #[tokio::test]
    async fn duplicate_title_gets_id_suffixed_slug() {
        let (app, alice) = setup().await;
        app.create_blog(&alice, "Hello World", "Tech").await;

        let res = app
            .post_form(routes::BLOGS, BlogForm::new("Hello World", "Tech"), &alice)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        let id = res.id();
        assert_eq!(res.body["slug"], format!("hello-world-{id}"));
    }

    #[tokio::test]
    async fn explicit_slug_must_be_free() {
        let (app, alice) = setup().await;
        app.create_blog(&alice, "Hello World", "Tech").await;

        let res = app
            .post_form(
                routes::BLOGS,
                BlogForm::new("Another", "Tech").field("slug", "hello-world"),
                &alice,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "SLUG_TAKEN");
    }

    #[tokio::test]
    async fn unknown_category_is_a_validation_error() {
        let (app, alice) = setup().await;

        let res = app
            .post_form(routes::BLOGS, BlogForm::new("Hello", "Cooking"), &alice)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn anonymous_caller_cannot_post() {
        let (app, _) = setup().await;

        let res = app
            .post_form(routes::BLOGS, BlogForm::new("Hello", "Tech"), "not-a-token")
            .await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn images_are_stored_and_linked() {
        let (app, alice) = setup().await;

        let res = app
            .post_form(
                routes::BLOGS,
                BlogForm::new("Pictures", "Tech").image("cover.png", b"\x89PNG fake".to_vec()),
                &alice,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        let images = res.body["images"].as_array().unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0]["filename"], "cover.png");
        assert_eq!(images[0]["content_type"], "image/png");
        assert!(images[0]["image_url"].as_str().unwrap().starts_with("/media/"));
        assert_eq!(app.stored_media_files(), 1);
    }

    #[tokio::test]
    async fn non_image_upload_is_rejected() {
        let (app, alice) = setup().await;

        let res = app
            .post_form(
                routes::BLOGS,
                BlogForm::new("Notes", "Tech").image("notes.txt", b"plain".to_vec()),
                &alice,
            )
            .await;

        assert_eq!(res.status, 400);
    }
}

mod edit {
    use super::*;

    #[tokio::test]
    async fn author_can_update() {
        let (app, alice) = setup().await;
        let slug = app.create_blog(&alice, "Hello World", "Tech").await;

        let res = app
            .put_form(
                &routes::blog(&slug),
                BlogForm::default().field("title", "Hello Again"),
                &alice,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["title"], "Hello Again");
        assert_eq!(res.body["slug"], slug);
    }

    #[tokio::test]
    async fn non_author_cannot_update_or_delete() {
        let (app, alice) = setup().await;
        let bob = app.create_authenticated_user("bob").await;
        let slug = app.create_blog(&alice, "Hello World", "Tech").await;

        let update = app
            .put_form(
                &routes::blog(&slug),
                BlogForm::default().field("title", "Defaced"),
                &bob,
            )
            .await;
        assert_eq!(update.status, 403);
        assert_eq!(update.code(), "PERMISSION_DENIED");

        let delete = app.delete_with_token(&routes::blog(&slug), &bob).await;
        assert_eq!(delete.status, 403);

        let current = app.get_without_token(&routes::blog(&slug)).await;
        assert_eq!(current.status, 200);
        assert_eq!(current.body["title"], "Hello World");
    }

    #[tokio::test]
    async fn rejected_update_stores_no_images() {
        let (app, alice) = setup().await;
        let bob = app.create_authenticated_user("bob").await;
        let slug = app.create_blog(&alice, "Hello World", "Tech").await;

        let res = app
            .put_form(
                &routes::blog(&slug),
                BlogForm::default().image("cover.png", b"\x89PNG fake".to_vec()),
                &bob,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(app.stored_media_files(), 0);
    }

    #[tokio::test]
    async fn rejected_create_stores_no_images() {
        let (app, alice) = setup().await;

        let unknown_category = app
            .post_form(
                routes::BLOGS,
                BlogForm::new("Pictures", "Cooking").image("cover.png", b"\x89PNG one".to_vec()),
                &alice,
            )
            .await;
        assert_eq!(unknown_category.status, 400);

        let empty_title = app
            .post_form(
                routes::BLOGS,
                BlogForm::new("", "Tech").image("cover.png", b"\x89PNG two".to_vec()),
                &alice,
            )
            .await;
        assert_eq!(empty_title.status, 400);

        assert_eq!(app.stored_media_files(), 0);
    }

    #[tokio::test]
    async fn author_can_delete() {
        let (app, alice) = setup().await;
        let slug = app.create_blog(&alice, "Hello World", "Tech").await;
        app.post_with_token(&routes::comment(&slug), &json!({"comment": "First"}), &alice)
            .await;

        let res = app.delete_with_token(&routes::blog(&slug), &alice).await;
        assert_eq!(res.status, 204);

        let gone = app.get_without_token(&routes::blog(&slug)).await;
        assert_eq!(gone.status, 404);
        assert_eq!(gone.code(), "NOT_FOUND");
    }
}

mod engagement {
    use super::*;

    #[tokio::test]
    async fn like_toggles_per_account() {
        let (app, alice) = setup().await;
        let bob = app.create_authenticated_user("bob").await;
        let slug = app.create_blog(&alice, "Hello World", "Tech").await;

        let liked = app
            .post_with_token(&routes::like(&slug), &json!({}), &bob)
            .await;
        assert_eq!(liked.status, 200, "{}", liked.text);
        assert_eq!(liked.body["liked"], true);

        let likes = app.get_without_token(&routes::likes(&slug)).await;
        assert_eq!(likes.status, 200);
        assert_eq!(likes.body.as_array().unwrap().len(), 1);
        assert_eq!(likes.body[0]["username"], "bob");

        let detail = app.get_without_token(&routes::blog(&slug)).await;
        assert_eq!(detail.body["like_count"], 1);

        let unliked = app
            .post_with_token(&routes::like(&slug), &json!({}), &bob)
            .await;
        assert_eq!(unliked.body["liked"], false);

        let likes = app.get_without_token(&routes::likes(&slug)).await;
        assert!(likes.body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn liking_a_missing_blog_is_not_found() {
        let (app, alice) = setup().await;

        let res = app
            .post_with_token(&routes::like("nope"), &json!({}), &alice)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn comments_appear_in_posting_order() {
        let (app, alice) = setup().await;
        let bob = app.create_authenticated_user("bob").await;
        let slug = app.create_blog(&alice, "Hello World", "Tech").await;

        let first = app
            .post_with_token(&routes::comment(&slug), &json!({"comment": "First!"}), &bob)
            .await;
        assert_eq!(first.status, 200, "{}", first.text);
        app.post_with_token(&routes::comment(&slug), &json!({"comment": "Thanks"}), &alice)
            .await;

        let detail = app.get_without_token(&routes::blog(&slug)).await;
        assert_eq!(detail.body["comment_count"], 2);
        let comments = detail.body["comments"].as_array().unwrap();
        assert_eq!(comments[0]["comment"], "First!");
        assert_eq!(comments[0]["commented_by_username"], "bob");
        assert_eq!(comments[1]["commented_by_username"], "alice");
    }

    #[tokio::test]
    async fn overlong_comment_is_rejected() {
        let (app, alice) = setup().await;
        let slug = app.create_blog(&alice, "Hello World", "Tech").await;

        let res = app
            .post_with_token(
                &routes::comment(&slug),
                &json!({"comment": "x".repeat(201)}),
                &alice,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn filters_by_category_and_author() {
        let app = TestApp::spawn().await;
        let staff = app.create_staff_user("editor").await;
        app.create_category(&staff, "Tech").await;
        app.create_category(&staff, "Life").await;
        let alice = app.create_authenticated_user("alice").await;
        let bob = app.create_authenticated_user("bob").await;
        app.create_blog(&alice, "Rust", "Tech").await;
        app.create_blog(&alice, "Garden", "Life").await;
        app.create_blog(&bob, "Go", "Tech").await;

        let tech = app
            .get_without_token(&format!("{}?category=Tech", routes::BLOGS))
            .await;
        assert_eq!(tech.status, 200, "{}", tech.text);
        assert_eq!(tech.body["pagination"]["total"], 2);

        let alice_tech = app
            .get_without_token(&format!("{}?category=Tech&username=alice", routes::BLOGS))
            .await;
        assert_eq!(alice_tech.body["pagination"]["total"], 1);
        assert_eq!(alice_tech.body["data"][0]["title"], "Rust");

        let unknown = app
            .get_without_token(&format!("{}?username=nobody", routes::BLOGS))
            .await;
        assert_eq!(unknown.body["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn empty_filters_are_ignored() {
        let (app, alice) = setup().await;
        app.create_blog(&alice, "Rust", "Tech").await;
        app.create_blog(&alice, "Go", "Tech").await;

        let res = app
            .get_without_token(&format!("{}?category=&username=", routes::BLOGS))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["pagination"]["total"], 2);
    }

    #[tokio::test]
    async fn newest_first_with_pagination() {
        let (app, alice) = setup().await;
        app.create_blog(&alice, "One", "Tech").await;
        app.create_blog(&alice, "Two", "Tech").await;
        app.create_blog(&alice, "Three", "Tech").await;

        let page = app
            .get_without_token(&format!("{}?limit=2&offset=0", routes::BLOGS))
            .await;
        assert_eq!(page.body["pagination"]["total"], 3);
        assert_eq!(page.body["pagination"]["limit"], 2);
        let data = page.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["title"], "Three");

        let rest = app
            .get_without_token(&format!("{}?limit=2&offset=2", routes::BLOGS))
            .await;
        assert_eq!(rest.body["data"].as_array().unwrap().len(), 1);
        assert_eq!(rest.body["data"][0]["title"], "One");
    }
}
