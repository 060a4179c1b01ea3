use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers::{account, blog, category};
use crate::state::AppState;

pub fn api_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(account_routes())
        .merge(blog_routes(config))
        .merge(category_routes())
}

fn account_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(account::register))
        .routes(routes!(account::send_register_otp))
        .routes(routes!(account::verify_register_otp))
        .routes(routes!(account::send_reset_password_otp))
        .routes(routes!(account::verify_reset_password_otp))
        .routes(routes!(account::reset_password))
        .routes(routes!(account::login))
        .routes(routes!(account::refresh_token))
        .routes(routes!(account::get_account, account::update_account))
}

fn blog_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let uploads = OpenApiRouter::new()
        .routes(routes!(blog::list_blogs, blog::create_blog))
        .routes(routes!(blog::get_blog, blog::update_blog, blog::delete_blog))
        .layer(blog::blog_body_limit(config.storage.max_image_size));

    uploads
        .routes(routes!(blog::toggle_like))
        .routes(routes!(blog::list_likes))
        .routes(routes!(blog::add_comment))
}

fn category_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(category::list_categories, category::create_category))
        .routes(routes!(
            category::get_category,
            category::update_category,
            category::delete_category
        ))
}
