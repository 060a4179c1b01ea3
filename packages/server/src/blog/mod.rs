mod category;
mod query;
mod service;

pub use category::{CategoryService, find_category_by_name, next_modified_at, touch_category};
pub use query::{BlogFilter, BlogView, CommentView, LikeView};
pub use service::{BlogChanges, BlogService, NewBlog, NewImage};
