use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter};

use crate::entity::blog;

/// Longest base slug taken from a title, before any `-{id}` suffix.
const MAX_BASE_LEN: usize = 80;

/// Slug used when a title has no letters or digits at all.
const FALLBACK_SLUG: &str = "post";

/// Upper bound on suffix rounds; each round appends the blog's own id.
const MAX_SUFFIX_ROUNDS: usize = 8;

/// Normalize text into a URL slug.
///
/// Transliterates to ASCII, lowercases, and joins the remaining runs of
/// letters and digits with single hyphens.
pub fn slugify(text: &str) -> String {
    slug::slugify(text)
}

/// `true` if `s` is already in the form `slugify` produces.
pub fn is_slug(s: &str) -> bool {
    !s.is_empty() && slugify(s) == s
}

/// Base slug for a blog title, truncated and never empty.
pub fn blog_base_slug(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        return FALLBACK_SLUG.to_string();
    }
    match slug.char_indices().nth(MAX_BASE_LEN) {
        Some((idx, _)) => slug[..idx].trim_end_matches('-').to_string(),
        None => slug,
    }
}

/// Next candidate after `slug` collided: the blog's id appended.
pub fn with_id_suffix(slug: &str, blog_id: i32) -> String {
    format!("{slug}-{blog_id}")
}

/// Derive a slug for `blog_id` that no other blog currently uses.
///
/// Starts from the title's base slug and appends `-{blog_id}` while the
/// candidate is taken. The id must already be assigned. The unique index on
/// `blog.slug` remains the final arbiter under concurrent writers.
pub async fn unique_blog_slug<C: ConnectionTrait>(
    conn: &C,
    title: &str,
    blog_id: i32,
) -> Result<String, DbErr> {
    let mut candidate = blog_base_slug(title);

    for _ in 0..MAX_SUFFIX_ROUNDS {
        if !slug_in_use(conn, &candidate, blog_id).await? {
            return Ok(candidate);
        }
        candidate = with_id_suffix(&candidate, blog_id);
    }

    Err(DbErr::Custom(format!(
        "could not derive a free slug for blog {blog_id}"
    )))
}

async fn slug_in_use<C: ConnectionTrait>(
    conn: &C,
    slug: &str,
    exclude_id: i32,
) -> Result<bool, DbErr> {
    let count = blog::Entity::find()
        .filter(blog::Column::Slug.eq(slug))
        .filter(blog::Column::Id.ne(exclude_id))
        .count(conn)
        .await?;
    Ok(count > 0)
}
