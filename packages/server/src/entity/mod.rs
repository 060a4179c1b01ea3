pub mod account;
pub mod blog;
pub mod category;
pub mod comment;
pub mod image;
pub mod like;
