pub mod account;
pub mod blog;
pub mod category;
pub mod shared;
