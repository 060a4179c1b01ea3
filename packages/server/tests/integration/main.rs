mod blog;
mod category;
mod common;
