pub mod media;

pub use media::{MediaError, MediaKey, MediaStore};
