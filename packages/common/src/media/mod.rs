mod error;
mod key;
mod traits;

pub mod filesystem;

pub use error::MediaError;
pub use filesystem::FilesystemMediaStore;
pub use key::MediaKey;
pub use traits::{MediaStore, extension_of, image_content_type};
