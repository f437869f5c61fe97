//! Shared media storage
//!
//! Handles entry creation, MIME classification, and path validation.

pub mod filesystem;
pub mod mime;
pub mod results;
pub mod store;
pub mod validation;

pub use filesystem::FsMediaStore;
pub use mime::mime_type_for_path;
pub use results::{Locator, NewEntry, StorageEntry};
pub use store::MediaStore;
