pub mod media;
pub mod messaging;
pub mod repository;

pub use media::{MediaError, MediaUploader, MockUploader, VideoUpload};
pub use messaging::Message;
pub use repository::BrowseFilter;
