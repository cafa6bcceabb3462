pub mod db;
pub mod error;
pub mod signer;
pub mod store;
pub mod types;

pub use error::{MediaError, Result};
pub use signer::MediaLinkSigner;
pub use store::{LocalDirStore, MediaStore, ObjectStore};
pub use types::{MediaAsset, MediaKind};
