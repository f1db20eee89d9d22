pub mod error;
pub mod record;

pub use error::{AssetError, Result};
pub use record::{AssetRecord, Namespace, is_temporary_id};
