pub mod acquisition;
pub mod cache;
pub mod error;
pub mod normalize;
pub mod source;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use acquisition::{TimelineCollector, MAX_PAGES};
pub use cache::{
    validate_payload, CacheLookup, Freshness, ProfileCache, StorageResult, Tier, WriteStatus,
};
pub use error::{ArchiveError, Result};
pub use normalize::{is_repost, normalize};
pub use source::{PostPage, PostSource};
pub use store::{PgProfileStore, ProfileStore, StoredProfile};
