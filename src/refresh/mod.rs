pub mod feed;
pub mod fetcher;
pub mod policy;

pub use feed::FeedState;
pub use fetcher::{FetchKind, FetchOutcome, Fetcher, Sources};
pub use policy::RefreshPolicy;
