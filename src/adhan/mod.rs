pub mod observers;
pub mod permission;
pub mod player;
pub mod service;
pub mod wake;

pub use permission::Permission;
pub use player::{AudioPlayer, CommandPlayer, NullPlayer, PlaybackError, Player};
pub use service::{AdhanService, AdhanState, PlayError, Trigger};
pub use wake::WakeQueue;
