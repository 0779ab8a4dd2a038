pub mod countdown;
pub mod normalize;
pub mod resolver;

pub use countdown::{time_until, Countdown};
pub use normalize::{normalize, TimeParseError};
pub use resolver::{build_schedule, resolve_current_next};
