pub mod clock;
pub mod header;
pub mod next_prayer;
pub mod popups;
pub mod prayers;
pub mod statusbar;
pub mod weather;
