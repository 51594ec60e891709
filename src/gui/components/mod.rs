//! GUI components

pub mod progress_bar;
pub mod url_input;
pub mod video_card;

// Re-export for convenience
pub use progress_bar::progress_bar;
pub use url_input::url_input;
pub use video_card::video_card;
