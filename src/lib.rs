//! Love timer core: how long since the start date, down to the second.

pub mod app;
pub mod card;
pub mod clock;
pub mod date_entry;
pub mod elapsed;
pub mod image;
pub mod logging;
pub mod prefs;
pub mod start_date;
pub mod ticker;

pub use app::AppState;
pub use clock::{Clock, FixedClock, SystemClock};
pub use date_entry::DateEntry;
pub use elapsed::{ElapsedBreakdown, compute};
pub use image::ImageReference;
pub use prefs::{JsonFileStore, MemoryStore, PreferenceStore};
pub use start_date::{StartDate, StartDateError};
pub use ticker::Ticker;
