pub mod discover;
pub mod navroute;
pub mod reader;
pub mod sync;
pub mod tail;

pub use sync::{SyncReport, full_sync};
pub use tail::{JournalTailer, TailCursor, TailPoll};
