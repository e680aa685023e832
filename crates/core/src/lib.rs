pub mod body;
pub mod error;
pub mod event;
pub mod galaxy;
pub mod identity;
pub mod remote;
pub mod snapshot;

pub use body::{BodyCategory, BodyRecord, BodySource};
pub use error::EngineError;
pub use event::{JournalEvent, Payload};
pub use identity::BodyIdentity;
pub use remote::RemoteSystem;
pub use snapshot::{IngestOutcome, SystemSnapshot};
