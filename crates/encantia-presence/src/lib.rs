pub mod clock;
pub mod error;
pub mod identity;
pub mod publisher;
pub mod reader;
pub mod record;
pub mod runtime;
pub mod store;
pub mod view;

#[cfg(test)]
mod testing;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use error::{PresenceError, StoreError};
pub use identity::Identity;
pub use publisher::{HeartbeatPublisher, PublisherState};
pub use reader::{is_online, PresenceReader, PresenceSnapshot, PresenceStatus, ReaderState};
pub use record::{PresenceRecord, ProfileRow};
pub use runtime::{PresenceRuntime, PresenceSettings};
pub use store::{MemoryStore, PresenceStore, SupabaseStore, SupabaseStoreConfig};
pub use view::{group_by_role, render_rows, render_text, Badge, BadgeRow, PresenceView};
