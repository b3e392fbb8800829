pub mod clock;
pub mod comparator;
pub mod db;
pub mod error;
pub mod ordinal;
pub mod store;
pub mod task;
pub mod urgency;

pub use clock::{Clock, ManualClock, SystemClock};
pub use comparator::RankedTask;
pub use error::{EntityKind, PoqtError, Result};
pub use ordinal::{Ordinal, ORDINAL_VERSION};
pub use store::TaskStore;
pub use task::{ListId, Priority, ReminderLead, RenderKind, Task, TaskDraft, TaskId, TaskList};
pub use urgency::{classify, Urgency, UrgencyBand, UrgencyConfig};
