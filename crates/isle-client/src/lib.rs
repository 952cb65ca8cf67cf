//! isle client
//!
//! Brings server-rendered pages to life. [`Page::boot`] walks the document
//! for island and partial markers and schedules a mount for every top-level
//! region; [`Page::run_scheduled`] mounts them through a [`Host`].
//! [`apply_partials`] merges a fetched partial response into the partial
//! owners of a live page without touching any other instance.

mod error;
mod head;
mod host;
mod loader;
mod merge;
mod page;
mod partial;
mod queue;
mod registry;
mod runtime;
mod walker;

pub use error::{ClientError, HostError};
pub use head::merge_head;
pub use host::{Host, InstanceId};
pub use loader::{ModuleLoader, StaticModules};
pub use merge::merge_children;
pub use page::Page;
pub use partial::{apply_partials, MergeReport, PartialPhase};
pub use queue::{MountQueue, PendingMount};
pub use registry::IslandRegistry;
pub use runtime::Runtime;
pub use walker::{collect_partials, revive, PartialUpdate};
