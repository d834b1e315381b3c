//! Edit-preview subsystem
//!
//! Non-destructive, reversible mesh editing: an operation runs on a copy shown
//! by a ghost entity, parameters can be tweaked and undone, and the result is
//! either committed to the target or thrown away.

mod engine;
mod error;
mod history;
mod params;
pub mod operations;

pub use engine::{operation, EditPreviewEngine, PreviewConfig, PreviewSession, PreviewState};
pub use error::{PreviewError, Result};
pub use history::{HistoryEntry, PreviewHistory, DEFAULT_HISTORY_CAPACITY};
pub use operations::{OperationFn, OperationId, OperationKind, OperationRegistry};
pub use params::{ParamValue, PreviewParams};
