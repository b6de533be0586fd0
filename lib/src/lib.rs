pub mod api;
pub mod composer;
pub mod data;
pub mod error;
pub mod raw_data;
pub mod session;
pub mod taxonomy;

pub use composer::{CompositionWorkflow, DraftOutcome};
pub use error::{Error, FieldError};
pub use session::{ConsoleSession, MemorySession, Notifier, NullNotifier, SessionContext};
pub use taxonomy::{TaxonomyCache, TierPhase};
