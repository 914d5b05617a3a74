//! Edit sessions over a directory-structure document.

mod edit_session;

pub use edit_session::{EditSession, EntryKind, PendingEdit, SessionError, SessionMode};
