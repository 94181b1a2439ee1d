//! Application layer orchestrating the dialog, the host, and the removal edits.

pub mod dialog;
pub mod host;
pub mod projection;
pub mod removal;
pub mod selection;
