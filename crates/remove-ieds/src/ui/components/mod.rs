//! Collection of reusable TUI components.

pub mod document_view;
pub mod remove_dialog;
pub mod selection_list;
