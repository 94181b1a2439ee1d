//! Core domain types: the SCL document, edit intents, and dialog items.

pub mod document;
pub mod edit;
pub mod errors;
pub mod model;
