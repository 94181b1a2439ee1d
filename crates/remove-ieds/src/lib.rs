//! Browse the IEDs of an SCL substation file and remove a chosen subset, together with the
//! references other elements hold to them.

pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;
pub mod ui;
