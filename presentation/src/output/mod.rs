//! Output formatting for council outcomes

pub mod console;
