//! Conversation messages sent to a model

pub mod entities;
