//! Core types and error definitions for the Tutor session engine.
//!
//! This crate provides the foundational types shared across the Tutor crates:
//! chat messages, uploaded-document records, and the unified error type.
//!
//! # Main types
//!
//! - [`TutorError`] — Unified error enum for all Tutor subsystems.
//! - [`TutorResult`] — Convenience alias for `Result<T, TutorError>`.
//! - [`Sender`] — Message author (user or AI).
//! - [`MessageKind`] — How a message should be presented (plain text,
//!   document analysis, suggestion).
//! - [`Message`] — A single message within a chat session.
//! - [`Document`] — Metadata record for an uploaded document.

/// Uploaded-document metadata.
pub mod document;
/// Error types.
pub mod error;
/// Chat message types.
pub mod message;

pub use document::{Document, FileMeta};
pub use error::{TutorError, TutorResult};
pub use message::{Message, MessageKind, Sender};
