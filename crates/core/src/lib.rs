//! # promptsh Core
//!
//! Domain types, traits, and error definitions for promptsh.
//! This crate has **no framework dependencies** beyond serde and tokio's
//! channel type. It defines the domain model the other crates implement
//! against.
//!
//! ## Layout
//!
//! - [`provider`]: the `Provider` trait over LLM backends
//! - [`message`]: chat roles and messages sent to a provider
//! - [`reply`]: the tagged `Reply` type deciding command vs. prose once
//! - [`error`]: one error enum per bounded context

pub mod error;
pub mod message;
pub mod provider;
pub mod reply;

// Re-export key types at crate root for ergonomics
pub use error::{AwarenessError, ConfigError, Error, ProviderError, Result};
pub use message::{Message, Role};
pub use provider::{ChunkReceiver, Provider, ProviderRequest, ProviderResponse, StreamChunk};
pub use reply::{DEFAULT_SENTINEL, Reply};
