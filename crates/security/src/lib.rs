//! Security module for promptsh: allowlists, reply sanitization, and audit logging.
//!
//! Provides:
//! - **Allowlist**: the fixed set of leading command words that may run
//! - **Sanitizer**: turns a raw model reply into an ordered list of commands
//! - **Audit logging**: structured record of every accepted, rejected, and executed command
//!
//! None of this is a sandbox. The allowlist is a lexical check on the first
//! word of each `&&` segment and the host shell still interprets the text.

pub mod allowlist;
pub mod audit;
pub mod sanitizer;

pub use allowlist::{CommandAllowlist, CommandCheck};
pub use audit::{AuditEntry, AuditEvent, AuditLogger, AuditOutcome, AuditSink, TracingSink};
pub use sanitizer::{Sanitizer, SegmentVerdict};
