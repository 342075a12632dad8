//! # Host Bridge Traits
//!
//! Contracts between the media-library core and the platform that hosts it.
//!
//! ## Overview
//!
//! The core never talks to an operating system media index, an EXIF decoder or
//! a host logger directly. Each of those collaborators is described here as a
//! trait and implemented once per platform.
//!
//! ## Traits
//!
//! - [`MediaStore`](media_store::MediaStore) - Queryable index of media files
//!   with a fixed column schema (the platform media index)
//! - [`LocationReader`](location::LocationReader) - Best-effort GPS extraction
//!   from image metadata
//! - [`Clock`](host::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](host::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Available |
//! | Android  | TBD                 | 📋 Planned |
//! | iOS      | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! Every trait method reports failures as [`BridgeError`](error::BridgeError).
//! Implementations convert driver errors into it and keep the offending path
//! or identifier in the message.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync`; the core shares one instance of each
//! collaborator across every worker thread.

pub mod error;
pub mod host;
pub mod location;
pub mod media_store;

pub use error::BridgeError;

pub use host::{Clock, LogEntry, LogLevel, LoggerSink, SystemClock};
pub use location::{GeoLocation, LocationReader};
pub use media_store::{Bucket, InsertRequest, MediaStore, StoreQuery, StoreRow, StoreValue};
