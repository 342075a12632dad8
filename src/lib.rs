//! Workspace umbrella crate.
//!
//! Re-exports the media library facade so host applications can depend on
//! `medialib-workspace` and pick the platform shims through one feature.

pub use core_service::*;
