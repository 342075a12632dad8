//! # Media Library Module
//!
//! Query and ingestion side of the media-library core.
//!
//! ## Overview
//!
//! - [`normalizer`] maps raw media-index rows into the canonical [`Asset`]
//! - [`planner`] turns a [`QuerySpec`] into a store query plus in-memory
//!   post-filtering
//! - [`repository`] executes plans and fetches single-asset detail
//! - [`ingest`] commits local files into the store
//!
//! The media index itself is an external collaborator reached through
//! [`bridge_traits::MediaStore`].

pub mod error;
pub mod ingest;
pub mod models;
pub mod normalizer;
pub mod pagination;
pub mod planner;
pub mod repository;

pub use error::{LibraryError, Result};
pub use ingest::IngestionGateway;
pub use models::{Asset, Collection, MediaType, QuerySpec, QuerySpecBuilder, SortBy, SortOrder};
pub use repository::{AssetRepository, StoreAssetRepository};
