//! SIRET API - establishment registry over a single Postgres table
//!
//! This crate exposes CRUD operations on French establishment records keyed
//! by their 14-digit SIRET identifier.
//!
//! ## Call Chain
//! HTTP request -> FieldSet -> validation -> mapper -> EstablishmentStore
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use siret_api::{database::MemoryEstablishmentStore, services::SiretService, validation::CreatePolicy};
//!
//! # async fn demo() -> siret_api::error::SiretResult<()> {
//! let service = SiretService::new(Arc::new(MemoryEstablishmentStore::new()), CreatePolicy::default());
//! let record = service.get("91158733500025").await?;
//! println!("{:?}", record.enseigne1etablissement);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Runtime configuration from the environment
pub mod config;

// Record types and the identifier newtype
pub mod models;

// Request validation and record mapping
pub mod mapper;
pub mod validation;

// Storage port plus Postgres and in-memory adapters
pub mod database;

// Registry service composing the above
pub mod services;

// Per-request action log
pub mod action_log;

// REST API (when enabled)
#[cfg(feature = "server")]
pub mod api;

pub use error::{SiretError, SiretResult, StoreError, ValidationError};
pub use models::{Establishment, Siret};
pub use services::SiretService;
