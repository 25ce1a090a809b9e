//! Services composing validation, mapping and persistence.

pub mod siret_service;

pub use siret_service::SiretService;
