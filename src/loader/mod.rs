//! YAML Loader module
//!
//! Parse service definitions from YAML files.
//!
//! # Overview
//!
//! The loader module provides:
//! - `ServiceDefinition` - Declarative AWS JSON service description
//! - `OperationDefinition` - One list/describe operation and its aliases
//! - YAML parsing with validation

mod parser;
mod types;

pub use parser::{load_service, load_service_from_str, validate_service};
pub use types::{
    OperationDefinition, PaginationDefinition, ServiceDefinition, REGION_PLACEHOLDER,
};

#[cfg(test)]
mod tests;
