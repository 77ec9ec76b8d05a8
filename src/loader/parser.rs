//! YAML parser for service definitions
//!
//! Parses and validates service YAML files.
//! Supports both built-in services (by name) and custom YAML files (by path).

use crate::catalog;
use crate::error::{Error, Result};
use crate::loader::types::{OperationDefinition, ServiceDefinition, REGION_PLACEHOLDER};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use url::Url;

/// Verb-Noun command names, e.g. `Get-HSM2Backup`
static ALIAS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z]+-[A-Za-z0-9]+$").expect("valid alias regex"));

/// Load a service definition from a name or file path
///
/// A bare name (no path separators, no YAML extension) is looked up among
/// the built-in services first.
///
/// # Examples
///
/// ```ignore
/// let service = load_service("cloudhsmv2")?;
/// let service = load_service("./my-service.yaml")?;
/// ```
pub fn load_service(path: impl AsRef<Path>) -> Result<ServiceDefinition> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    if !path_str.contains('/')
        && !path_str.contains('\\')
        && !path_str.ends_with(".yaml")
        && !path_str.ends_with(".yml")
    {
        if let Some(yaml) = catalog::get_builtin(&path_str) {
            return load_service_from_str(yaml);
        }
    }

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            let builtin_list = catalog::list_builtin().join(", ");
            Error::config(format!(
                "Service '{}' not found. Built-in services: {}. Or provide a path to a YAML file.",
                path.display(),
                builtin_list
            ))
        } else {
            Error::config(format!(
                "Failed to read service file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_service_from_str(&content)
}

/// Load a service definition from a YAML string
pub fn load_service_from_str(yaml: &str) -> Result<ServiceDefinition> {
    let def: ServiceDefinition = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse service YAML: {e}")))?;

    validate_service(&def)?;
    Ok(def)
}

/// Validate a service definition
pub fn validate_service(def: &ServiceDefinition) -> Result<()> {
    if def.name.is_empty() {
        return Err(Error::config("Service name cannot be empty"));
    }

    if def.target_prefix.is_empty() {
        return Err(Error::config(format!(
            "Service '{}' target_prefix cannot be empty",
            def.name
        )));
    }

    if def.endpoint.is_empty() {
        return Err(Error::config(format!(
            "Service '{}' endpoint cannot be empty",
            def.name
        )));
    }
    let sample = def.endpoint.replace(REGION_PLACEHOLDER, "us-east-1");
    let url = Url::parse(&sample)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::config(format!(
            "Service '{}' endpoint must be http(s), got '{}'",
            def.name,
            url.scheme()
        )));
    }

    if def.operations.is_empty() {
        return Err(Error::config(format!(
            "Service '{}' must have at least one operation",
            def.name
        )));
    }

    let mut names = HashSet::new();
    let mut aliases = HashSet::new();
    for op in &def.operations {
        if !names.insert(op.name.to_ascii_lowercase()) {
            return Err(Error::config(format!(
                "Duplicate operation name '{}'",
                op.name
            )));
        }
        if !aliases.insert(op.alias.to_ascii_lowercase()) {
            return Err(Error::config(format!(
                "Duplicate operation alias '{}'",
                op.alias
            )));
        }
        validate_operation(op)?;
    }

    Ok(())
}

/// Validate an operation definition
fn validate_operation(op: &OperationDefinition) -> Result<()> {
    if op.name.is_empty() {
        return Err(Error::config("Operation name cannot be empty"));
    }

    if !ALIAS_PATTERN.is_match(&op.alias) {
        return Err(Error::config(format!(
            "Operation '{}' alias '{}' is not in Verb-Noun form",
            op.name, op.alias
        )));
    }

    if op.action.is_empty() {
        return Err(Error::config(format!(
            "Operation '{}' action cannot be empty",
            op.name
        )));
    }

    if op.items_path.is_empty() {
        return Err(Error::config(format!(
            "Operation '{}' items_path cannot be empty",
            op.name
        )));
    }

    if let Some(pagination) = &op.pagination {
        if pagination.input_token.is_empty() || pagination.output_token.is_empty() {
            return Err(Error::config(format!(
                "Operation '{}' pagination token members cannot be empty",
                op.name
            )));
        }
        if let Some(max) = pagination.max_page_size {
            if max < 1 {
                return Err(Error::invalid_value(
                    format!("{}.pagination.max_page_size", op.name),
                    format!("must be at least 1, got {max}"),
                ));
            }
            if pagination.page_size_param.is_none() {
                return Err(Error::invalid_value(
                    format!("{}.pagination.max_page_size", op.name),
                    "requires page_size_param",
                ));
            }
        }
    }

    Ok(())
}
