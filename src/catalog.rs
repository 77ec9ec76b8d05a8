//! Built-in service definitions embedded in the binary
//!
//! Embeds the supported service YAML files so users can run
//! `service-pager invoke Get-HSM2Backup` without pointing at a file.

use crate::error::{Error, Result};
use crate::loader::{load_service, load_service_from_str, OperationDefinition, ServiceDefinition};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

/// Built-in service YAML definitions
pub static BUILTIN_SERVICES: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        let mut m = HashMap::new();

        // Security
        m.insert("cloudhsmv2", include_str!("../services/cloudhsmv2.yaml"));
        m.insert("cloudhsm", include_str!("../services/cloudhsmv2.yaml"));

        // Developer Tools
        m.insert("devicefarm", include_str!("../services/devicefarm.yaml"));

        m
    });

/// Get a built-in service by name
pub fn get_builtin(name: &str) -> Option<&'static str> {
    BUILTIN_SERVICES.get(name).copied()
}

/// Check if a service name is a built-in service
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_SERVICES.contains_key(name)
}

/// List all built-in service names (primary names only)
pub fn list_builtin() -> Vec<&'static str> {
    vec!["cloudhsmv2", "devicefarm"]
}

/// An operation together with the service that owns it
#[derive(Debug, Clone, Copy)]
pub struct ResolvedOperation<'a> {
    pub service: &'a ServiceDefinition,
    pub operation: &'a OperationDefinition,
}

impl ResolvedOperation<'_> {
    /// `service:operation` key, stable across alias renames
    pub fn key(&self) -> String {
        format!("{}:{}", self.service.name, self.operation.name)
    }
}

/// A set of loaded services that operations are resolved against
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    services: Vec<ServiceDefinition>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of every built-in service
    pub fn builtin() -> Result<Self> {
        let mut catalog = Self::new();
        for name in list_builtin() {
            if let Some(yaml) = get_builtin(name) {
                catalog.add(load_service_from_str(yaml)?)?;
            }
        }
        Ok(catalog)
    }

    /// Catalog holding one service, loaded by built-in name or YAML path
    pub fn load(source: impl AsRef<Path>) -> Result<Self> {
        let mut catalog = Self::new();
        catalog.add(load_service(source)?)?;
        Ok(catalog)
    }

    /// Add a service; aliases must stay unique across the catalog
    pub fn add(&mut self, service: ServiceDefinition) -> Result<()> {
        if self.services.iter().any(|s| s.name == service.name) {
            return Err(Error::config(format!(
                "Service '{}' is already loaded",
                service.name
            )));
        }
        for op in &service.operations {
            if let Some(existing) = self.find_alias(&op.alias) {
                return Err(Error::config(format!(
                    "Alias '{}' of service '{}' collides with {}",
                    op.alias,
                    service.name,
                    existing.key()
                )));
            }
        }
        self.services.push(service);
        Ok(())
    }

    /// Loaded services
    pub fn services(&self) -> &[ServiceDefinition] {
        &self.services
    }

    /// Look up a service by name
    pub fn service(&self, name: &str) -> Option<&ServiceDefinition> {
        self.services
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Every operation in the catalog, in load order
    pub fn operations(&self) -> impl Iterator<Item = ResolvedOperation<'_>> {
        self.services.iter().flat_map(|service| {
            service
                .operations
                .iter()
                .map(move |operation| ResolvedOperation { service, operation })
        })
    }

    /// Resolve an alias (`Get-HSM2Backup`) or a `service:operation` key
    pub fn resolve(&self, name: &str) -> Result<ResolvedOperation<'_>> {
        if let Some((service_name, op_name)) = name.split_once(':') {
            return self
                .service(service_name)
                .and_then(|service| {
                    service
                        .operation(op_name)
                        .map(|operation| ResolvedOperation { service, operation })
                })
                .ok_or_else(|| Error::unknown_operation(name));
        }

        self.find_alias(name)
            .or_else(|| self.operations().find(|r| r.operation.matches(name)))
            .ok_or_else(|| Error::unknown_operation(name))
    }

    fn find_alias(&self, alias: &str) -> Option<ResolvedOperation<'_>> {
        self.operations()
            .find(|r| r.operation.alias.eq_ignore_ascii_case(alias))
    }
}
