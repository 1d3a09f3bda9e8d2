//! In-process service registry populated at startup.
//!
//! Components register explicitly by id and kind; nothing is discovered by
//! scanning. At most one map engine is active at a time.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServiceKind {
    LayerBundle,
    MapEngine,
    ReportGenerator,
    Editor,
}

/// Anything the application can look up by id and kind.
pub trait ServiceProvider: Send + Sync {
    fn service_id(&self) -> &str;
    fn kind(&self) -> ServiceKind;
    fn display_name(&self) -> &str {
        self.service_id()
    }
}

/// Plain provider for services that need nothing beyond their identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    id: String,
    kind: ServiceKind,
    name: String,
}

impl ServiceDescriptor {
    pub fn new(id: impl Into<String>, kind: ServiceKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
        }
    }
}

impl ServiceProvider for ServiceDescriptor {
    fn service_id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ServiceKind {
        self.kind
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidServiceId(String),
    DuplicateServiceId(String),
    ServiceNotFound(String),
    NotAMapEngine(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidServiceId(value) => write!(f, "service id is invalid: {value}"),
            Self::DuplicateServiceId(value) => write!(f, "service id already registered: {value}"),
            Self::ServiceNotFound(value) => write!(f, "service not found: {value}"),
            Self::NotAMapEngine(value) => write!(f, "service is not a map engine: {value}"),
        }
    }
}

impl Error for RegistryError {}

#[derive(Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, Arc<dyn ServiceProvider>>,
    active_map_engine: Option<String>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, service: Arc<dyn ServiceProvider>) -> Result<(), RegistryError> {
        let id = service.service_id().trim().to_string();
        if !is_valid_service_id(&id) {
            return Err(RegistryError::InvalidServiceId(id));
        }
        if self.services.contains_key(id.as_str()) {
            return Err(RegistryError::DuplicateServiceId(id));
        }
        self.services.insert(id, service);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn ServiceProvider>> {
        self.services.get(id.trim()).cloned()
    }

    /// Sorted ids of every service of `kind`.
    pub fn ids_of_kind(&self, kind: ServiceKind) -> Vec<String> {
        self.services
            .iter()
            .filter(|(_, service)| service.kind() == kind)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn select_map_engine(&mut self, id: &str) -> Result<(), RegistryError> {
        let id = id.trim();
        let service = self
            .services
            .get(id)
            .ok_or_else(|| RegistryError::ServiceNotFound(id.to_string()))?;
        if service.kind() != ServiceKind::MapEngine {
            return Err(RegistryError::NotAMapEngine(id.to_string()));
        }
        self.active_map_engine = Some(id.to_string());
        Ok(())
    }

    pub fn active_map_engine(&self) -> Option<Arc<dyn ServiceProvider>> {
        self.active_map_engine.as_deref().and_then(|id| self.get(id))
    }
}

fn is_valid_service_id(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.'))
}
