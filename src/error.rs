//! Error taxonomy.
//!
//! Navigation failures never escape the engine: they are classified here and
//! turned into a redirect to the error route. Store and storage failures are
//! best-effort and only reach the optional diagnostic hook.

use thiserror::Error;

use crate::engine::NodeId;

// =============================================================================
// Module Loading
// =============================================================================

/// Failure reported by a [`ModuleLoader`](crate::engine::ModuleLoader).
///
/// The loader decides the kind; the engine never inspects message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// No module exists at the resolved path.
    #[error("no page module at `{module}`")]
    NotFound { module: String },

    /// The module exists but could not be loaded or initialized.
    #[error("failed to load page module `{module}`: {reason}")]
    Failed { module: String, reason: String },
}

impl LoadError {
    pub fn not_found(module: impl Into<String>) -> Self {
        Self::NotFound { module: module.into() }
    }

    pub fn failed(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            module: module.into(),
            reason: reason.into(),
        }
    }

    /// The module path this error refers to.
    pub fn module(&self) -> &str {
        match self {
            Self::NotFound { module } | Self::Failed { module, .. } => module,
        }
    }
}

// =============================================================================
// DOM / Registry / Mount
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),

    #[error("node {0:?} has no parent")]
    Detached(NodeId),

    #[error("cannot insert {child:?} into its own descendant {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("the document has been dropped")]
    Released,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("`{0}` is not a valid custom element name")]
    InvalidTagName(String),
}

/// Failure while building or inserting the layout chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    #[error("layout `{tag}` did not render a `#{slot_id}` element")]
    MissingSlot { tag: String, slot_id: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("component `{tag}` failed: {reason}")]
    Component { tag: String, reason: String },
}

impl MountError {
    pub fn component(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Component {
            tag: tag.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Navigation
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("route load failed")]
    RouteLoad(#[source] LoadError),

    #[error("mount failed")]
    Mount(#[from] MountError),
}

impl NavigationError {
    /// HTTP-like status shown on the error page.
    pub fn status(&self) -> u16 {
        match self {
            Self::RouteLoad(LoadError::NotFound { .. }) => 404,
            Self::RouteLoad(LoadError::Failed { .. }) | Self::Mount(_) => 500,
        }
    }

    /// Message shown on the error page.
    pub fn message(&self) -> &'static str {
        match self.status() {
            404 => "Page not found",
            _ => "Could not load page",
        }
    }
}

impl From<LoadError> for NavigationError {
    fn from(err: LoadError) -> Self {
        Self::RouteLoad(err)
    }
}

// =============================================================================
// Store / Storage
// =============================================================================

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storing `{key}` ({size} bytes) exceeds the {quota} byte quota")]
    QuotaExceeded { key: String, size: usize, quota: usize },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("state serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid runtime configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("cannot read runtime configuration: {0}")]
    Io(#[from] std::io::Error),
}
