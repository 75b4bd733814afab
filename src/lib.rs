//! # sahara-spa
//!
//! Client-side routing and page mounting for single-page applications.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! observable navigation state.
//!
//! ## Architecture
//!
//! A URL path maps to a page module by convention. Loading the module yields
//! a page class and its chain of parent layouts; each class is registered
//! under a tag derived from its name and mounted into the layout above it.
//!
//! ```text
//! URL → resolve_route → ModuleLoader → LayoutChain → ComponentRegistry → Dom
//! ```
//!
//! The host (history, frame scheduling, the element tree) sits behind traits
//! so the whole pipeline runs headless on a `futures` local executor.
//!
//! ## Modules
//!
//! - [`routing`] - URL path → module path, class name → tag name
//! - [`engine`] - Element tree, component classes, registry, module loading
//! - [`pipeline`] - Navigation engine, history, link interception, error page
//! - [`state`] - Observable store with optional persistence
//! - [`config`] - Runtime configuration
//! - [`error`] - Error types
//! - [`utils`] - Id parsing helpers

pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod routing;
pub mod state;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use types::*;

pub use config::{RoutesConfig, RuntimeConfig};

pub use error::{
    ConfigError, DomError, LoadError, MountError, NavigationError, RegistryError, StorageError,
    StoreError,
};

pub use routing::{derive_tag, resolve_route};

pub use engine::{
    Component, ComponentClass, ComponentRegistry, Dom, ElementContext, LayoutChain, ModuleLoader,
    NodeId, PageModule, Registration, SharedDom, StaticModuleLoader,
};

pub use pipeline::{
    error_page_class, error_url, FrameScheduler, History, MemoryHistory, NavigationEngine,
    NavigationOutcome, NavigationStatus, YieldFrames,
};

pub use state::{
    observe, observe_persistent, Field, FileStorage, KeyValueStorage, MemoryStorage,
    ObservableState,
};

pub use utils::{parse_id, parse_id_allow_zero};
