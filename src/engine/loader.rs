//! Module Loader - on-demand page module loading.
//!
//! The engine only knows the [`ModuleLoader`] capability: a module path in,
//! a page module (or a typed failure) out, asynchronously. Bundler-driven
//! splitting, filesystem lookup or an explicit table all fit behind it.
//! [`StaticModuleLoader`] is the explicit-table version.

use std::collections::HashMap;
use std::rc::Rc;

use futures::future::{self, LocalBoxFuture};

use super::component::{ComponentClass, PageModule};
use crate::config::RoutesConfig;
use crate::error::LoadError;
use crate::routing::resolve_route;

/// Loads the page module that lives at a resolved module path.
pub trait ModuleLoader {
    fn load(&self, module_path: &str) -> LocalBoxFuture<'static, Result<PageModule, LoadError>>;
}

type ModuleFactory = Rc<dyn Fn() -> Result<PageModule, LoadError>>;

/// Module table built up front. Unknown paths fail with `NotFound`.
#[derive(Default)]
pub struct StaticModuleLoader {
    routes: RoutesConfig,
    modules: HashMap<String, ModuleFactory>,
}

impl StaticModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a non-default routes layout for [`page`](Self::page).
    pub fn with_routes(routes: RoutesConfig) -> Self {
        Self {
            routes,
            modules: HashMap::new(),
        }
    }

    /// Register a module by its module path.
    pub fn module(mut self, module_path: impl Into<String>, page: ComponentClass) -> Self {
        let module = PageModule::new(page);
        self.modules
            .insert(module_path.into(), Rc::new(move || Ok::<_, LoadError>(module.clone())));
        self
    }

    /// Register a module by a URL path that resolves to it.
    pub fn page(self, url_path: &str, page: ComponentClass) -> Self {
        let module_path = resolve_route(url_path, &self.routes);
        self.module(module_path, page)
    }

    /// Register a module whose initialization runs on every load and may fail.
    pub fn module_with<F>(mut self, module_path: impl Into<String>, init: F) -> Self
    where
        F: Fn() -> Result<PageModule, LoadError> + 'static,
    {
        self.modules.insert(module_path.into(), Rc::new(init));
        self
    }

    pub fn contains(&self, module_path: &str) -> bool {
        self.modules.contains_key(module_path)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleLoader for StaticModuleLoader {
    fn load(&self, module_path: &str) -> LocalBoxFuture<'static, Result<PageModule, LoadError>> {
        let result = match self.modules.get(module_path) {
            Some(factory) => factory(),
            None => Err(LoadError::not_found(module_path)),
        };
        Box::pin(future::ready(result))
    }
}
