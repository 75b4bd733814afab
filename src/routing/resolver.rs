//! Route Path Resolver - URL path to page module path.
//!
//! The mapping is a contract route authors rely on, so it is reproduced
//! exactly: a trailing slash targets the directory's `index` module, anything
//! else targets a module named after the last segment.

use crate::config::RoutesConfig;

/// Resolve a URL path to the module that defines its page.
///
/// Total: a path without a module surfaces later as a load failure.
pub fn resolve_route(route: &str, routes: &RoutesConfig) -> String {
    let path = if route.starts_with('/') {
        route.to_string()
    } else {
        format!("/{route}")
    };

    if path == "/" {
        return format!("{}/index.{}", routes.root, routes.extension);
    }

    let is_dir = path.ends_with('/');

    // Strip one leading and one trailing slash
    let clean = path.strip_prefix('/').unwrap_or(&path);
    let clean = clean.strip_suffix('/').unwrap_or(clean);

    let mut parts: Vec<&str> = clean.split('/').collect();
    let stem = if is_dir {
        "index"
    } else {
        parts.pop().unwrap_or("index")
    };

    let prefix = if parts.is_empty() {
        String::new()
    } else {
        format!("{}/", parts.join("/"))
    };

    format!("{}/{}{}.{}", routes.root, prefix, stem, routes.extension)
}
