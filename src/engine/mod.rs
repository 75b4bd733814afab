//! Engine - Documents, components, definitions and module loading.
//!
//! The engine holds the building blocks a navigation works with:
//! - Dom: Element arena the application is mounted into
//! - Component: Component trait, component classes, page modules, layout chains
//! - Registry: Write-once tag → class definitions
//! - Loader: The `ModuleLoader` capability and a static implementation
//!
//! # Architecture
//!
//! Elements are NOT objects. They are indices into a node arena:
//!
//! ```text
//! Index 0: body         (parent=None, children=[1])
//! Index 1: main#app     (parent=0,    children=[2])
//! Index 2: base-layout  (parent=1,    component=BaseLayout)
//! ```
//!
//! A component instance is attached to the element it backs and dropped
//! together with it.

mod component;
mod dom;
mod loader;
mod registry;

pub use component::*;
pub use dom::*;
pub use loader::*;
pub use registry::*;
