//! File-convention routing.
//!
//! Two pure functions that every navigation goes through:
//!
//! - [`resolve_route`] - URL path → page module path
//! - [`derive_tag`] - component class name + role → custom element tag
//!
//! ```text
//! /            → /src/routes/index.rs
//! /about/      → /src/routes/about/index.rs
//! /demos/todos → /src/routes/demos/todos.rs
//!
//! BaseLayout   → base-layout
//! TodosPage    → todos-page
//! ```

mod resolver;
mod tag_name;

pub use resolver::*;
pub use tag_name::*;
