//! Navigation Pipeline
//!
//! This module connects host events to mounted pages.
//!
//! # Pipeline Architecture
//!
//! ```text
//! click / popstate / navigate_to → history → resolve_route → ModuleLoader
//!   → LayoutChain → ComponentRegistry → Dom (layouts outer→inner, then page)
//! ```
//!
//! ## Data Flow
//!
//! 1. **links** - Decides whether a click is an in-app navigation
//! 2. **history** - Holds the location every navigation reads
//! 3. **navigation** - Loads the module and mounts the chain, one frame per layout
//! 4. **error_page** - Where failed navigations are redirected
//!
//! ## Key Design Principles
//!
//! - **One writer**: only the newest navigation mutates the mount target
//! - **Typed failures**: not-found vs. failed loads are decided by the loader
//! - **No escaping errors**: failures become a redirect, never a panic or `Err`

pub mod error_page;
pub mod frame;
pub mod history;
pub mod links;
pub mod navigation;

// Re-exports
pub use error_page::{error_page_class, error_url, ErrorIndexPage};
pub use frame::{FrameScheduler, YieldFrames, YieldOnce};
pub use history::{History, MemoryHistory};
pub use links::{find_internal_link, intercepted_href};
pub use navigation::{EngineBuilder, NavigationEngine, NavigationOutcome, NavigationStatus};
