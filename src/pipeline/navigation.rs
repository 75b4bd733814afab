//! Navigation Engine - route → page module → mounted layout chain.
//!
//! Every navigation runs as a task on the host's local executor:
//!
//! ```text
//! clear mount target → resolve module path → load module (await)
//!   → define tags → for each layout: insert, connect, next frame, descend into slot
//!   → replace innermost slot with the page, connect, next frame
//! ```
//!
//! Navigations are never queued. Each one takes a generation number and,
//! after every await, stops quietly if a newer navigation has started, so
//! only the latest navigation writes to the document.
//!
//! # Example
//!
//! ```ignore
//! let mut pool = LocalPool::new();
//! let engine = NavigationEngine::builder(dom, app, loader, pool.spawner()).build();
//! engine.start();
//! pool.run_until_stalled();
//!
//! engine.navigate_to("/about/");
//! pool.run_until_stalled();
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use futures::task::{LocalSpawn, LocalSpawnExt};
use spark_signals::{signal, Signal};
use tracing::{debug, error, warn};

use super::error_page::error_url;
use super::frame::{FrameScheduler, YieldFrames};
use super::history::{History, MemoryHistory};
use super::links::intercepted_href;
use crate::config::RuntimeConfig;
use crate::engine::{
    ComponentRegistry, ElementContext, LayoutChain, ModuleLoader, NodeId, Registration, SharedDom,
};
use crate::error::{MountError, NavigationError};
use crate::routing::{derive_tag, resolve_route};
use crate::types::{ClickEvent, HostEvent, Location, Role};

// =============================================================================
// Types
// =============================================================================

/// Where the engine is in the current navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NavigationStatus {
    #[default]
    Idle,
    /// Waiting for the page module.
    Resolving(Location),
    /// Inserting layouts and the page.
    Mounting(Location),
}

/// How a navigation task ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Mounted,
    /// A newer navigation started; this one stopped without touching the document.
    Superseded,
    /// The mount target is no longer in the document.
    NoMountTarget,
}

#[derive(Clone, Copy)]
enum Insert {
    Append,
    Replace,
}

// =============================================================================
// Builder
// =============================================================================

pub struct EngineBuilder {
    config: RuntimeConfig,
    dom: SharedDom,
    mount_target: NodeId,
    loader: Rc<dyn ModuleLoader>,
    spawner: Rc<dyn LocalSpawn>,
    history: Rc<dyn History>,
    registry: Rc<ComponentRegistry>,
    frames: Rc<dyn FrameScheduler>,
}

impl EngineBuilder {
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn history(mut self, history: Rc<dyn History>) -> Self {
        self.history = history;
        self
    }

    pub fn registry(mut self, registry: Rc<ComponentRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn frames(mut self, frames: Rc<dyn FrameScheduler>) -> Self {
        self.frames = frames;
        self
    }

    pub fn build(self) -> NavigationEngine {
        NavigationEngine {
            inner: Rc::new(EngineInner {
                config: self.config,
                dom: self.dom,
                mount_target: self.mount_target,
                loader: self.loader,
                spawner: self.spawner,
                history: self.history,
                registry: self.registry,
                frames: self.frames,
                started: Cell::new(false),
                generation: Cell::new(0),
                status: signal(NavigationStatus::Idle),
                current: signal(None),
            }),
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

struct EngineInner {
    config: RuntimeConfig,
    dom: SharedDom,
    mount_target: NodeId,
    loader: Rc<dyn ModuleLoader>,
    spawner: Rc<dyn LocalSpawn>,
    history: Rc<dyn History>,
    registry: Rc<ComponentRegistry>,
    frames: Rc<dyn FrameScheduler>,
    started: Cell<bool>,
    generation: Cell<u64>,
    status: Signal<NavigationStatus>,
    current: Signal<Option<Location>>,
}

/// Cheap-clone handle to the navigation engine.
#[derive(Clone)]
pub struct NavigationEngine {
    inner: Rc<EngineInner>,
}

impl fmt::Debug for NavigationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationEngine")
            .field("mount_target", &self.inner.mount_target)
            .field("started", &self.inner.started.get())
            .field("generation", &self.inner.generation.get())
            .finish()
    }
}

impl NavigationEngine {
    /// Start building an engine that mounts into `mount_target` of `dom`,
    /// loads pages through `loader` and runs navigations on `spawner`.
    pub fn builder(
        dom: SharedDom,
        mount_target: NodeId,
        loader: impl ModuleLoader + 'static,
        spawner: impl LocalSpawn + 'static,
    ) -> EngineBuilder {
        EngineBuilder {
            config: RuntimeConfig::default(),
            dom,
            mount_target,
            loader: Rc::new(loader),
            spawner: Rc::new(spawner),
            history: Rc::new(MemoryHistory::default()),
            registry: ComponentRegistry::shared(),
            frames: Rc::new(YieldFrames),
        }
    }

    // -------------------------------------------------------------------------
    // Public API
    // -------------------------------------------------------------------------

    /// Begin listening for clicks and popstate, then load the current location.
    pub fn start(&self) {
        if self.inner.started.replace(true) {
            warn!("navigation engine already started");
            return;
        }
        self.schedule();
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.get()
    }

    /// Push `path` and navigate, unless it is already the current pathname.
    pub fn navigate_to(&self, path: &str) {
        if self.inner.history.location().pathname == Location::parse(path).pathname {
            return;
        }
        self.inner.history.push_state(path);
        self.schedule();
    }

    /// Navigate to the current location again.
    pub fn reload(&self) {
        self.schedule();
    }

    /// Redirect to the error route with `code` and an optional message.
    pub fn go_to_error(&self, code: u16, message: Option<&str>) {
        let url = error_url(&self.inner.config.error_route, code, message);
        self.inner.history.push_state(&url);
        self.schedule();
    }

    /// Deliver a host event. Returns true when the default action is prevented.
    ///
    /// Events are ignored until [`start`](Self::start) has been called.
    pub fn dispatch_event(&self, event: &HostEvent) -> bool {
        if !self.inner.started.get() {
            return false;
        }
        match event {
            HostEvent::Click(click) => self.handle_click(click),
            HostEvent::PopState => {
                self.schedule();
                false
            }
        }
    }

    pub fn status(&self) -> NavigationStatus {
        self.inner.status.get()
    }

    /// Status signal for reactive tracking.
    pub fn status_signal(&self) -> Signal<NavigationStatus> {
        self.inner.status.clone()
    }

    /// Location of the last page that finished mounting.
    pub fn current_location(&self) -> Option<Location> {
        self.inner.current.get()
    }

    /// Mounted-location signal for reactive tracking.
    pub fn location_signal(&self) -> Signal<Option<Location>> {
        self.inner.current.clone()
    }

    pub fn history(&self) -> &Rc<dyn History> {
        &self.inner.history
    }

    pub fn registry(&self) -> &Rc<ComponentRegistry> {
        &self.inner.registry
    }

    pub fn dom(&self) -> &SharedDom {
        &self.inner.dom
    }

    pub fn mount_target(&self) -> NodeId {
        self.inner.mount_target
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    // -------------------------------------------------------------------------
    // Event handling
    // -------------------------------------------------------------------------

    fn handle_click(&self, click: &ClickEvent) -> bool {
        let href = {
            let dom = self.inner.dom.borrow();
            intercepted_href(&dom, click)
        };
        let Some(href) = href else {
            return false;
        };

        if Location::parse(&href).href() != self.inner.history.location().href() {
            self.inner.history.push_state(&href);
            self.schedule();
        }
        true
    }

    // -------------------------------------------------------------------------
    // Navigation tasks
    // -------------------------------------------------------------------------

    fn is_current(&self, generation: u64) -> bool {
        self.inner.generation.get() == generation
    }

    /// Start a navigation to the current history location.
    fn schedule(&self) {
        let generation = self.inner.generation.get() + 1;
        self.inner.generation.set(generation);

        let engine = self.clone();
        if let Err(err) = self
            .inner
            .spawner
            .spawn_local(async move { engine.run(generation).await })
        {
            error!(error = %err, "cannot spawn navigation task");
        }
    }

    async fn run(self, generation: u64) {
        let location = self.inner.history.location();

        match self.load_and_mount(generation, &location).await {
            Ok(NavigationOutcome::Mounted) => {
                debug!(path = %location.pathname, "route mounted");
            }
            Ok(NavigationOutcome::Superseded) => {
                debug!(path = %location.pathname, "navigation superseded");
            }
            Ok(NavigationOutcome::NoMountTarget) => {
                warn!(mount_target = ?self.inner.mount_target, "mount target is not in the document");
            }
            Err(err) => {
                if !self.is_current(generation) {
                    debug!(path = %location.pathname, error = ?err, "ignoring failure of superseded navigation");
                    return;
                }
                self.inner.status.set(NavigationStatus::Idle);
                error!(path = %location.pathname, error = ?err, "navigation failed");

                if location.pathname == self.inner.config.error_route {
                    self.render_fallback(&err);
                } else {
                    self.go_to_error(err.status(), Some(err.message()));
                }
            }
        }
    }

    async fn load_and_mount(
        &self,
        generation: u64,
        location: &Location,
    ) -> Result<NavigationOutcome, NavigationError> {
        let inner = &self.inner;
        if !self.is_current(generation) {
            return Ok(NavigationOutcome::Superseded);
        }

        debug!(path = %location.pathname, "loading route");
        {
            let mut dom = inner.dom.borrow_mut();
            if !dom.contains(inner.mount_target) {
                return Ok(NavigationOutcome::NoMountTarget);
            }
            dom.clear_children(inner.mount_target)
                .map_err(MountError::from)?;
        }
        inner.status.set(NavigationStatus::Resolving(location.clone()));

        // 1. Load the page module
        let module_path = resolve_route(&location.pathname, &inner.config.routes);
        let module = inner.loader.load(&module_path).await?;
        if !self.is_current(generation) {
            return Ok(NavigationOutcome::Superseded);
        }

        // 2. Define tags for every class in the chain
        let chain = LayoutChain::from_page(module.page());
        let mut layout_tags = Vec::with_capacity(chain.len() - 1);
        let mut page_tag = String::new();
        for (role, class) in chain.iter() {
            let tag = derive_tag(class.name(), role);
            match inner.registry.define(&tag, class).map_err(MountError::from)? {
                Registration::Defined => debug!(tag = %tag, "defined component"),
                Registration::AlreadyDefined => {}
                Registration::Conflict => {
                    warn!(tag = %tag, class = class.name(), "tag owned by another class, keeping it")
                }
            }
            match role {
                Role::Layout => layout_tags.push(tag),
                Role::Page => page_tag = tag,
            }
        }

        // 3. Mount layouts outer to inner, descending into each slot
        inner.status.set(NavigationStatus::Mounting(location.clone()));
        let mut container = inner.mount_target;
        for tag in &layout_tags {
            let element = self.insert_element(tag, container, Insert::Append, location)?;
            inner.frames.next_frame().await;
            if !self.is_current(generation) {
                return Ok(NavigationOutcome::Superseded);
            }

            let slot_id = &inner.config.slot_id;
            container = inner
                .dom
                .borrow()
                .element_by_id(element, slot_id)
                .ok_or_else(|| MountError::MissingSlot {
                    tag: tag.clone(),
                    slot_id: slot_id.clone(),
                })?;
        }

        // 4. Swap the page in for the innermost slot
        let insert = if container == inner.mount_target {
            Insert::Append
        } else {
            Insert::Replace
        };
        self.insert_element(&page_tag, container, insert, location)?;
        inner.frames.next_frame().await;
        if !self.is_current(generation) {
            return Ok(NavigationOutcome::Superseded);
        }

        inner.status.set(NavigationStatus::Idle);
        inner.current.set(Some(location.clone()));
        Ok(NavigationOutcome::Mounted)
    }

    /// Create the element for `tag`, insert it and run its `connected` callback.
    fn insert_element(
        &self,
        tag: &str,
        container: NodeId,
        insert: Insert,
        location: &Location,
    ) -> Result<NodeId, MountError> {
        let inner = &self.inner;
        let component = inner
            .registry
            .create(tag)
            .ok_or_else(|| MountError::component(tag, "tag is not defined"))?;

        let element = {
            let mut dom = inner.dom.borrow_mut();
            let element = dom.create_element(tag);
            dom.attach_component(element, component.clone())?;
            match insert {
                Insert::Append => dom.append_child(container, element)?,
                Insert::Replace => dom.replace_with(container, element)?,
            }
            element
        };

        let ctx = ElementContext::new(&inner.dom, element, location.clone());
        component.connected(&ctx)?;
        Ok(element)
    }

    /// Plain-text error when the error route itself cannot be shown.
    fn render_fallback(&self, err: &NavigationError) {
        let target = self.inner.mount_target;
        let text = format!("Error {}: {}", err.status(), err.message());
        let mut dom = self.inner.dom.borrow_mut();
        let rendered = dom
            .clear_children(target)
            .and_then(|_| dom.append_element(target, "p", &[], Some(text.as_str())));
        if let Err(dom_err) = rendered {
            error!(error = %dom_err, "cannot render error fallback");
        }
    }
}
