//! Components, component classes, page modules and layout chains.
//!
//! A [`ComponentClass`] plays the role of a custom element constructor: a
//! named factory, optionally pointing at the layout class that wraps it. The
//! layout link is fixed when the class is built from an already-built parent,
//! so layout chains are always finite and acyclic.

use std::fmt;
use std::rc::{Rc, Weak};
use std::cell::RefCell;

use super::dom::{Dom, NodeId};
use crate::error::{DomError, MountError};
use crate::types::{Location, Role};

// =============================================================================
// Component
// =============================================================================

/// Behaviour backing a mounted element.
pub trait Component {
    /// Called once the element is in the document. Layouts must render an
    /// element carrying the slot id here.
    fn connected(&self, ctx: &ElementContext) -> Result<(), MountError>;
}

/// What a component sees of the document it is mounted in.
///
/// Holds the document weakly: components live inside the document, so a
/// strong handle would keep it alive forever.
#[derive(Clone)]
pub struct ElementContext {
    dom: Weak<RefCell<Dom>>,
    element: NodeId,
    location: Location,
}

impl ElementContext {
    pub fn new(dom: &Rc<RefCell<Dom>>, element: NodeId, location: Location) -> Self {
        Self {
            dom: Rc::downgrade(dom),
            element,
            location,
        }
    }

    /// The element this component backs.
    pub fn element(&self) -> NodeId {
        self.element
    }

    /// Location at the time the element was mounted.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Run `f` with mutable access to the document.
    ///
    /// Fails with `UnknownNode` once the element has been released, so a
    /// context kept past unmount never touches the elements mounted after it.
    /// Must not be called while the document is already borrowed.
    pub fn with_dom<R>(&self, f: impl FnOnce(&mut Dom, NodeId) -> R) -> Result<R, DomError> {
        let dom = self.dom.upgrade().ok_or(DomError::Released)?;
        let mut dom = dom.borrow_mut();
        if !dom.contains(self.element) {
            return Err(DomError::UnknownNode(self.element));
        }
        Ok(f(&mut dom, self.element))
    }
}

impl fmt::Debug for ElementContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementContext")
            .field("element", &self.element)
            .field("location", &self.location)
            .finish()
    }
}

// =============================================================================
// Component Class
// =============================================================================

struct ClassInner {
    name: String,
    layout: Option<ComponentClass>,
    construct: Box<dyn Fn() -> Rc<dyn Component>>,
}

/// A named component constructor. Cloning shares the class; identity is
/// pointer identity.
#[derive(Clone)]
pub struct ComponentClass {
    inner: Rc<ClassInner>,
}

impl ComponentClass {
    /// A class with no layout.
    pub fn new<C, F>(name: impl Into<String>, construct: F) -> Self
    where
        C: Component + 'static,
        F: Fn() -> C + 'static,
    {
        Self::build(name.into(), None, construct)
    }

    /// A class rendered inside `layout`'s slot.
    pub fn with_layout<C, F>(name: impl Into<String>, layout: &ComponentClass, construct: F) -> Self
    where
        C: Component + 'static,
        F: Fn() -> C + 'static,
    {
        Self::build(name.into(), Some(layout.clone()), construct)
    }

    fn build<C, F>(name: String, layout: Option<ComponentClass>, construct: F) -> Self
    where
        C: Component + 'static,
        F: Fn() -> C + 'static,
    {
        Self {
            inner: Rc::new(ClassInner {
                name,
                layout,
                construct: Box::new(move || Rc::new(construct()) as Rc<dyn Component>),
            }),
        }
    }

    /// Class identifier used for tag derivation.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The layout this class is rendered inside, if any.
    pub fn layout(&self) -> Option<&ComponentClass> {
        self.inner.layout.as_ref()
    }

    /// Construct a fresh instance.
    pub fn construct(&self) -> Rc<dyn Component> {
        (self.inner.construct)()
    }

    pub fn same_class(&self, other: &ComponentClass) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentClass")
            .field("name", &self.inner.name)
            .field("layout", &self.inner.layout.as_ref().map(|l| l.name().to_string()))
            .finish()
    }
}

// =============================================================================
// Page Module
// =============================================================================

/// What a route module exports: its page class.
#[derive(Debug, Clone)]
pub struct PageModule {
    page: ComponentClass,
}

impl PageModule {
    pub fn new(page: ComponentClass) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &ComponentClass {
        &self.page
    }
}

// =============================================================================
// Layout Chain
// =============================================================================

/// Layouts from outermost to innermost, followed by the page.
#[derive(Debug, Clone)]
pub struct LayoutChain {
    layouts: Vec<ComponentClass>,
    page: ComponentClass,
}

impl LayoutChain {
    /// Walk `layout` links outward from the page, then reverse.
    pub fn from_page(page: &ComponentClass) -> Self {
        let mut layouts = Vec::new();
        let mut current = page.layout();
        while let Some(layout) = current {
            layouts.push(layout.clone());
            current = layout.layout();
        }
        layouts.reverse();

        Self {
            layouts,
            page: page.clone(),
        }
    }

    pub fn layouts(&self) -> &[ComponentClass] {
        &self.layouts
    }

    pub fn page(&self) -> &ComponentClass {
        &self.page
    }

    /// Number of components, page included (always at least 1).
    pub fn len(&self) -> usize {
        self.layouts.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Every class with its role, outermost first.
    pub fn iter(&self) -> impl Iterator<Item = (Role, &ComponentClass)> {
        self.layouts
            .iter()
            .map(|layout| (Role::Layout, layout))
            .chain(std::iter::once((Role::Page, &self.page)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Empty;

    impl Component for Empty {
        fn connected(&self, _ctx: &ElementContext) -> Result<(), MountError> {
            Ok(())
        }
    }

    #[test]
    fn test_chain_order() {
        let root = ComponentClass::new("RootLayout", || Empty);
        let section = ComponentClass::with_layout("SectionLayout", &root, || Empty);
        let page = ComponentClass::with_layout("DocsPage", &section, || Empty);

        let chain = LayoutChain::from_page(&page);
        let names: Vec<_> = chain.iter().map(|(role, c)| (role, c.name().to_string())).collect();

        assert_eq!(
            names,
            vec![
                (Role::Layout, "RootLayout".to_string()),
                (Role::Layout, "SectionLayout".to_string()),
                (Role::Page, "DocsPage".to_string()),
            ]
        );
        assert_eq!(chain.len(), 3);
        assert!(chain.page().same_class(&page));
    }

    #[test]
    fn test_chain_without_layouts() {
        let page = ComponentClass::new("HomePage", || Empty);
        let chain = LayoutChain::from_page(&page);
        assert_eq!(chain.len(), 1);
        assert!(chain.layouts().is_empty());
    }

    #[test]
    fn test_class_identity() {
        let a = ComponentClass::new("APage", || Empty);
        let a2 = a.clone();
        let b = ComponentClass::new("APage", || Empty);
        assert!(a.same_class(&a2));
        assert!(!a.same_class(&b));
    }

    #[test]
    fn test_construct_creates_fresh_instances() {
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let class = ComponentClass::new("CounterPage", move || {
            count_clone.set(count_clone.get() + 1);
            Empty
        });

        let _a = class.construct();
        let _b = class.construct();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_context_after_document_dropped() {
        let dom = Dom::new().shared();
        let root = dom.borrow().root();
        let ctx = ElementContext::new(&dom, root, Location::default());
        assert!(ctx.with_dom(|dom, el| dom.tag(el).map(str::to_string)).is_ok());

        drop(dom);
        assert_eq!(ctx.with_dom(|_, _| ()), Err(DomError::Released));
    }

    #[test]
    fn test_context_after_element_released() {
        let dom = Dom::new().shared();
        let root = dom.borrow().root();
        let list = dom.borrow_mut().append_element(root, "ul", &[], None).unwrap();
        let ctx = ElementContext::new(&dom, list, Location::default());

        dom.borrow_mut().remove(list).unwrap();
        let reused = dom.borrow_mut().append_element(root, "p", &[], Some("next page")).unwrap();
        assert_eq!(reused.index(), list.index());

        let written = ctx.with_dom(|dom, el| dom.set_text(el, "stale"));
        assert_eq!(written, Err(DomError::UnknownNode(list)));
        assert_eq!(dom.borrow().text_content(root), "next page");
    }
}
