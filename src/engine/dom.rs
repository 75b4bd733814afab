//! Element tree - the document the engine mounts into.
//!
//! Elements are indices into a node arena rather than objects, with a free
//! pool for O(1) reuse. A [`NodeId`] also carries the generation of its slot,
//! so an id kept past its element's release never resolves to the element
//! that reuses the slot. Each element may carry the component instance that
//! backs it (the custom element's behaviour); the instance lives exactly as
//! long as the element.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::cell::RefCell;

use super::component::Component;
use crate::error::DomError;

/// Shared handle to a document.
pub type SharedDom = Rc<RefCell<Dom>>;

/// Handle to an element in a [`Dom`]: arena index plus slot generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    pub fn index(self) -> usize {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Default)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

// =============================================================================
// Dom
// =============================================================================

pub struct Dom {
    nodes: Vec<Option<Node>>,
    /// Bumped on release; parallel to `nodes`.
    generations: Vec<u32>,
    free: Vec<usize>,
    components: HashMap<NodeId, Rc<dyn Component>>,
    root: NodeId,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dom")
            .field("root", &self.root)
            .field("nodes", &self.node_count())
            .field("components", &self.components.len())
            .finish()
    }
}

impl Dom {
    /// Create a document with an empty `body` root.
    pub fn new() -> Self {
        let root = Node {
            tag: "body".to_string(),
            ..Node::default()
        };
        Self {
            nodes: vec![Some(root)],
            generations: vec![0],
            free: Vec::new(),
            components: HashMap::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        }
    }

    pub fn shared(self) -> SharedDom {
        Rc::new(RefCell::new(self))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn is_live(&self, id: NodeId) -> bool {
        self.generations.get(id.index) == Some(&id.generation)
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        if !self.is_live(id) {
            return Err(DomError::UnknownNode(id));
        }
        self.nodes
            .get(id.index)
            .and_then(|slot| slot.as_ref())
            .ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        if !self.is_live(id) {
            return Err(DomError::UnknownNode(id));
        }
        self.nodes
            .get_mut(id.index)
            .and_then(|slot| slot.as_mut())
            .ok_or(DomError::UnknownNode(id))
    }

    // -------------------------------------------------------------------------
    // Creation
    // -------------------------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let node = Node {
            tag: tag.to_string(),
            ..Node::default()
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(node);
                index
            }
            None => {
                self.nodes.push(Some(node));
                self.generations.push(0);
                self.nodes.len() - 1
            }
        };
        NodeId {
            index,
            generation: self.generations[index],
        }
    }

    /// Create an element with attributes and text, appended to `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: &[(&str, &str)],
        text: Option<&str>,
    ) -> Result<NodeId, DomError> {
        self.node(parent)?;
        let id = self.create_element(tag);
        for (name, value) in attributes {
            self.set_attribute(id, name, value)?;
        }
        if let Some(text) = text {
            self.set_text(id, text)?;
        }
        self.append_child(parent, id)?;
        Ok(id)
    }

    // -------------------------------------------------------------------------
    // Attributes and text
    // -------------------------------------------------------------------------

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.node(id).ok().map(|node| node.tag.as_str())
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.node_mut(id)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<(), DomError> {
        self.node_mut(id)?.attributes.remove(name);
        Ok(())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).ok()?.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Replace the element's content with a text run.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        self.clear_children(id)?;
        self.node_mut(id)?.text = Some(text.to_string());
        Ok(())
    }

    /// Concatenated text of the element and its descendants, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Ok(node) = self.node(id) else { return };
        if let Some(text) = &node.text {
            out.push_str(text);
        }
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }

    // -------------------------------------------------------------------------
    // Tree structure
    // -------------------------------------------------------------------------

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).ok()?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Append `child` as the last child of `parent`, moving it if attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node(parent)?;
        self.node(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        self.detach(child)?;
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Put `new` where `old` is and drop `old` with its subtree.
    pub fn replace_with(&mut self, old: NodeId, new: NodeId) -> Result<(), DomError> {
        let parent = self.node(old)?.parent.ok_or(DomError::Detached(old))?;
        self.node(new)?;
        if self.is_inclusive_ancestor(new, parent) {
            return Err(DomError::HierarchyRequest { parent, child: new });
        }

        self.detach(new)?;
        let siblings = &mut self.node_mut(parent)?.children;
        if let Some(position) = siblings.iter().position(|&c| c == old) {
            siblings[position] = new;
        }
        self.node_mut(new)?.parent = Some(parent);
        self.node_mut(old)?.parent = None;
        self.release(old);
        Ok(())
    }

    /// Drop every child of `id` (and their subtrees). Text is kept.
    pub fn clear_children(&mut self, id: NodeId) -> Result<(), DomError> {
        let children = std::mem::take(&mut self.node_mut(id)?.children);
        for child in children {
            if let Ok(node) = self.node_mut(child) {
                node.parent = None;
            }
            self.release(child);
        }
        Ok(())
    }

    /// Detach `id` from its parent and drop its subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        if id == self.root {
            return Err(DomError::HierarchyRequest {
                parent: self.root,
                child: id,
            });
        }
        self.detach(id)?;
        self.release(id);
        Ok(())
    }

    fn detach(&mut self, id: NodeId) -> Result<(), DomError> {
        if let Some(parent) = self.node_mut(id)?.parent.take() {
            self.node_mut(parent)?.children.retain(|&c| c != id);
        }
        Ok(())
    }

    /// Free `id` and its descendants, dropping their component instances.
    fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !self.is_live(current) {
                continue;
            }
            let Some(node) = self.nodes.get_mut(current.index).and_then(Option::take) else {
                continue;
            };
            stack.extend(node.children);
            self.components.remove(&current);
            self.generations[current.index] = self.generations[current.index].wrapping_add(1);
            self.free.push(current.index);
        }
    }

    /// Number of live elements, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// First descendant of `scope` (document order) whose `id` attribute matches.
    pub fn element_by_id(&self, scope: NodeId, id: &str) -> Option<NodeId> {
        self.find_descendant(scope, &|dom, node| dom.attribute(node, "id") == Some(id))
    }

    /// All descendants of `scope` with the given tag, in document order.
    pub fn elements_by_tag(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk(scope, &mut |dom, node| {
            if dom.tag(node) == Some(tag) {
                found.push(node);
            }
        });
        found
    }

    /// Nearest inclusive ancestor matching `predicate`.
    pub fn closest(&self, id: NodeId, predicate: impl Fn(&Dom, NodeId) -> bool) -> Option<NodeId> {
        let mut current = Some(id).filter(|&node| self.contains(node));
        while let Some(node) = current {
            if predicate(self, node) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    fn find_descendant(
        &self,
        scope: NodeId,
        predicate: &dyn Fn(&Dom, NodeId) -> bool,
    ) -> Option<NodeId> {
        for &child in self.children(scope) {
            if predicate(self, child) {
                return Some(child);
            }
            if let Some(found) = self.find_descendant(child, predicate) {
                return Some(found);
            }
        }
        None
    }

    fn walk(&self, scope: NodeId, visit: &mut dyn FnMut(&Dom, NodeId)) {
        for &child in self.children(scope) {
            visit(self, child);
            self.walk(child, visit);
        }
    }

    // -------------------------------------------------------------------------
    // Component instances
    // -------------------------------------------------------------------------

    pub fn attach_component(&mut self, id: NodeId, component: Rc<dyn Component>) -> Result<(), DomError> {
        self.node(id)?;
        self.components.insert(id, component);
        Ok(())
    }

    pub fn component(&self, id: NodeId) -> Option<Rc<dyn Component>> {
        self.components.get(&id).cloned()
    }

    // -------------------------------------------------------------------------
    // Serialization
    // -------------------------------------------------------------------------

    /// Serialize `id` and its subtree as HTML (for debugging and tests).
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Ok(node) = self.node(id) else { return };
        out.push('<');
        out.push_str(&node.tag);
        for (name, value) in &node.attributes {
            if value.is_empty() {
                out.push_str(&format!(" {name}"));
            } else {
                out.push_str(&format!(" {name}=\"{value}\""));
            }
        }
        out.push('>');
        if let Some(text) = &node.text {
            out.push_str(text);
        }
        for &child in &node.children {
            self.write_html(child, out);
        }
        out.push_str(&format!("</{}>", node.tag));
    }
}
