//! Component Registry - tag name → component class.
//!
//! Manages custom element definitions:
//! - Write-once: a tag keeps the first class defined for it
//! - Lazily populated as navigations reach new routes, never cleared
//! - Owned by the application and shared with the engine, not ambient state

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::component::{Component, ComponentClass};
use crate::error::RegistryError;

/// Outcome of [`ComponentRegistry::define`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The tag was new and now maps to the class.
    Defined,
    /// The same class was already registered under the tag.
    AlreadyDefined,
    /// A different class owns the tag; it was left in place.
    Conflict,
}

#[derive(Debug, Default)]
pub struct ComponentRegistry {
    definitions: RefCell<HashMap<String, ComponentClass>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    // =========================================================================
    // Definition
    // =========================================================================

    /// Register `class` under `tag` unless the tag is already known.
    pub fn define(&self, tag: &str, class: &ComponentClass) -> Result<Registration, RegistryError> {
        if let Some(existing) = self.definitions.borrow().get(tag) {
            return Ok(if existing.same_class(class) {
                Registration::AlreadyDefined
            } else {
                Registration::Conflict
            });
        }

        if !is_valid_tag_name(tag) {
            return Err(RegistryError::InvalidTagName(tag.to_string()));
        }

        self.definitions
            .borrow_mut()
            .insert(tag.to_string(), class.clone());
        Ok(Registration::Defined)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn get(&self, tag: &str) -> Option<ComponentClass> {
        self.definitions.borrow().get(tag).cloned()
    }

    pub fn is_defined(&self, tag: &str) -> bool {
        self.definitions.borrow().contains_key(tag)
    }

    /// Construct an instance of the class registered for `tag`.
    pub fn create(&self, tag: &str) -> Option<Rc<dyn Component>> {
        // Release the borrow before running user constructors
        let class = self.get(tag)?;
        Some(class.construct())
    }

    /// Number of registered tags.
    pub fn len(&self) -> usize {
        self.definitions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.borrow().is_empty()
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.definitions.borrow().keys().cloned().collect();
        tags.sort();
        tags
    }
}

/// Custom element names start with a lowercase ASCII letter, contain a
/// hyphen and no uppercase letters.
pub fn is_valid_tag_name(tag: &str) -> bool {
    tag.starts_with(|c: char| c.is_ascii_lowercase())
        && tag.contains('-')
        && !tag.chars().any(|c| c.is_ascii_uppercase() || c.is_whitespace())
}
