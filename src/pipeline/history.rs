//! Session history capability.
//!
//! The engine reads the current location and pushes new entries; it never
//! walks history itself. Back/forward is the host's business: it moves the
//! history and then dispatches `HostEvent::PopState`.

use std::cell::{Cell, RefCell};

use crate::types::Location;

pub trait History {
    /// Current entry.
    fn location(&self) -> Location;

    /// Add an entry after the current one, dropping any forward entries.
    fn push_state(&self, url: &str);
}

/// History kept in memory, for tests and headless hosts.
#[derive(Debug)]
pub struct MemoryHistory {
    entries: RefCell<Vec<Location>>,
    index: Cell<usize>,
}

impl MemoryHistory {
    pub fn new(initial_url: &str) -> Self {
        Self {
            entries: RefCell::new(vec![Location::parse(initial_url)]),
            index: Cell::new(0),
        }
    }

    /// Step back one entry. Returns false at the start of history.
    pub fn back(&self) -> bool {
        let index = self.index.get();
        if index == 0 {
            return false;
        }
        self.index.set(index - 1);
        true
    }

    /// Step forward one entry. Returns false at the end of history.
    pub fn forward(&self) -> bool {
        let index = self.index.get();
        if index + 1 >= self.entries.borrow().len() {
            return false;
        }
        self.index.set(index + 1);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Every entry's `href`, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().iter().map(Location::href).collect()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Location {
        self.entries.borrow()[self.index.get()].clone()
    }

    fn push_state(&self, url: &str) {
        let mut entries = self.entries.borrow_mut();
        let index = self.index.get();
        entries.truncate(index + 1);
        entries.push(Location::parse(url));
        self.index.set(index + 1);
    }
}
