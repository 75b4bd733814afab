//! Core types shared by the routing, engine and pipeline modules.

use crate::engine::NodeId;

// =============================================================================
// Location
// =============================================================================

/// A history entry: pathname plus raw query string.
///
/// `pathname` always starts with `/`. `search` is either empty or starts
/// with `?`. Fragments are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub pathname: String,
    pub search: String,
}

impl Location {
    /// Parse an in-app URL such as `/errors?code=404`.
    pub fn parse(url: &str) -> Self {
        let url = url.split('#').next().unwrap_or_default();
        let (path, search) = match url.find('?') {
            Some(at) => (&url[..at], &url[at..]),
            None => (url, ""),
        };

        let pathname = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        Self {
            pathname,
            search: if search == "?" { String::new() } else { search.to_string() },
        }
    }

    /// `pathname + search`, the part of `href` an in-app link can change.
    pub fn href(&self) -> String {
        format!("{}{}", self.pathname, self.search)
    }

    /// Decode the first value of a query parameter.
    pub fn query(&self, name: &str) -> Option<String> {
        let query = self.search.strip_prefix('?')?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::parse("/")
    }
}

// =============================================================================
// Component Role
// =============================================================================

/// Position of a component in a layout chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Page,
    Layout,
}

impl Role {
    /// Suffix stripped from class names (`Page` / `Layout`).
    pub fn class_suffix(self) -> &'static str {
        match self {
            Self::Page => "Page",
            Self::Layout => "Layout",
        }
    }

    /// Suffix appended to tag names (`-page` / `-layout`).
    pub fn tag_suffix(self) -> &'static str {
        match self {
            Self::Page => "-page",
            Self::Layout => "-layout",
        }
    }
}

// =============================================================================
// Click Events
// =============================================================================

bitflags::bitflags! {
    /// Modifier keys held during a click.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const NONE = 0;
        const META = 1 << 0;
        const CTRL = 1 << 1;
        const SHIFT = 1 << 2;
        const ALT = 1 << 3;
    }
}

/// Mouse button that produced a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    #[default]
    Primary,
    Auxiliary,
    Secondary,
}

/// A click delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    /// Innermost element under the pointer.
    pub target: NodeId,
    pub button: MouseButton,
    pub modifiers: Modifiers,
}

impl ClickEvent {
    /// Plain primary-button click with no modifiers.
    pub fn new(target: NodeId) -> Self {
        Self {
            target,
            button: MouseButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(target: NodeId, modifiers: Modifiers) -> Self {
        Self {
            modifiers,
            ..Self::new(target)
        }
    }

    pub fn with_button(target: NodeId, button: MouseButton) -> Self {
        Self {
            button,
            ..Self::new(target)
        }
    }
}

/// Events the engine listens for once started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Click(ClickEvent),
    /// Back/forward navigation already applied to the history.
    PopState,
}
