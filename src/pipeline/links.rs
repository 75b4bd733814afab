//! Link interception policy.
//!
//! A click is handled in-app only when it lands inside `<a href="/...">` and
//! the author has not opted out. Opt-outs, in the order they are checked:
//!
//! - any modifier key, or a non-primary button
//! - `target="_blank"`
//! - `rel="external"`
//! - a `download` attribute

use crate::engine::{Dom, NodeId};
use crate::types::{ClickEvent, MouseButton};

/// The in-app anchor containing the click target, if any.
pub fn find_internal_link(dom: &Dom, target: NodeId) -> Option<NodeId> {
    dom.closest(target, |dom, node| {
        dom.tag(node) == Some("a")
            && dom
                .attribute(node, "href")
                .is_some_and(|href| href.starts_with('/'))
    })
}

/// The `href` to navigate to when `event` should be intercepted.
pub fn intercepted_href(dom: &Dom, event: &ClickEvent) -> Option<String> {
    if !event.modifiers.is_empty() || event.button != MouseButton::Primary {
        return None;
    }

    let anchor = find_internal_link(dom, event.target)?;

    if dom.attribute(anchor, "target") == Some("_blank")
        || dom.attribute(anchor, "rel") == Some("external")
        || dom.has_attribute(anchor, "download")
    {
        return None;
    }

    dom.attribute(anchor, "href").map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Modifiers;

    fn link(attributes: &[(&str, &str)]) -> (Dom, NodeId) {
        let mut dom = Dom::new();
        let root = dom.root();
        let anchor = dom.append_element(root, "a", attributes, None).unwrap();
        let label = dom.append_element(anchor, "span", &[], Some("go")).unwrap();
        (dom, label)
    }

    #[test]
    fn test_plain_internal_link() {
        let (dom, label) = link(&[("href", "/about/")]);
        assert_eq!(
            intercepted_href(&dom, &ClickEvent::new(label)).as_deref(),
            Some("/about/")
        );
    }

    #[test]
    fn test_external_href_ignored() {
        let (dom, label) = link(&[("href", "https://example.com/")]);
        assert_eq!(intercepted_href(&dom, &ClickEvent::new(label)), None);
    }

    #[test]
    fn test_modifier_clicks_ignored() {
        let (dom, label) = link(&[("href", "/about/")]);
        for modifiers in [Modifiers::META, Modifiers::CTRL, Modifiers::SHIFT, Modifiers::ALT] {
            let event = ClickEvent::with_modifiers(label, modifiers);
            assert_eq!(intercepted_href(&dom, &event), None);
        }
    }

    #[test]
    fn test_non_primary_button_ignored() {
        let (dom, label) = link(&[("href", "/about/")]);
        for button in [MouseButton::Auxiliary, MouseButton::Secondary] {
            let event = ClickEvent::with_button(label, button);
            assert_eq!(intercepted_href(&dom, &event), None);
        }
    }

    #[test]
    fn test_author_opt_outs() {
        for attributes in [
            &[("href", "/about/"), ("target", "_blank")][..],
            &[("href", "/about/"), ("rel", "external")][..],
            &[("href", "/about/"), ("download", "")][..],
        ] {
            let (dom, label) = link(attributes);
            assert_eq!(intercepted_href(&dom, &ClickEvent::new(label)), None);
        }
    }

    #[test]
    fn test_other_target_is_intercepted() {
        let (dom, label) = link(&[("href", "/about/"), ("target", "_self"), ("rel", "nofollow")]);
        assert!(intercepted_href(&dom, &ClickEvent::new(label)).is_some());
    }

    #[test]
    fn test_click_outside_link() {
        let mut dom = Dom::new();
        let root = dom.root();
        let button = dom.append_element(root, "button", &[], Some("x")).unwrap();
        assert_eq!(intercepted_href(&dom, &ClickEvent::new(button)), None);
    }
}
