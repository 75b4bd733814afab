//! Tag Name Deriver - component class name to custom element tag.
//!
//! `TodosPage` → `todos-page`, `BaseLayout` → `base-layout`,
//! `UserProfilePage` → `user-profile-page`.

use crate::types::Role;

/// Derive the custom element tag for a component class.
///
/// Strips one trailing role suffix, splits camel-case at lowercase→uppercase
/// boundaries, lowercases and appends `-page`/`-layout`. Feeding a derived tag
/// back in returns it unchanged.
pub fn derive_tag(class_name: &str, role: Role) -> String {
    let stem = class_name
        .strip_suffix(role.class_suffix())
        .unwrap_or(class_name);

    let mut kebab = String::with_capacity(stem.len() + 8);
    let mut prev_lower = false;
    for ch in stem.chars() {
        if prev_lower && ch.is_ascii_uppercase() {
            kebab.push('-');
        }
        prev_lower = ch.is_ascii_lowercase();
        kebab.push(ch);
    }

    let mut tag = kebab.to_lowercase();
    if !tag.ends_with(role.tag_suffix()) {
        tag.push_str(role.tag_suffix());
    }
    tag
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_role_suffix() {
        assert_eq!(derive_tag("TodosPage", Role::Page), "todos-page");
        assert_eq!(derive_tag("BaseLayout", Role::Layout), "base-layout");
    }

    #[test]
    fn test_camel_case_boundaries() {
        assert_eq!(derive_tag("UserProfilePage", Role::Page), "user-profile-page");
        assert_eq!(derive_tag("ErrorIndexPage", Role::Page), "error-index-page");
        assert_eq!(derive_tag("myWidget", Role::Page), "my-widget-page");
    }

    #[test]
    fn test_without_suffix() {
        assert_eq!(derive_tag("About", Role::Page), "about-page");
        // Only the matching role suffix is stripped
        assert_eq!(derive_tag("AdminLayout", Role::Page), "admin-layout-page");
    }

    #[test]
    fn test_acronyms_get_no_separators() {
        assert_eq!(derive_tag("HTTPPage", Role::Page), "http-page");
        assert_eq!(derive_tag("APIDocsPage", Role::Page), "apidocs-page");
        assert_eq!(derive_tag("XMLLayout", Role::Layout), "xml-layout");
    }

    #[test]
    fn test_idempotent_on_own_output() {
        for (class, role) in [
            ("TodosPage", Role::Page),
            ("BaseLayout", Role::Layout),
            ("UserProfilePage", Role::Page),
            ("HTTPPage", Role::Page),
        ] {
            let once = derive_tag(class, role);
            assert_eq!(derive_tag(&once, role), once);
        }
    }

    #[test]
    fn test_doubled_suffix_collapses() {
        // Both classes claim one tag; the registry keeps whichever came first
        assert_eq!(derive_tag("HomePagePage", Role::Page), "home-page");
        assert_eq!(derive_tag("HomePagePage", Role::Page), derive_tag("HomePage", Role::Page));
        assert_eq!(derive_tag("MainLayoutLayout", Role::Layout), "main-layout");
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            derive_tag("SettingsPage", Role::Page),
            derive_tag("SettingsPage", Role::Page)
        );
    }
}
