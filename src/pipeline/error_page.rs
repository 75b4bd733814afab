//! Built-in error page and the redirect URL that targets it.
//!
//! Failed navigations land on `<error_route>?code=<n>&msg=<text>`. Register
//! [`error_page_class`] at that route to render it.

use crate::engine::{Component, ComponentClass, ElementContext};
use crate::error::MountError;

const DEFAULT_CODE: &str = "500";
const DEFAULT_MESSAGE: &str = "An unknown error occurred.";

/// URL of the error route for `code` and an optional message.
pub fn error_url(error_route: &str, code: u16, message: Option<&str>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("code", &code.to_string());
    if let Some(message) = message.filter(|m| !m.is_empty()) {
        query.append_pair("msg", message);
    }
    format!("{}?{}", error_route, query.finish())
}

/// Renders `Error <code>`, the message and a link home.
#[derive(Debug, Default)]
pub struct ErrorIndexPage;

impl Component for ErrorIndexPage {
    fn connected(&self, ctx: &ElementContext) -> Result<(), MountError> {
        let location = ctx.location();
        // Empty values fall back like missing ones
        let param = |name: &str, default: &str| {
            location
                .query(name)
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let code = param("code", DEFAULT_CODE);
        let message = param("msg", DEFAULT_MESSAGE);

        ctx.with_dom(|dom, host| {
            dom.clear_children(host)?;
            let section = dom.append_element(host, "section", &[], None)?;
            dom.append_element(section, "h1", &[], Some(format!("Error {code}").as_str()))?;
            dom.append_element(section, "p", &[], Some(message.as_str()))?;
            dom.append_element(section, "a", &[("href", "/")], Some("← Back to Home"))?;
            Ok::<_, MountError>(())
        })?
    }
}

/// Component class for [`ErrorIndexPage`].
pub fn error_page_class() -> ComponentClass {
    ComponentClass::new("ErrorIndexPage", || ErrorIndexPage)
}
