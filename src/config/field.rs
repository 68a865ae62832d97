//! Dotted config field paths.

use serde_json::Value;

/// A dotted path into the project config, e.g. `app.html.title`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    /// Walk `root` along this path. Any missing key or non-object
    /// intermediate resolves to `None`.
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.0
            .split('.')
            .try_fold(root, |value, key| value.as_object()?.get(key))
    }
}

pub const APP_ENV: FieldPath = FieldPath::new("app.env");
pub const HTML_TITLE: FieldPath = FieldPath::new("app.html.title");
pub const HTML_META: FieldPath = FieldPath::new("app.html.meta");
pub const HTML_LINK: FieldPath = FieldPath::new("app.html.link");
pub const HTML_ATTRIBUTES: FieldPath = FieldPath::new("app.html.attributes.html");
pub const HEAD_ATTRIBUTES: FieldPath = FieldPath::new("app.html.attributes.head");
pub const BODY_ATTRIBUTES: FieldPath = FieldPath::new("app.html.attributes.body");
pub const DEVELOPMENT_DEBUGGER: FieldPath = FieldPath::new("app.elm.development.debugger");
pub const PRODUCTION_DEBUGGER: FieldPath = FieldPath::new("app.elm.production.debugger");
