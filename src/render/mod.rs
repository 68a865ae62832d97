//! HTML entry document rendering.
//!
//! `render` is a pure function of the project config. Missing or
//! wrongly-typed config paths simply contribute no markup.

use serde_json::{Map, Value};

use crate::config::{ProjectConfig, field};
use crate::core::ProjectPaths;
use crate::store::{FileStore, StoreError};
use crate::utils::html::escape;

/// Render the entry document for `.elm-land/server/index.html`.
pub fn render(config: &ProjectConfig) -> String {
    let html_attributes = attributes(config.object(field::HTML_ATTRIBUTES));
    let head_attributes = attributes(config.object(field::HEAD_ATTRIBUTES));
    let body_attributes = attributes(config.object(field::BODY_ATTRIBUTES));

    let mut tags = Vec::new();
    if let Some(title) = config.string(field::HTML_TITLE)
        && !title.is_empty()
    {
        tags.push(format!("<title>{}</title>", escape(title)));
    }
    tags.extend(self_closing_tags("meta", config.array(field::HTML_META)));
    tags.extend(self_closing_tags("link", config.array(field::HTML_LINK)));

    let head_tags = if tags.is_empty() {
        String::new()
    } else {
        format!("\n    {}\n  ", tags.join("\n    "))
    };

    format!(
        r#"<!DOCTYPE html>
  <html{html_attributes}>
  <head{head_attributes}>{head_tags}</head>
  <body{body_attributes}>
    <div id="app"></div>
    <script type="module" src="./main.js"></script>
  </body>
</html>"#
    )
}

/// Render and write the entry document. Returns whether the file changed.
pub async fn write_index<S: FileStore>(
    store: &S,
    paths: &ProjectPaths,
    config: &ProjectConfig,
) -> Result<bool, StoreError> {
    store.write_if_changed(&paths.index_html(), &render(config)).await
}

/// Attribute string with a leading space, or empty when nothing renders.
///
/// - `true`/`false` → bare attribute name
/// - string → `key="value"`
/// - anything else is omitted
fn attributes(map: Option<&Map<String, Value>>) -> String {
    let Some(map) = map else {
        return String::new();
    };

    let rendered: Vec<String> = map
        .iter()
        .filter_map(|(key, value)| match value {
            Value::Bool(_) => Some(escape(key).into_owned()),
            Value::String(s) => Some(format!(r#"{}="{}""#, escape(key), escape(s))),
            _ => None,
        })
        .collect();

    if rendered.is_empty() {
        String::new()
    } else {
        format!(" {}", rendered.join(" "))
    }
}

/// One `<tag ...>` per entry. Entries without renderable attributes are dropped.
fn self_closing_tags(tag: &str, entries: Option<&[Value]>) -> Vec<String> {
    entries
        .unwrap_or_default()
        .iter()
        .map(|entry| attributes(entry.as_object()))
        .filter(|attrs| !attrs.is_empty())
        .map(|attrs| format!("<{tag}{attrs}>"))
        .collect()
}
