//! CSS selector generation for observed elements.
//!
//! The content script describes an element by tag, attributes, and sibling
//! index; this produces the selector recorded with each interaction event.

use std::collections::HashMap;

use serde::Deserialize;

/// Element description as delivered by the interaction source.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ElementDescriptor {
    #[serde(rename = "tagName")]
    pub tag_name: String,
    pub attributes: HashMap<String, String>,
    /// 1-based position among siblings, for the nth-child fallback.
    pub index: Option<u32>,
}

/// Generate a CSS-like selector for an element.
///
/// Priority: `#id` when a non-empty id attribute exists, then
/// `tag.class1.class2…` from the class attribute, then
/// `tag:nth-child(n)` with a 1-based index defaulting to 1.
pub fn generate_selector(element: &ElementDescriptor) -> String {
    let tag = if element.tag_name.is_empty() {
        "div".to_string()
    } else {
        element.tag_name.to_lowercase()
    };

    if let Some(id) = element.attributes.get("id") {
        if !id.is_empty() {
            return format!("#{id}");
        }
    }

    if let Some(class_attr) = element.attributes.get("class") {
        let classes: Vec<&str> = class_attr.split_whitespace().collect();
        if !classes.is_empty() {
            return format!("{tag}.{}", classes.join("."));
        }
    }

    format!("{tag}:nth-child({})", element.index.unwrap_or(1))
}
