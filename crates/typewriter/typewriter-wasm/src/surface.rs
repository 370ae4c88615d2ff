//! DOM elements as text surfaces.

use typewriter_core::TextSurface;
use wasm_bindgen::JsCast;
use web_sys::{Element, Node, Text};

/// An element plus the single text node the typewriter rewrites.
///
/// Elements carrying a `.cursor` child keep it: the text run lives right
/// before the cursor and is created empty when missing. Any other element
/// is flattened to one text run holding its current text content.
#[derive(Clone, Debug)]
pub struct DomSurface {
    element: Element,
    text: Option<Text>,
}

impl DomSurface {
    pub fn bind(element: Element) -> Self {
        let text = text_run(&element);
        Self { element, text }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }
}

fn text_run(element: &Element) -> Option<Text> {
    if let Ok(Some(cursor)) = element.query_selector(":scope > .cursor") {
        if let Some(prev) = cursor.previous_sibling() {
            if let Ok(text) = prev.dyn_into::<Text>() {
                return Some(text);
            }
        }
        let text = element.owner_document()?.create_text_node("");
        let before: &Node = &cursor;
        element.insert_before(&text, Some(before)).ok()?;
        return Some(text);
    }

    if !element.has_child_nodes() {
        return None;
    }
    let content = element.text_content().unwrap_or_default();
    if content.is_empty() {
        return None;
    }
    element.set_text_content(Some(&content));
    element.first_child()?.dyn_into::<Text>().ok()
}

impl TextSurface for DomSurface {
    fn read_text(&self) -> Option<String> {
        self.text.as_ref().map(|t| t.data())
    }

    fn write_text(&mut self, text: &str) {
        if let Some(node) = &self.text {
            node.set_data(text);
        }
    }

    fn is_attached(&self) -> bool {
        self.element.is_connected()
    }
}
