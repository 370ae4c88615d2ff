//! The host seam: a text region a typewriter may rewrite.

use std::cell::RefCell;
use std::rc::Rc;

/// A display node owning one mutable run of text.
///
/// Hosts implement this for whatever they render into (a DOM text node, a
/// terminal cell range). Exactly one typewriter owns a surface at a time.
pub trait TextSurface {
    /// Current text, or `None` when there is no text-bearing node to mutate.
    fn read_text(&self) -> Option<String>;

    /// Replace the whole visible text.
    fn write_text(&mut self, text: &str);

    /// Whether the node is still part of the page. Ticks that find a detached
    /// surface end the animation quietly.
    fn is_attached(&self) -> bool {
        true
    }
}

#[derive(Debug, Default)]
struct MemoryNode {
    text: Option<String>,
    attached: bool,
    writes: Vec<String>,
}

/// In-memory surface for headless hosts and tests.
///
/// Clones share one node, so a caller can keep a handle after moving a clone
/// into a [`crate::Stage`].
#[derive(Clone, Debug)]
pub struct MemorySurface {
    node: Rc<RefCell<MemoryNode>>,
}

impl MemorySurface {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            node: Rc::new(RefCell::new(MemoryNode {
                text: Some(text.into()),
                attached: true,
                writes: Vec::new(),
            })),
        }
    }

    /// A node with no text child, e.g. an empty element.
    pub fn without_text_node() -> Self {
        Self {
            node: Rc::new(RefCell::new(MemoryNode {
                text: None,
                attached: true,
                writes: Vec::new(),
            })),
        }
    }

    /// Simulate the node being removed from the page.
    pub fn detach(&self) {
        self.node.borrow_mut().attached = false;
    }

    pub fn text(&self) -> String {
        self.node.borrow().text.clone().unwrap_or_default()
    }

    /// Every text written so far, oldest first.
    pub fn writes(&self) -> Vec<String> {
        self.node.borrow().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.node.borrow_mut().writes.clear();
    }
}

impl TextSurface for MemorySurface {
    fn read_text(&self) -> Option<String> {
        self.node.borrow().text.clone()
    }

    fn write_text(&mut self, text: &str) {
        let mut node = self.node.borrow_mut();
        node.text = Some(text.to_string());
        node.writes.push(text.to_string());
    }

    fn is_attached(&self) -> bool {
        self.node.borrow().attached
    }
}
