//! Nodes: the common view over pages and elements.
//!
//! Tree renderers walk pages and elements uniformly through [`Node`]. Nodes
//! are compared by reference identity ([`NodeKey`]), not by value: the same
//! page captured twice yields two different nodes.

use std::sync::Arc;

use crate::{Element, Page, PageRef};

/// Fixed type tag of a node.
///
/// Tags form a static hierarchy (`diagram → element → node`,
/// `page → node`) used wherever behavior is registered per node type and
/// should fall back to a more general registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeTag {
    /// Any node.
    Node,
    /// A page.
    Page,
    /// Any element.
    Element,
    /// Heading element.
    Heading,
    /// Section element.
    Section,
    /// Link element.
    Link,
    /// Diagram element.
    Diagram,
    /// File element.
    File,
    /// Image element.
    Image,
    /// Note element.
    Note,
}

impl NodeTag {
    /// The more general tag, or `None` for [`NodeTag::Node`].
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::Node => None,
            Self::Page | Self::Element => Some(Self::Node),
            Self::Heading
            | Self::Section
            | Self::Link
            | Self::Diagram
            | Self::File
            | Self::Image
            | Self::Note => Some(Self::Element),
        }
    }

    /// This tag followed by its ancestors, most specific first.
    pub fn lineage(self) -> impl Iterator<Item = Self> {
        std::iter::successors(Some(self), |tag| tag.parent())
    }

    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Page => "page",
            Self::Element => "element",
            Self::Heading => "heading",
            Self::Section => "section",
            Self::Link => "link",
            Self::Diagram => "diagram",
            Self::File => "file",
            Self::Image => "image",
            Self::Note => "note",
        }
    }
}

/// Reference identity of a [`Node`].
///
/// Only meaningful while the node is alive; holders of keys must keep the
/// corresponding nodes alive as well.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey(usize);

/// A page or an element.
#[derive(Clone, Debug)]
pub enum Node {
    /// A captured page.
    Page(Arc<Page>),
    /// An element of a captured page.
    Element(Arc<Element>),
}

impl Node {
    /// Reference identity of this node.
    #[must_use]
    pub fn key(&self) -> NodeKey {
        let ptr = match self {
            Self::Page(page) => Arc::as_ptr(page).cast::<()>(),
            Self::Element(element) => Arc::as_ptr(element).cast::<()>(),
        };
        NodeKey(ptr as usize)
    }

    /// Whether both nodes are the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }

    /// Fixed type tag.
    #[must_use]
    pub fn tag(&self) -> NodeTag {
        match self {
            Self::Page(_) => NodeTag::Page,
            Self::Element(element) => element.kind().tag(),
        }
    }

    /// Directly contained elements.
    #[must_use]
    pub fn child_elements(&self) -> &[Arc<Element>] {
        match self {
            Self::Page(page) => page.child_elements(),
            Self::Element(element) => element.child_elements(),
        }
    }

    /// Element id; pages have none.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Page(_) => None,
            Self::Element(element) => element.id(),
        }
    }

    /// Page to link to when linking to this node.
    #[must_use]
    pub fn page_ref(&self) -> &PageRef {
        match self {
            Self::Page(page) => page.page_ref(),
            Self::Element(element) => element.page_ref(),
        }
    }

    /// Display label: page title or element label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Page(page) => page.title(),
            Self::Element(element) => element.label(),
        }
    }

    /// The page, if this is a page node.
    #[must_use]
    pub fn as_page(&self) -> Option<&Arc<Page>> {
        match self {
            Self::Page(page) => Some(page),
            Self::Element(_) => None,
        }
    }

    /// The element, if this is an element node.
    #[must_use]
    pub fn as_element(&self) -> Option<&Arc<Element>> {
        match self {
            Self::Page(_) => None,
            Self::Element(element) => Some(element),
        }
    }
}

impl From<Arc<Page>> for Node {
    fn from(page: Arc<Page>) -> Self {
        Self::Page(page)
    }
}

impl From<Arc<Element>> for Node {
    fn from(element: Arc<Element>) -> Self {
        Self::Element(element)
    }
}
