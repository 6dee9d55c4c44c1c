//! Typed content elements.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{ModelError, NodeTag, PageRef};

/// Element type tag used for filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Section heading.
    Heading,
    /// Titled section grouping further elements.
    Section,
    /// Link to another page or element.
    Link,
    /// Diagram.
    Diagram,
    /// Attached file.
    File,
    /// Image.
    Image,
    /// Side note or callout.
    Note,
}

impl ElementKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Heading,
        Self::Section,
        Self::Link,
        Self::Diagram,
        Self::File,
        Self::Image,
        Self::Note,
    ];

    /// Lowercase name as used in documents and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::Section => "section",
            Self::Link => "link",
            Self::Diagram => "diagram",
            Self::File => "file",
            Self::Image => "image",
            Self::Note => "note",
        }
    }

    /// Node tag of elements of this kind.
    #[must_use]
    pub fn tag(self) -> NodeTag {
        match self {
            Self::Heading => NodeTag::Heading,
            Self::Section => NodeTag::Section,
            Self::Link => NodeTag::Link,
            Self::Diagram => NodeTag::Diagram,
            Self::File => NodeTag::File,
            Self::Image => NodeTag::Image,
            Self::Note => NodeTag::Note,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ElementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown element kind: {s}"))
    }
}

/// A typed content unit belonging to exactly one page.
///
/// The owning page is referenced by [`PageRef`] rather than owned, so an
/// element can be handed out on its own without keeping a page graph alive.
#[derive(Debug)]
pub struct Element {
    page_ref: PageRef,
    kind: ElementKind,
    id: Option<String>,
    label: String,
    hidden: bool,
    children: Vec<Arc<Element>>,
}

impl Element {
    /// Page this element belongs to.
    #[must_use]
    pub fn page_ref(&self) -> &PageRef {
        &self.page_ref
    }

    /// Element type tag.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Identifier, unique within the owning page.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the element is hidden from listings.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Directly nested elements, in document order.
    #[must_use]
    pub fn child_elements(&self) -> &[Arc<Element>] {
        &self.children
    }
}

/// Builder for [`Element`] trees.
///
/// Elements are only materialized through [`PageBuilder`](crate::PageBuilder),
/// which supplies the owning page and enforces id uniqueness.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementBuilder {
    kind: ElementKind,
    id: Option<String>,
    label: String,
    hidden: bool,
    children: Vec<ElementBuilder>,
}

impl ElementBuilder {
    /// Start an element of the given kind.
    #[must_use]
    pub fn new(kind: ElementKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            id: None,
            label: label.into(),
            hidden: false,
            children: Vec::new(),
        }
    }

    /// Set the element id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Mark the element hidden.
    #[must_use]
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Append a nested element.
    #[must_use]
    pub fn child(mut self, child: ElementBuilder) -> Self {
        self.children.push(child);
        self
    }

    /// Build the element and its descendants.
    ///
    /// Every built element is appended to `flat` in pre-order.
    pub(crate) fn build(
        self,
        page_ref: &PageRef,
        ids: &mut HashSet<String>,
        flat: &mut Vec<Arc<Element>>,
    ) -> Result<Arc<Element>, ModelError> {
        if let Some(id) = &self.id
            && !ids.insert(id.clone())
        {
            return Err(ModelError::DuplicateElementId {
                page_ref: page_ref.clone(),
                id: id.clone(),
            });
        }

        let mut descendants = Vec::new();
        let children = self
            .children
            .into_iter()
            .map(|child| child.build(page_ref, ids, &mut descendants))
            .collect::<Result<Vec<_>, _>>()?;

        let element = Arc::new(Element {
            page_ref: page_ref.clone(),
            kind: self.kind,
            id: self.id,
            label: self.label,
            hidden: self.hidden,
            children,
        });

        flat.push(Arc::clone(&element));
        flat.append(&mut descendants);
        Ok(element)
    }
}
