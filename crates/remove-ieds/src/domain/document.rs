//! In-memory SCL document and addressing of its elements.
//!
//! The document is a plain element tree. Elements are addressed by a
//! [`NodePath`], the chain of child indices from the root, which stays valid
//! until the tree is mutated. Edits therefore carry paths computed against the
//! document they are applied to.

use std::fmt;

use xmltree::{Element, EmitterConfig, XMLNode};

use crate::domain::edit::{Edit, EditEvent};
use crate::domain::errors::DomainError;

const ROOT_ELEMENT: &str = "SCL";

/// Child-index path from the document root to an element.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// Path of the root element.
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of the `index`-th child node below this path.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `self` is `ancestor` or lies below it.
    pub fn is_within(&self, ancestor: &NodePath) -> bool {
        self.0.starts_with(&ancestor.0)
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

/// Read an attribute value from an element.
pub fn attribute<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element.attributes.get(name).map(String::as_str)
}

/// A parsed SCL file.
#[derive(Debug, Clone, PartialEq)]
pub struct SclDocument {
    root: Element,
}

impl SclDocument {
    /// Parse an SCL document from its XML text.
    ///
    /// Whitespace-only text nodes are dropped; the writer re-indents the tree.
    pub fn parse(xml: &str) -> Result<Self, DomainError> {
        let root =
            Element::parse(xml.as_bytes()).map_err(|err| DomainError::Parse(err.to_string()))?;
        Self::from_root(root)
    }

    /// Wrap an already parsed element tree.
    pub fn from_root(mut root: Element) -> Result<Self, DomainError> {
        if root.name != ROOT_ELEMENT {
            return Err(DomainError::NotScl(root.name));
        }
        strip_whitespace(&mut root);
        Ok(Self { root })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Resolve a path to an element.
    pub fn get(&self, path: &NodePath) -> Option<&Element> {
        path.indices()
            .iter()
            .try_fold(&self.root, |element, index| match element.children.get(*index) {
                Some(XMLNode::Element(child)) => Some(child),
                _ => None,
            })
    }

    fn get_mut(&mut self, path: &NodePath) -> Option<&mut Element> {
        let mut element = &mut self.root;
        for index in path.indices() {
            element = match element.children.get_mut(*index) {
                Some(XMLNode::Element(child)) => child,
                _ => return None,
            };
        }
        Some(element)
    }

    /// All elements in document order (pre-order), root included.
    pub fn elements(&self) -> Vec<(NodePath, &Element)> {
        let mut found = Vec::new();
        collect(&self.root, NodePath::root(), &mut found);
        found
    }

    /// Elements with the given local name, in document order.
    pub fn descendants_named(&self, name: &str) -> Vec<(NodePath, &Element)> {
        self.elements()
            .into_iter()
            .filter(|(_, element)| element.name == name)
            .collect()
    }

    /// Every `IED` element of the document, in document order.
    pub fn ieds(&self) -> Vec<(NodePath, &Element)> {
        self.descendants_named("IED")
    }

    /// The `IED` named `name` that has `occurrence` same-named IEDs before it.
    ///
    /// An IED without a `name` attribute counts as named `""`.
    pub fn nth_ied(&self, name: &str, occurrence: usize) -> Option<(NodePath, &Element)> {
        self.ieds()
            .into_iter()
            .filter(|(_, ied)| attribute(ied, "name").unwrap_or_default() == name)
            .nth(occurrence)
    }

    /// The first `IED` whose `name` attribute equals `name`.
    pub fn find_ied(&self, name: &str) -> Option<(NodePath, &Element)> {
        self.ieds()
            .into_iter()
            .find(|(_, ied)| attribute(ied, "name") == Some(name))
    }

    /// Apply a compound edit.
    ///
    /// Every edit is checked against the current tree before anything changes, so an event either
    /// applies completely or not at all. Updates run first, then removals from the last path to the
    /// first so earlier sibling indices are unaffected. Returns the number of edits applied.
    pub fn apply(&mut self, event: &EditEvent) -> Result<usize, DomainError> {
        for edit in &event.edits {
            self.check(edit)?;
        }

        let mut removals = Vec::new();
        for edit in &event.edits {
            match edit {
                Edit::Update {
                    path,
                    attribute,
                    value,
                    ..
                } => {
                    let element = self
                        .get_mut(path)
                        .ok_or_else(|| DomainError::StalePath(path.clone()))?;
                    match value {
                        Some(value) => {
                            element.attributes.insert(attribute.clone(), value.clone());
                        }
                        None => {
                            element.attributes.shift_remove(attribute.as_str());
                        }
                    }
                }
                Edit::Remove { path, .. } => removals.push(path.clone()),
            }
        }

        removals.sort();
        removals.dedup();
        for path in removals.iter().rev() {
            self.remove_at(path)?;
        }

        Ok(event.edits.len())
    }

    /// Serialize the document with an XML declaration, indenting with `indent`.
    pub fn to_xml_string(&self, indent: &str) -> Result<String, DomainError> {
        let config = EmitterConfig::new()
            .perform_indent(true)
            .indent_string(indent.to_owned())
            .write_document_declaration(true);
        let mut buffer = Vec::new();
        self.root
            .write_with_config(&mut buffer, config)
            .map_err(|err| DomainError::Serialize(err.to_string()))?;
        String::from_utf8(buffer).map_err(|err| DomainError::Serialize(err.to_string()))
    }

    fn check(&self, edit: &Edit) -> Result<(), DomainError> {
        let path = edit.path();
        if path.is_root() && matches!(edit, Edit::Remove { .. }) {
            return Err(DomainError::RootRemoval);
        }
        let element = self
            .get(path)
            .ok_or_else(|| DomainError::StalePath(path.clone()))?;
        if element.name != edit.element() {
            return Err(DomainError::ElementMismatch {
                path: path.clone(),
                expected: edit.element().to_owned(),
                found: element.name.clone(),
            });
        }
        Ok(())
    }

    fn remove_at(&mut self, path: &NodePath) -> Result<Element, DomainError> {
        let stale = || DomainError::StalePath(path.clone());
        let (last, parent) = path.indices().split_last().ok_or(DomainError::RootRemoval)?;
        let parent = self
            .get_mut(&NodePath::from(parent.to_vec()))
            .ok_or_else(stale)?;
        if !matches!(parent.children.get(*last), Some(XMLNode::Element(_))) {
            return Err(stale());
        }
        match parent.children.remove(*last) {
            XMLNode::Element(element) => Ok(element),
            _ => Err(stale()),
        }
    }
}

fn collect<'a>(element: &'a Element, path: NodePath, found: &mut Vec<(NodePath, &'a Element)>) {
    found.push((path.clone(), element));
    for (index, node) in element.children.iter().enumerate() {
        if let XMLNode::Element(child) = node {
            collect(child, path.child(index), found);
        }
    }
}

fn strip_whitespace(element: &mut Element) {
    element
        .children
        .retain(|node| !matches!(node, XMLNode::Text(text) if text.trim().is_empty()));
    for node in &mut element.children {
        if let XMLNode::Element(child) = node {
            strip_whitespace(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<SCL xmlns="http://www.iec.ch/61850/2003/SCL" version="2007" revision="B">
  <Header id="sample"/>
  <IED name="IED1" manufacturer="ABB"/>
  <IED name="IED2" type="RTU">
    <AccessPoint name="AP1"/>
  </IED>
</SCL>
"#;

    #[test]
    fn parses_and_lists_ieds_in_document_order() {
        let doc = SclDocument::parse(SAMPLE).unwrap();
        let names: Vec<_> = doc
            .ieds()
            .into_iter()
            .filter_map(|(_, ied)| attribute(ied, "name"))
            .collect();
        assert_eq!(names, ["IED1", "IED2"]);
    }

    #[test]
    fn nth_ied_separates_duplicates_and_unnamed() {
        let doc = SclDocument::parse(
            r#"<SCL><IED name="X" type="a"/><IED type="b"/><IED name="X" type="c"/></SCL>"#,
        )
        .unwrap();
        let kind = |found: Option<(NodePath, &Element)>| {
            found.and_then(|(_, ied)| attribute(ied, "type").map(str::to_owned))
        };
        assert_eq!(kind(doc.nth_ied("X", 0)).as_deref(), Some("a"));
        assert_eq!(kind(doc.nth_ied("X", 1)).as_deref(), Some("c"));
        assert_eq!(kind(doc.nth_ied("", 0)).as_deref(), Some("b"));
        assert!(doc.nth_ied("X", 2).is_none());
    }

    #[test]
    fn drops_whitespace_text_nodes() {
        let doc = SclDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.root().children.len(), 3);
        let (path, _) = doc.find_ied("IED2").unwrap();
        assert_eq!(path, NodePath::from(vec![2]));
    }

    #[test]
    fn rejects_non_scl_root() {
        let err = SclDocument::parse("<Other/>").unwrap_err();
        assert!(matches!(err, DomainError::NotScl(name) if name == "Other"));
    }

    #[test]
    fn rejects_malformed_xml() {
        assert!(matches!(
            SclDocument::parse("<SCL><IED></SCL>"),
            Err(DomainError::Parse(_))
        ));
    }

    #[test]
    fn applies_removals_without_shifting_earlier_paths() {
        let mut doc = SclDocument::parse(SAMPLE).unwrap();
        let event = EditEvent::new(
            "remove both",
            vec![
                Edit::remove(NodePath::from(vec![1]), "IED"),
                Edit::remove(NodePath::from(vec![2, 0]), "AccessPoint"),
                Edit::remove(NodePath::from(vec![2]), "IED"),
            ],
        );

        assert_eq!(doc.apply(&event).unwrap(), 3);
        assert!(doc.ieds().is_empty());
        assert_eq!(doc.root().children.len(), 1);
    }

    #[test]
    fn updates_and_removes_attributes() {
        let mut doc = SclDocument::parse(SAMPLE).unwrap();
        let path = NodePath::from(vec![1]);
        let event = EditEvent::new(
            "retag",
            vec![
                Edit::update(path.clone(), "IED", "desc", Some("bay 1".into())),
                Edit::update(path.clone(), "IED", "manufacturer", None),
            ],
        );
        doc.apply(&event).unwrap();

        let ied = doc.get(&path).unwrap();
        assert_eq!(attribute(ied, "desc"), Some("bay 1"));
        assert_eq!(attribute(ied, "manufacturer"), None);
    }

    #[test]
    fn stale_edits_leave_the_document_untouched() {
        let mut doc = SclDocument::parse(SAMPLE).unwrap();
        let before = doc.clone();
        let event = EditEvent::new(
            "partly stale",
            vec![
                Edit::remove(NodePath::from(vec![1]), "IED"),
                Edit::remove(NodePath::from(vec![7]), "IED"),
            ],
        );

        assert!(matches!(doc.apply(&event), Err(DomainError::StalePath(_))));
        assert_eq!(doc, before);
    }

    #[test]
    fn mismatched_element_is_rejected() {
        let mut doc = SclDocument::parse(SAMPLE).unwrap();
        let event = EditEvent::new(
            "wrong tag",
            vec![Edit::remove(NodePath::from(vec![0]), "IED")],
        );
        assert!(matches!(
            doc.apply(&event),
            Err(DomainError::ElementMismatch { .. })
        ));
    }

    #[test]
    fn root_cannot_be_removed() {
        let mut doc = SclDocument::parse(SAMPLE).unwrap();
        let event = EditEvent::new("root", vec![Edit::remove(NodePath::root(), "SCL")]);
        assert!(matches!(doc.apply(&event), Err(DomainError::RootRemoval)));
    }

    #[test]
    fn serializes_back_to_parseable_xml() {
        let doc = SclDocument::parse(SAMPLE).unwrap();
        let xml = doc.to_xml_string("  ").unwrap();
        assert!(xml.starts_with("<?xml"));
        let reparsed = SclDocument::parse(&xml).unwrap();
        assert_eq!(reparsed.root().children.len(), 3);
        let (_, ied) = reparsed.find_ied("IED2").unwrap();
        assert_eq!(attribute(ied, "type"), Some("RTU"));
        assert_eq!(reparsed.descendants_named("AccessPoint").len(), 1);
    }

    #[test]
    fn node_path_display_and_nesting() {
        let path = NodePath::from(vec![3, 1]);
        assert_eq!(path.to_string(), "/3/1");
        assert_eq!(NodePath::root().to_string(), "/");
        assert!(path.child(2).is_within(&path));
        assert!(!NodePath::from(vec![4]).is_within(&path));
    }
}
