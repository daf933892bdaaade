//! Parsed model document
//!
//! The XML payload is held as an arena of elements with an index from local
//! tag name to element ids. Typed records (materials, objects) are extracted
//! from the arena once, at parse time, and exposed through [`materials_of`]
//! and [`objects_of`].

use std::collections::HashMap;

use super::core::Object;
use super::material::Material;

/// Position of an element in its [`ElementTree`]
pub type ElementId = usize;

/// A single XML element
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Qualified tag name as written (`m:colorgroup`)
    pub qualified_name: String,
    /// Attributes in document order, keys as written
    pub attributes: Vec<(String, String)>,
    /// Concatenated text content
    pub text: String,
    /// Parent element, `None` for the root
    pub parent: Option<ElementId>,
    /// Child elements in document order
    pub children: Vec<ElementId>,
}

impl Element {
    /// Tag name without namespace prefix
    pub fn local_name(&self) -> &str {
        local_name(&self.qualified_name)
    }

    /// Attribute value by local name, regardless of namespace prefix
    ///
    /// `p:UUID` and `UUID` both match `"UUID"`. The first match wins.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| local_name(key) == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Extract local name from potentially namespaced XML name
///
/// - `"m:colorgroup"` returns `"colorgroup"`
/// - `"object"` returns `"object"`
pub(crate) fn local_name(name: &str) -> &str {
    match name.rfind(':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Element arena with a tag-name index
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementTree {
    elements: Vec<Element>,
    index: HashMap<String, Vec<ElementId>>,
}

impl ElementTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element under `parent` and index it
    pub fn push(
        &mut self,
        parent: Option<ElementId>,
        qualified_name: impl Into<String>,
        attributes: Vec<(String, String)>,
    ) -> ElementId {
        let id = self.elements.len();
        let qualified_name = qualified_name.into();
        self.index
            .entry(local_name(&qualified_name).to_string())
            .or_default()
            .push(id);
        self.elements.push(Element {
            qualified_name,
            attributes,
            text: String::new(),
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent
            && let Some(parent) = self.elements.get_mut(parent)
        {
            parent.children.push(id);
        }
        id
    }

    /// Append text content to an element
    pub fn append_text(&mut self, id: ElementId, text: &str) {
        if let Some(element) = self.elements.get_mut(id) {
            element.text.push_str(text);
        }
    }

    /// The root element, if the document had one
    pub fn root(&self) -> Option<&Element> {
        self.elements.first()
    }

    /// Element by id
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the tree has no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements with the given local name, in document order
    pub fn elements_named<'a>(
        &'a self,
        name: &str,
    ) -> impl Iterator<Item = (ElementId, &'a Element)> + 'a {
        self.index
            .get(name)
            .map(|ids| ids.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&id| (id, &self.elements[id]))
    }

    /// Direct children of `id` with the given local name
    pub fn children_named<'a>(
        &'a self,
        id: ElementId,
        name: &'a str,
    ) -> impl Iterator<Item = (ElementId, &'a Element)> + 'a {
        self.elements
            .get(id)
            .map(|e| e.children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&child| (child, &self.elements[child]))
            .filter(move |(_, e)| e.local_name() == name)
    }

    /// Elements reached from `id` by following a path of child tag names
    ///
    /// `descend(object, &["mesh", "triangles", "triangle"])` yields every
    /// triangle of the object's mesh.
    pub fn descend<'a>(&'a self, id: ElementId, path: &[&'a str]) -> Vec<(ElementId, &'a Element)> {
        let mut current = vec![id];
        for &name in path {
            current = current
                .into_iter()
                .flat_map(|parent| self.children_named(parent, name).map(|(child, _)| child))
                .collect();
        }
        current
            .into_iter()
            .map(|id| (id, &self.elements[id]))
            .collect()
    }
}

/// A parsed 3MF model payload
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelDocument {
    /// The element arena the records were extracted from
    pub tree: ElementTree,
    /// Model unit from the root element
    pub unit: String,
    /// `metadata` entries by name
    pub metadata: HashMap<String, String>,
    /// Materials: base materials first, then color-group entries
    pub materials: Vec<Material>,
    /// Objects in document order
    pub objects: Vec<Object>,
}

impl ModelDocument {
    /// Total triangle count across all objects
    pub fn triangle_count(&self) -> usize {
        self.objects.iter().map(Object::triangle_count).sum()
    }
}

/// Materials of a document
pub fn materials_of(doc: &ModelDocument) -> &[Material] {
    &doc.materials
}

/// Objects of a document
pub fn objects_of(doc: &ModelDocument) -> &[Object] {
    &doc.objects
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sample_tree() -> ElementTree {
        let mut tree = ElementTree::new();
        let model = tree.push(None, "model", vec![]);
        let resources = tree.push(Some(model), "resources", vec![]);
        let group = tree.push(Some(resources), "m:colorgroup", attrs(&[("id", "2")]));
        tree.push(Some(group), "m:color", attrs(&[("color", "#FF0000")]));
        let object = tree.push(Some(resources), "object", attrs(&[("id", "1")]));
        let mesh = tree.push(Some(object), "mesh", vec![]);
        let triangles = tree.push(Some(mesh), "triangles", vec![]);
        tree.push(Some(triangles), "triangle", attrs(&[("v1", "0")]));
        tree.push(Some(triangles), "triangle", attrs(&[("v1", "1")]));
        tree
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("m:colorgroup"), "colorgroup");
        assert_eq!(local_name("object"), "object");
    }

    #[test]
    fn test_index_by_local_name() {
        let tree = sample_tree();
        assert_eq!(tree.elements_named("colorgroup").count(), 1);
        assert_eq!(tree.elements_named("triangle").count(), 2);
        assert_eq!(tree.elements_named("vertex").count(), 0);
        assert_eq!(tree.root().unwrap().local_name(), "model");
    }

    #[test]
    fn test_attr_ignores_prefix() {
        let mut tree = ElementTree::new();
        let id = tree.push(None, "triangle", attrs(&[("p:UUID", "abc"), ("v1", "3")]));
        let element = tree.get(id).unwrap();
        assert_eq!(element.attr("UUID"), Some("abc"));
        assert_eq!(element.attr("v1"), Some("3"));
        assert_eq!(element.attr("v2"), None);
    }

    #[test]
    fn test_descend_path() {
        let tree = sample_tree();
        let (object, _) = tree.elements_named("object").next().unwrap();
        let triangles = tree.descend(object, &["mesh", "triangles", "triangle"]);
        assert_eq!(triangles.len(), 2);
        assert_eq!(triangles[1].1.attr("v1"), Some("1"));
        assert!(tree.descend(object, &["mesh", "vertices", "vertex"]).is_empty());
    }
}
