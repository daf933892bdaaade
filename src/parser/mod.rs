//! XML parsing for 3MF model payloads
//!
//! Parsing runs in two passes. The quick-xml event stream is first collected
//! into an [`ElementTree`] indexed by tag name; the typed extraction rules in
//! [`core`] and [`material`] then read from that index. Unknown elements and
//! attributes are kept in the tree and otherwise ignored.

pub mod core;
pub mod material;

use crate::error::{Error, Result};
use crate::model::{ElementId, ElementTree, ModelDocument};
use crate::{defaults, opc};
use quick_xml::Reader;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use std::borrow::Cow;
use std::collections::HashMap;

pub use self::core::{extract_objects, parse_triangle, parse_vertex};
pub use self::material::extract_materials;

/// Default buffer capacity for XML parsing (4KB)
const XML_BUFFER_CAPACITY: usize = 4096;

/// Open a 3MF byte buffer and parse its model payload
pub fn parse_3mf(bytes: &[u8]) -> Result<ModelDocument> {
    let entry = opc::open(bytes)?;
    parse_model_xml(entry.text()?)
}

/// Parse the 3D model XML content
///
/// # Errors
///
/// `InvalidXml` when the text is not well-formed, declares a DTD, has no root
/// element, or carries non-numeric vertex coordinates or indices.
pub fn parse_model_xml(xml: &str) -> Result<ModelDocument> {
    let tree = parse_element_tree(xml)?;

    let root = tree
        .root()
        .ok_or_else(|| Error::InvalidXml("Document has no root element".to_string()))?;
    let unit = root
        .attr("unit")
        .unwrap_or(defaults::DEFAULT_UNIT)
        .to_string();

    let metadata = extract_metadata(&tree);
    let materials = extract_materials(&tree);
    let objects = extract_objects(&tree)?;

    tracing::debug!(
        elements = tree.len(),
        materials = materials.len(),
        objects = objects.len(),
        "parsed model XML"
    );

    Ok(ModelDocument {
        tree,
        unit,
        metadata,
        materials,
        objects,
    })
}

/// Collect the XML event stream into an element arena
pub fn parse_element_tree(xml: &str) -> Result<ElementTree> {
    // DTD declarations can lead to XXE (XML External Entity) attacks
    let check_len = xml.char_indices().nth(2000).map_or(xml.len(), |(i, _)| i);
    if xml[..check_len].to_lowercase().contains("<!doctype") {
        return Err(Error::InvalidXml(
            "DTD declarations are not allowed in 3MF files".to_string(),
        ));
    }

    // Text is not trimmed per event: entity references split a text run into
    // several events, and whitespace next to them is content
    let mut reader = Reader::from_str(xml);

    let mut tree = ElementTree::new();
    let mut buf = Vec::with_capacity(XML_BUFFER_CAPACITY);
    let mut stack: Vec<ElementId> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let id = push_element(&mut tree, &stack, e)?;
                stack.push(id);
            }
            Ok(Event::Empty(ref e)) => {
                push_element(&mut tree, &stack, e)?;
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Text(ref t)) => {
                if let Some(&current) = stack.last() {
                    let text = t.decode().map_err(|e| Error::InvalidXml(e.to_string()))?;
                    tree.append_text(current, &text);
                }
            }
            Ok(Event::GeneralRef(ref r)) => {
                if let Some(&current) = stack.last() {
                    tree.append_text(current, &resolve_reference(r)?);
                }
            }
            Ok(Event::DocType(_)) => {
                return Err(Error::InvalidXml(
                    "DTD declarations are not allowed in 3MF files".to_string(),
                ));
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::from(e)),
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(Error::InvalidXml(
            "Document ended before all elements were closed".to_string(),
        ));
    }

    Ok(tree)
}

/// Resolve a character reference or one of the five predefined entities
fn resolve_reference(r: &BytesRef) -> Result<Cow<'static, str>> {
    if let Some(c) = r.resolve_char_ref()? {
        return Ok(Cow::Owned(c.to_string()));
    }
    let name = r.decode().map_err(|e| Error::InvalidXml(e.to_string()))?;
    resolve_xml_entity(&name)
        .map(Cow::Borrowed)
        .ok_or_else(|| Error::InvalidXml(format!("Unknown entity reference '&{};'", name)))
}

/// Add a start or empty-element tag to the tree under the current parent
fn push_element(tree: &mut ElementTree, stack: &[ElementId], e: &BytesStart) -> Result<ElementId> {
    let parent = stack.last().copied();
    if parent.is_none() && !tree.is_empty() {
        return Err(Error::InvalidXml(
            "Document has more than one root element".to_string(),
        ));
    }

    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(|e| Error::InvalidXml(e.to_string()))?
        .to_string();
    let attributes = parse_attributes(e)?;

    Ok(tree.push(parent, name, attributes))
}

/// Parse attributes from an XML element, in document order
pub(crate) fn parse_attributes(e: &BytesStart) -> Result<Vec<(String, String)>> {
    // Pre-allocate reasonable capacity to reduce allocations
    let mut attrs = Vec::with_capacity(8);

    for attr in e.attributes() {
        let attr = attr?;
        let key =
            std::str::from_utf8(attr.key.as_ref()).map_err(|e| Error::InvalidXml(e.to_string()))?;
        let value = attr.unescape_value()?;

        attrs.push((key.to_string(), value.into_owned()));
    }

    Ok(attrs)
}

/// `metadata` elements with a `name` attribute, keyed by name
///
/// A repeated name keeps the first value. Surrounding whitespace is trimmed.
pub fn extract_metadata(tree: &ElementTree) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    for (_, element) in tree.elements_named("metadata") {
        if let Some(name) = element.attr("name") {
            metadata
                .entry(name.to_string())
                .or_insert_with(|| element.text.trim().to_string());
        }
    }
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_minimal_model() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<model unit="inch" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02">
  <metadata name="Title">Benchy</metadata>
  <resources>
    <object id="1" type="model">
      <mesh>
        <vertices>
          <vertex x="0" y="0" z="0"/>
          <vertex x="1" y="0" z="0"/>
          <vertex x="0" y="1" z="0"/>
        </vertices>
        <triangles>
          <triangle v1="0" v2="1" v3="2"/>
        </triangles>
      </mesh>
    </object>
  </resources>
  <build><item objectid="1"/></build>
</model>"#;

        let doc = parse_model_xml(xml).unwrap();
        assert_eq!(doc.unit, "inch");
        assert_eq!(doc.metadata.get("Title"), Some(&"Benchy".to_string()));
        assert_eq!(doc.objects.len(), 1);
        assert_eq!(doc.triangle_count(), 1);
        assert!(doc.materials.is_empty());
    }

    #[test]
    fn test_entities_decoded_in_text_and_attributes() {
        let xml = r##"<model>
  <metadata name="Title">Nuts &amp; Bolts &#x263A;</metadata>
  <metadata name="Designer"> A&lt;B </metadata>
  <resources>
    <basematerial id="1" name="Red &amp; Blue" displaycolor="#FF0000"/>
    <object id="2">
      <mesh>
        <vertices>
          <vertex x="0" y="0" z="0"/>
          <vertex x="1" y="0" z="0"/>
          <vertex x="0" y="1" z="0"/>
        </vertices>
        <triangles>
          <triangle v1="0" v2="1" v3="2" paint_color="a&amp;b"/>
        </triangles>
      </mesh>
    </object>
  </resources>
</model>"##;

        let doc = parse_model_xml(xml).unwrap();
        assert_eq!(doc.metadata["Title"], "Nuts & Bolts \u{263A}");
        assert_eq!(doc.metadata["Designer"], "A<B");
        assert_eq!(doc.materials[0].name, "Red & Blue");
        assert_eq!(
            doc.objects[0].triangles()[0].paint_color.as_deref(),
            Some("a&b")
        );
    }

    #[test]
    fn test_unknown_entity_rejected() {
        let err = parse_model_xml("<model><metadata name=\"x\">&nbsp;</metadata></model>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidXml);
    }

    #[test]
    fn test_default_unit() {
        let doc = parse_model_xml("<model><resources/></model>").unwrap();
        assert_eq!(doc.unit, "millimeter");
        assert!(doc.objects.is_empty());
    }

    #[test]
    fn test_empty_document_has_no_root() {
        let err = parse_model_xml("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidXml);
        assert!(err.to_string().contains("no root element"));

        let err = parse_model_xml("<?xml version=\"1.0\"?>\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidXml);
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse_model_xml("<model><resources></model>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidXml);
    }

    #[test]
    fn test_unclosed_root() {
        let err = parse_model_xml("<model><resources/>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidXml);
    }

    #[test]
    fn test_dtd_rejected() {
        let xml = r#"<?xml version="1.0"?><!DOCTYPE model [<!ENTITY x "y">]><model/>"#;
        let err = parse_model_xml(xml).unwrap_err();
        assert!(err.to_string().contains("DTD"));
    }

    #[test]
    fn test_second_root_rejected() {
        let err = parse_model_xml("<model/><model/>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidXml);
    }

    #[test]
    fn test_unknown_elements_ignored() {
        let xml = r#"<model><vendor:settings xmlns:vendor="urn:x" foo="bar"><vendor:layer/></vendor:settings><resources/></model>"#;
        let doc = parse_model_xml(xml).unwrap();
        assert_eq!(doc.tree.elements_named("layer").count(), 1);
        assert!(doc.objects.is_empty());
    }
}
