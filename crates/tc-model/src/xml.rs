//! Simulation-control document fragments.
//!
//! An [`XmlElement`] is a small owned tree: a tag, an ordered attribute
//! list, and child elements.  Attributes come in two tiers, mirroring the
//! simulator's schemas: mandatory attributes are always written; optional
//! ones are written only when they hold a value.  An absent field is never
//! emitted as an empty string.
//!
//! Serialization goes through `quick_xml::Writer`, which escapes attribute
//! values.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use tracing::debug;

use tc_core::{TcError, TcResult};

use crate::vocab::{schema, tag};

/// Format a float the way the simulator tools print them: integral values
/// keep one decimal (`28500.0`), others use the shortest round-trip form.
pub fn format_float(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}

fn write_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> TcError {
    TcError::Io(std::io::Error::other(e))
}

// ── XmlElement ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct XmlElement {
    tag:      &'static str,
    attrs:    Vec<(&'static str, String)>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(tag: &'static str) -> Self {
        Self { tag, attrs: Vec::new(), children: Vec::new() }
    }

    /// Build an element from its mandatory attributes followed by the
    /// optional ones that are `Some`.
    pub fn with_attrs(
        tag:       &'static str,
        mandatory: impl IntoIterator<Item = (&'static str, String)>,
        optional:  impl IntoIterator<Item = (&'static str, Option<String>)>,
    ) -> Self {
        let mut attrs: Vec<_> = mandatory.into_iter().collect();
        attrs.extend(optional.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))));
        Self { tag, attrs, children: Vec::new() }
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn attrs(&self) -> &[(&'static str, String)] {
        &self.attrs
    }

    /// Value of attribute `name`, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str())
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = XmlElement>) -> Self {
        self.children.extend(children);
        self
    }

    /// Write this element and its subtree.  Childless elements are written
    /// in self-closing form.
    pub fn write<W: Write>(&self, writer: &mut Writer<W>) -> TcResult<()> {
        let mut start = BytesStart::new(self.tag);
        for (k, v) in &self.attrs {
            start.push_attribute((*k, v.as_str()));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start)).map_err(write_err)?;
            return Ok(());
        }

        writer.write_event(Event::Start(start)).map_err(write_err)?;
        for child in &self.children {
            child.write(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.tag))).map_err(write_err)?;
        Ok(())
    }

    /// Compact single-line serialization, mostly for logs and tests.
    pub fn to_xml_string(&self) -> TcResult<String> {
        let mut writer = Writer::new(Vec::new());
        self.write(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(write_err)
    }
}

// ── AdditionalDocument ────────────────────────────────────────────────────────

/// The `<additional>` file loaded by the simulator next to the network:
/// calibrators, detectors, and anything else expressed as fragments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdditionalDocument {
    elements: Vec<XmlElement>,
}

impl AdditionalDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, element: XmlElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn extend(mut self, elements: impl IntoIterator<Item = XmlElement>) -> Self {
        self.elements.extend(elements);
        self
    }

    pub fn elements(&self) -> &[XmlElement] {
        &self.elements
    }

    pub fn root(&self) -> XmlElement {
        XmlElement::with_attrs(
            tag::ADDITIONAL,
            [
                ("xmlns:xsi", schema::XMLNS_XSI.to_owned()),
                ("xsi:noNamespaceSchemaLocation", schema::ADDITIONAL_XSD.to_owned()),
            ],
            [],
        )
        .with_children(self.elements.iter().cloned())
    }

    /// Write the document with an XML declaration and two-space indentation.
    pub fn write_to<W: Write>(&self, out: W) -> TcResult<()> {
        let mut writer = Writer::new_with_indent(out, b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_err)?;
        self.root().write(&mut writer)?;
        writer.into_inner().flush()?;
        Ok(())
    }

    pub fn write_file(&self, path: &Path) -> TcResult<()> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))?;
        debug!(path = %path.display(), elements = self.elements.len(), "additional file written");
        Ok(())
    }
}
