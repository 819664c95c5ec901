//! Owned attribute list of one element.

use quick_xml::events::BytesStart;

use tc_core::{TcError, TcResult};

/// Attributes in document order.  Lookups are linear; simulator elements
/// carry a few dozen attributes at most.
#[derive(Debug, Default)]
pub struct Attrs(Vec<(String, String)>);

impl Attrs {
    pub(crate) fn from_start(e: &BytesStart<'_>) -> TcResult<Self> {
        let mut out = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| malformed(format!("bad attribute: {err}")))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|err| malformed(format!("attribute name is not UTF-8: {err}")))?
                .to_owned();
            let value = attr
                .unescape_value()
                .map_err(|err| malformed(format!("attribute {key}: {err}")))?
                .into_owned();
            out.push((key, value));
        }
        Ok(Self(out))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// Missing → `""`.
    pub fn string(&self, name: &str) -> String {
        self.get(name).unwrap_or_default().to_owned()
    }

    /// Missing → `0.0`; present but unparsable → `MalformedDocument`.
    pub fn float(&self, name: &str) -> TcResult<f64> {
        self.number(name, 0.0)
    }

    /// Missing → `0`; present but unparsable → `MalformedDocument`.
    pub fn int(&self, name: &str) -> TcResult<i32> {
        self.number(name, 0)
    }

    fn number<T: std::str::FromStr>(&self, name: &str, default: T) -> TcResult<T> {
        match self.get(name) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| malformed(format!("attribute {name}={raw:?} is not a number"))),
        }
    }
}

pub(crate) fn malformed(msg: impl Into<String>) -> TcError {
    TcError::MalformedDocument(msg.into())
}
