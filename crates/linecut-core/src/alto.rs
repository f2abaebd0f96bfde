//! ALTO-XML layout parsing.
//!
//! Reads one ALTO document and yields its `TextLine` geometry and text in
//! document order. ALTO files in the wild carry different schema versions
//! under different namespace URIs, so the namespace is discovered from the
//! document's root element rather than hard-coded, and every element lookup
//! is qualified against it.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AltoError, Result};

/// One text line's bounding box and transcription.
///
/// Coordinates are source-image pixels with the origin at the top left:
/// `hpos`/`vpos` give the top-left corner of the box, `width`/`height` its
/// extents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    pub hpos: u32,
    pub vpos: u32,
    pub width: u32,
    pub height: u32,
    /// Space-joined `CONTENT` of the line's direct `String` children, in
    /// document order. Empty when the line has no `String` children.
    pub text: String,
}

/// Streaming reader over one ALTO document.
///
/// Constructed per document; [`AltoReader::lines`] consumes it and yields
/// the document's lines exactly once.
pub struct AltoReader<R: BufRead> {
    reader: NsReader<R>,
    namespace: String,
    buf: Vec<u8>,
}

impl AltoReader<BufReader<File>> {
    /// Open an ALTO document from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader = Self::from_reader(BufReader::new(file))?;
        debug!(
            "Opened {} (namespace {})",
            path.display(),
            reader.namespace()
        );
        Ok(reader)
    }
}

impl<R: BufRead> AltoReader<R> {
    /// Read the document prologue and capture the root element's namespace.
    ///
    /// Fails with [`AltoError::MissingNamespace`] when the root element has
    /// no bound namespace.
    pub fn from_reader(reader: R) -> std::result::Result<Self, AltoError> {
        let mut reader = NsReader::from_reader(reader);
        let mut buf = Vec::new();

        let namespace = loop {
            buf.clear();
            match reader.read_resolved_event_into(&mut buf)? {
                (ResolveResult::Bound(Namespace(ns)), Event::Start(_) | Event::Empty(_)) => {
                    break String::from_utf8_lossy(ns).into_owned();
                }
                (_, Event::Start(_) | Event::Empty(_)) => {
                    return Err(AltoError::MissingNamespace);
                }
                (_, Event::Eof) => return Err(AltoError::MissingNamespace),
                _ => {}
            }
        };

        Ok(Self {
            reader,
            namespace,
            buf,
        })
    }

    /// Namespace URI discovered from the root element.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Consume the reader, yielding [`LineRecord`]s in document order.
    ///
    /// The sequence is lazy and single-pass; replaying it requires
    /// reopening the document.
    pub fn lines(self) -> Lines<R> {
        Lines {
            reader: self.reader,
            namespace: self.namespace,
            buf: self.buf,
        }
    }
}

/// Iterator over the `TextLine` records of one ALTO document.
///
/// `TextLine` elements are matched at any nesting depth. The first parse
/// error ends the sequence.
pub struct Lines<R: BufRead> {
    reader: NsReader<R>,
    namespace: String,
    buf: Vec<u8>,
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = std::result::Result<LineRecord, AltoError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            let found = match self.reader.read_resolved_event_into(&mut self.buf) {
                Ok((ns, Event::Start(e)))
                    if is_element(&ns, &e, &self.namespace, b"TextLine") =>
                {
                    Some((parse_geometry(&e), false))
                }
                Ok((ns, Event::Empty(e)))
                    if is_element(&ns, &e, &self.namespace, b"TextLine") =>
                {
                    Some((parse_geometry(&e), true))
                }
                Ok((_, Event::Eof)) => return None,
                Ok(_) => None,
                Err(e) => return Some(Err(e.into())),
            };

            let (geometry, self_closing) = match found {
                Some(found) => found,
                None => continue,
            };

            let (hpos, vpos, width, height) = match geometry {
                Ok(geometry) => geometry,
                Err(e) => return Some(Err(e)),
            };

            // A self-closing TextLine has no String children.
            let text = if self_closing {
                String::new()
            } else {
                match self.collect_text() {
                    Ok(text) => text,
                    Err(e) => return Some(Err(e)),
                }
            };

            return Some(Ok(LineRecord {
                hpos,
                vpos,
                width,
                height,
                text,
            }));
        }
    }
}

impl<R: BufRead> Lines<R> {
    /// Collect the space-joined `CONTENT` of the line's direct `String`
    /// children, reading up to the closing `TextLine` tag.
    fn collect_text(&mut self) -> std::result::Result<String, AltoError> {
        let mut parts: Vec<String> = Vec::new();
        let mut depth = 0usize;

        loop {
            self.buf.clear();
            match self.reader.read_resolved_event_into(&mut self.buf)? {
                (ns, Event::Start(e)) => {
                    if depth == 0 && is_element(&ns, &e, &self.namespace, b"String") {
                        if let Some(content) = string_content(&e)? {
                            parts.push(content);
                        }
                    }
                    depth += 1;
                }
                (ns, Event::Empty(e)) => {
                    if depth == 0 && is_element(&ns, &e, &self.namespace, b"String") {
                        if let Some(content) = string_content(&e)? {
                            parts.push(content);
                        }
                    }
                }
                (_, Event::End(_)) => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                (_, Event::Eof) => return Err(AltoError::UnexpectedEof),
                _ => {}
            }
        }

        Ok(parts.join(" "))
    }
}

/// Check that an element has the given local name and lives in the
/// document's namespace.
fn is_element(
    resolved: &ResolveResult,
    e: &BytesStart,
    namespace: &str,
    name: &[u8],
) -> bool {
    e.local_name().as_ref() == name
        && matches!(resolved, ResolveResult::Bound(Namespace(ns)) if *ns == namespace.as_bytes())
}

/// Parse the four required geometry attributes of a `TextLine`.
fn parse_geometry(e: &BytesStart) -> std::result::Result<(u32, u32, u32, u32), AltoError> {
    Ok((
        required_attr(e, "HPOS")?,
        required_attr(e, "VPOS")?,
        required_attr(e, "WIDTH")?,
        required_attr(e, "HEIGHT")?,
    ))
}

fn required_attr(e: &BytesStart, name: &'static str) -> std::result::Result<u32, AltoError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = attr.unescape_value()?;
            return value.parse::<u32>().map_err(|_| AltoError::InvalidAttribute {
                name,
                value: value.into_owned(),
            });
        }
    }
    Err(AltoError::MissingAttribute(name))
}

/// `CONTENT` of one `String` token. Absent or empty values contribute
/// nothing to the joined line text.
fn string_content(e: &BytesStart) -> std::result::Result<Option<String>, AltoError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"CONTENT" {
            let value = attr.unescape_value()?;
            if value.is_empty() {
                return Ok(None);
            }
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ALTO_NS: &str = "http://www.loc.gov/standards/alto/ns-v4#";

    fn read_lines(xml: &str) -> Vec<std::result::Result<LineRecord, AltoError>> {
        AltoReader::from_reader(xml.as_bytes())
            .unwrap()
            .lines()
            .collect()
    }

    fn sample_document() -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<alto xmlns="{ALTO_NS}">
  <Layout>
    <Page>
      <PrintSpace>
        <TextBlock>
          <TextLine HPOS="10" VPOS="20" WIDTH="100" HEIGHT="30">
            <String CONTENT="Hello"/>
            <SP/>
            <String CONTENT="World"/>
          </TextLine>
          <TextLine HPOS="12" VPOS="60" WIDTH="80" HEIGHT="28"/>
        </TextBlock>
      </PrintSpace>
    </Page>
  </Layout>
</alto>"#
        )
    }

    #[test]
    fn test_namespace_discovered_from_root() {
        let doc = sample_document();
        let reader = AltoReader::from_reader(doc.as_bytes()).unwrap();
        assert_eq!(reader.namespace(), ALTO_NS);
    }

    #[test]
    fn test_yields_lines_in_document_order() {
        let lines: Vec<LineRecord> = read_lines(&sample_document())
            .into_iter()
            .map(|l| l.unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            LineRecord {
                hpos: 10,
                vpos: 20,
                width: 100,
                height: 30,
                text: "Hello World".to_string(),
            }
        );
        assert_eq!(lines[1].hpos, 12);
    }

    #[test]
    fn test_line_without_strings_yields_empty_text() {
        let lines = read_lines(&sample_document());
        assert_eq!(lines[1].as_ref().unwrap().text, "");
    }

    #[test]
    fn test_root_without_namespace_fails() {
        let xml = r#"<alto><TextLine HPOS="1" VPOS="2" WIDTH="3" HEIGHT="4"/></alto>"#;
        assert!(matches!(
            AltoReader::from_reader(xml.as_bytes()),
            Err(AltoError::MissingNamespace)
        ));
    }

    #[test]
    fn test_missing_geometry_attribute_is_fatal() {
        let xml = format!(
            r#"<alto xmlns="{ALTO_NS}"><TextLine HPOS="1" VPOS="2" WIDTH="3"/></alto>"#
        );
        let lines = read_lines(&xml);
        assert_eq!(lines.len(), 1);
        assert!(matches!(
            lines[0],
            Err(AltoError::MissingAttribute("HEIGHT"))
        ));
    }

    #[test]
    fn test_non_numeric_attribute_is_fatal() {
        let xml = format!(
            r#"<alto xmlns="{ALTO_NS}"><TextLine HPOS="abc" VPOS="2" WIDTH="3" HEIGHT="4"/></alto>"#
        );
        let lines = read_lines(&xml);
        assert!(matches!(
            lines[0],
            Err(AltoError::InvalidAttribute { name: "HPOS", .. })
        ));
    }

    #[test]
    fn test_only_direct_string_children_contribute() {
        let xml = format!(
            r#"<alto xmlns="{ALTO_NS}">
  <TextLine HPOS="1" VPOS="2" WIDTH="3" HEIGHT="4">
    <Shape><String CONTENT="nested"/></Shape>
    <String CONTENT="direct"/>
  </TextLine>
</alto>"#
        );
        let lines = read_lines(&xml);
        assert_eq!(lines[0].as_ref().unwrap().text, "direct");
    }

    #[test]
    fn test_foreign_namespace_elements_ignored() {
        let xml = format!(
            r#"<alto xmlns="{ALTO_NS}" xmlns:other="urn:other">
  <other:TextLine HPOS="9" VPOS="9" WIDTH="9" HEIGHT="9"/>
  <TextLine HPOS="1" VPOS="2" WIDTH="3" HEIGHT="4">
    <other:String CONTENT="foreign"/>
    <String CONTENT="ours"/>
  </TextLine>
</alto>"#
        );
        let lines = read_lines(&xml);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].as_ref().unwrap().text, "ours");
    }

    #[test]
    fn test_string_without_content_contributes_nothing() {
        let xml = format!(
            r#"<alto xmlns="{ALTO_NS}">
  <TextLine HPOS="1" VPOS="2" WIDTH="3" HEIGHT="4">
    <String CONTENT="a"/>
    <String/>
    <String CONTENT=""/>
    <String CONTENT="b"/>
  </TextLine>
</alto>"#
        );
        let lines = read_lines(&xml);
        assert_eq!(lines[0].as_ref().unwrap().text, "a b");
    }

    #[test]
    fn test_escaped_content_is_unescaped() {
        let xml = format!(
            r#"<alto xmlns="{ALTO_NS}">
  <TextLine HPOS="1" VPOS="2" WIDTH="3" HEIGHT="4">
    <String CONTENT="Tom &amp; Jerry"/>
  </TextLine>
</alto>"#
        );
        let lines = read_lines(&xml);
        assert_eq!(lines[0].as_ref().unwrap().text, "Tom & Jerry");
    }

    #[test]
    fn test_truncated_document_is_fatal() {
        let xml = format!(
            r#"<alto xmlns="{ALTO_NS}"><TextLine HPOS="1" VPOS="2" WIDTH="3" HEIGHT="4"><String CONTENT="x"/>"#
        );
        let mut lines = AltoReader::from_reader(xml.as_bytes()).unwrap().lines();
        assert!(matches!(lines.next(), Some(Err(_))));
    }
}
