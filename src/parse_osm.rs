use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str;

use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use xz::bufread::XzDecoder;

use crate::data::{ElementKind, OsmElement, RawTag};
use crate::errors::{Error, Result};

/// Pull-based reader yielding one node, way or relation at a time, together
/// with its `tag` children. Only the element being assembled is held in
/// memory, so documents far larger than RAM stream through in one pass.
///
/// The first error ends the stream; an unparseable document is never
/// partially recovered.
pub struct OsmElementReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    depth: usize,
    seen_root: bool,
    current: Option<(OsmElement, usize)>,
    finished: bool,
}

/// Opens `path` for streaming, decompressing on the fly when it ends in `.xz`.
pub fn open_osm_file(path: &Path) -> Result<OsmElementReader<Box<dyn BufRead>>> {
    let file = fs::File::open(path)?;
    let file_reader = BufReader::new(file);
    let source: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "xz") {
        let xz_reader = XzDecoder::new(file_reader);
        Box::new(BufReader::new(xz_reader))
    } else {
        Box::new(file_reader)
    };
    Ok(OsmElementReader::from_reader(source))
}

impl<R: BufRead> OsmElementReader<R> {
    pub fn from_reader(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.trim_text(true);
        reader.check_end_names(true);

        OsmElementReader {
            reader,
            buf: Vec::new(),
            depth: 0,
            seen_root: false,
            current: None,
            finished: false,
        }
    }

    fn next_element(&mut self) -> Result<Option<OsmElement>> {
        loop {
            // if we don't keep a borrow elsewhere, we can clear the buffer to keep memory usage low
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(err) => return Err(malformed_at(&self.reader, err.to_string())),
            };
            match event {
                Event::Start(e) => {
                    self.depth += 1;
                    self.seen_root = true;
                    match &mut self.current {
                        None => {
                            if let Some(kind) = ElementKind::from_name(e.name().as_ref()) {
                                let element = start_element(kind, &e)?;
                                self.current = Some((element, self.depth));
                            }
                        }
                        Some((element, depth)) => {
                            if self.depth == *depth + 1 && e.name().as_ref() == b"tag" {
                                push_tag(element, &e)?;
                            } else {
                                count_child(element, &e)?;
                            }
                        }
                    }
                }
                Event::Empty(e) => {
                    self.seen_root = true;
                    match &mut self.current {
                        None => {
                            if let Some(kind) = ElementKind::from_name(e.name().as_ref()) {
                                return start_element(kind, &e).map(Some);
                            }
                        }
                        Some((element, depth)) => {
                            if self.depth == *depth && e.name().as_ref() == b"tag" {
                                push_tag(element, &e)?;
                            } else {
                                count_child(element, &e)?;
                            }
                        }
                    }
                }
                Event::End(_) => {
                    let closes_current =
                        matches!(&self.current, Some((_, depth)) if *depth == self.depth);
                    self.depth = self.depth.saturating_sub(1);
                    if closes_current {
                        return Ok(self.current.take().map(|(element, _)| element));
                    }
                }
                Event::Text(_) | Event::CData(_) => {
                    return Err(malformed_at(
                        &self.reader,
                        "unexpected character data in OSM document",
                    ));
                }
                Event::Eof => {
                    if self.depth != 0 {
                        return Err(malformed_at(&self.reader, "document ended inside an open element"));
                    }
                    if !self.seen_root {
                        return Err(malformed_at(&self.reader, "document has no root element"));
                    }
                    return Ok(None);
                }
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) => (),
            }
        }
    }
}

impl<R: BufRead> Iterator for OsmElementReader<R> {
    type Item = Result<OsmElement>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_element() {
            Ok(Some(element)) => Some(Ok(element)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

fn malformed_at<R>(reader: &Reader<R>, message: impl AsRef<str>) -> Error {
    Error::malformed(format!(
        "{} (at byte {})",
        message.as_ref(),
        reader.buffer_position()
    ))
}

fn read_attributes(el: &BytesStart) -> Result<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        let key = str::from_utf8(attribute.key.as_ref())?.to_string();
        let value = attribute.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(attributes)
}

fn start_element(kind: ElementKind, el: &BytesStart) -> Result<OsmElement> {
    let mut element = OsmElement::new(kind);
    element.attributes = read_attributes(el)?;
    Ok(element)
}

fn count_child(element: &mut OsmElement, el: &BytesStart) -> Result<()> {
    let qname = el.name();
    let name = str::from_utf8(qname.as_ref())?;
    *element.children.entry(name.to_string()).or_default() += 1;
    Ok(())
}

fn push_tag(element: &mut OsmElement, el: &BytesStart) -> Result<()> {
    let mut key = None;
    let mut value = None;
    for (name, attribute) in read_attributes(el)? {
        match name.as_str() {
            "k" => key = Some(attribute),
            "v" => value = Some(attribute),
            _ => (),
        }
    }
    match (key, value) {
        (Some(key), Some(value)) => element.tags.push(RawTag { key, value }),
        _ => {
            debug!(element = element.kind.as_str(), id = element.attribute("id").unwrap_or("");
                "Skipping tag without k/v pair");
        }
    }
    Ok(())
}
