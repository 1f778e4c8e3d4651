// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::document::{Document, Element, NodeId};
use super::error::XmlError;

impl Document {
    /// Parses a document, keeping the source text of every node.
    pub fn parse(text: &str) -> Result<Document, XmlError> {
        let (bom, body) = match text.strip_prefix('\u{feff}') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let mut document = Document::default();
        document.bom = bom;
        let mut reader = Reader::from_str(body);
        let mut open: Vec<NodeId> = Vec::new();
        let mut cursor = 0;

        loop {
            let event = reader.read_event()?;
            let end = reader.buffer_position();
            let parent = open.last().copied();

            match event {
                Event::Eof => break,
                Event::Text(_) => {
                    // Text runs up to the next markup. Work the boundary out from the
                    // source so that entity references stay exactly as written.
                    let text_end = body[cursor..]
                        .find('<')
                        .map_or(body.len(), |offset| cursor + offset);
                    if text_end > cursor {
                        document.push_raw(parent, &body[cursor..text_end]);
                    }
                    cursor = text_end;
                    continue;
                }
                Event::Start(start) => {
                    let raw = markup(body, cursor, end)?;
                    let id = document.push_element(parent, element_from(&start, raw, false)?);
                    open.push(id);
                }
                Event::Empty(start) => {
                    let raw = markup(body, cursor, end)?;
                    document.push_element(parent, element_from(&start, raw, true)?);
                }
                Event::End(_) => {
                    let raw = markup(body, cursor, end)?;
                    let id = open.pop().ok_or_else(|| {
                        XmlError::Structure(format!("unexpected closing tag at byte {}", cursor))
                    })?;
                    document.set_raw_end(id, raw);
                }
                _ => {
                    let raw = markup(body, cursor, end)?;
                    document.push_raw(parent, raw);
                }
            }
            cursor = end;
        }

        if let Some(&unclosed) = open.last() {
            return Err(XmlError::Structure(format!(
                "element <{}> is never closed",
                document.name(unclosed)
            )));
        }
        if cursor < body.len() {
            document.push_raw(None, &body[cursor..]);
        }
        Ok(document)
    }
}

/// Gets the source text of a markup event, which must start at the cursor.
fn markup(body: &str, cursor: usize, end: usize) -> Result<&str, XmlError> {
    body.get(cursor..end)
        .filter(|raw| raw.starts_with('<'))
        .ok_or_else(|| XmlError::Structure(format!("unexpected markup at byte {}", cursor)))
}

fn element_from(start: &BytesStart, raw: &str, self_closing: bool) -> Result<Element, XmlError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        attributes.push((key, value));
    }

    let mut element = Element::new(&name, attributes);
    element.self_closing = self_closing;
    element.raw_start = Some(raw.to_string());
    Ok(element)
}
