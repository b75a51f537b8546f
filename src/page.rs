use anyhow::Result;
use quick_xml::{
    events::{BytesEnd, BytesStart, Event},
    Reader,
};
use std::path::Path;
use thiserror::Error;

const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is text up to their own end tag
const RAW_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "textarea", "title"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("No element with id \"{id}\"")]
    ElementNotFound { id: String },
    #[error("Element with id \"{id}\" is never closed")]
    Unterminated { id: String },
    #[error("Malformed markup at byte {position}: {message}")]
    Malformed { position: usize, message: String },
}

/// Byte range covering an element from its start tag through its end tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    end: usize,
}

/// An HTML document edited in place by element id.
///
/// Only the markup around the targeted elements is interpreted; everything
/// else is kept byte for byte. Comments, CDATA sections and the bodies of
/// `script`/`style` elements never match an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    html: String,
}

impl Page {
    pub async fn load(path: impl AsRef<Path>) -> Result<Page> {
        let html = tokio::fs::read_to_string(path).await?;

        Ok(Page { html })
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        tokio::fs::write(path, self.html()).await?;

        Ok(())
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn contains_element(&self, id: &str) -> bool {
        let mut tags = Tags::new(&self.html);

        matches!(find_start_tag(&mut tags, id), Ok(Some(_)))
    }

    pub fn remove_element(&mut self, id: &str) -> Result<(), Error> {
        let span = self.find_element(id)?;
        self.html.replace_range(span.start..span.end, "");

        Ok(())
    }

    /// Inserts `html` as the next sibling of the element with the given id
    pub fn insert_after(&mut self, id: &str, html: &str) -> Result<(), Error> {
        let span = self.find_element(id)?;
        self.html.insert_str(span.end, html);

        Ok(())
    }

    fn find_element(&self, id: &str) -> Result<Span, Error> {
        let mut tags = Tags::new(&self.html);

        let (start, open_end, name, closed) = match find_start_tag(&mut tags, id)? {
            Some(Tag::Start {
                start,
                end,
                name,
                closed,
                ..
            }) => (start, end, name, closed),
            _ => return Err(Error::ElementNotFound { id: id.to_owned() }),
        };

        if closed {
            return Ok(Span {
                start,
                end: open_end,
            });
        }

        let mut depth = 1usize;
        while let Some(tag) = tags.next_tag()? {
            match tag {
                Tag::Start {
                    name: other,
                    closed: false,
                    ..
                } if other.eq_ignore_ascii_case(name) => depth += 1,
                Tag::End { end, element }
                    if element.name().as_ref().eq_ignore_ascii_case(name.as_bytes()) =>
                {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(Span { start, end });
                    }
                }
                _ => {}
            }
        }

        Err(Error::Unterminated { id: id.to_owned() })
    }
}

impl From<String> for Page {
    fn from(html: String) -> Self {
        Page { html }
    }
}

impl From<&str> for Page {
    fn from(html: &str) -> Self {
        Page {
            html: html.to_owned(),
        }
    }
}

enum Tag<'a> {
    Start {
        start: usize,
        end: usize,
        name: &'a str,
        element: BytesStart<'a>,
        /// Self-closing or void: no end tag follows
        closed: bool,
    },
    End {
        end: usize,
        element: BytesEnd<'a>,
    },
}

/// Start and end tags of an HTML document with absolute byte offsets
struct Tags<'a> {
    html: &'a str,
    base: usize,
    reader: Reader<&'a [u8]>,
}

impl<'a> Tags<'a> {
    fn new(html: &'a str) -> Self {
        Tags {
            html,
            base: 0,
            reader: html_reader(html),
        }
    }

    fn position(&self) -> usize {
        self.base + self.reader.buffer_position() as usize
    }

    fn restart_at(&mut self, position: usize) {
        self.base = position;
        self.reader = html_reader(&self.html[position..]);
    }

    fn next_tag(&mut self) -> Result<Option<Tag<'a>>, Error> {
        let html = self.html;

        loop {
            let event = self.reader.read_event().map_err(|err| Error::Malformed {
                position: self.position(),
                message: err.to_string(),
            })?;

            match event {
                Event::Start(element) => {
                    let end = self.position();
                    let start = end - element.len() - 2;
                    let name = &html[start + 1..start + 1 + element.name().as_ref().len()];

                    if RAW_TEXT_ELEMENTS.iter().any(|raw| raw.eq_ignore_ascii_case(name)) {
                        let close = find_ignore_case(html, end, &format!("</{}", name))
                            .unwrap_or(html.len());
                        self.restart_at(close);
                    }

                    let closed = VOID_ELEMENTS.iter().any(|void| void.eq_ignore_ascii_case(name));
                    return Ok(Some(Tag::Start {
                        start,
                        end,
                        name,
                        element,
                        closed,
                    }));
                }
                Event::Empty(element) => {
                    let end = self.position();
                    let start = end - element.len() - 3;
                    let name = &html[start + 1..start + 1 + element.name().as_ref().len()];

                    return Ok(Some(Tag::Start {
                        start,
                        end,
                        name,
                        element,
                        closed: true,
                    }));
                }
                Event::End(element) => {
                    return Ok(Some(Tag::End {
                        end: self.position(),
                        element,
                    }));
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }
}

fn html_reader(html: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.expand_empty_elements = false;

    reader
}

fn find_start_tag<'a>(tags: &mut Tags<'a>, id: &str) -> Result<Option<Tag<'a>>, Error> {
    while let Some(tag) = tags.next_tag()? {
        if let Tag::Start { element, .. } = &tag {
            if has_id(element, id) {
                return Ok(Some(tag));
            }
        }
    }

    Ok(None)
}

fn has_id(element: &BytesStart, id: &str) -> bool {
    element.html_attributes().flatten().any(|attribute| {
        attribute.key.as_ref().eq_ignore_ascii_case(b"id")
            && attribute.value.as_ref() == id.as_bytes()
    })
}

fn find_ignore_case(html: &str, from: usize, needle: &str) -> Option<usize> {
    html.as_bytes()[from..]
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
        .map(|offset| from + offset)
}
