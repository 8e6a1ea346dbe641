//! MIME envelope walk: turns every non-empty leaf part of an archive into a resource.

use std::path::Path;

use mail_parser::decoders::{base64::base64_decode, quoted_printable::quoted_printable_decode};
use mail_parser::{Encoding, HeaderName, Message, MessageParser, MessagePart, MimeHeaders, PartType};

use super::{keep_successes, naming};
use crate::error::{DecomposeError, PartError, Result};
use crate::model::resource::{Resource, ResourceSource};

/// Maximum depth of encapsulated `message/rfc822` parts followed by the walk.
const MAX_DEPTH: usize = 10;

/// Content type assumed for parts without a usable `Content-Type`.
const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Result of walking a MIME envelope.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Body of the last `text/html` part, decoded lossily as UTF-8.
    pub html: Option<String>,
    /// One embedded resource per non-empty part, in walk order.
    pub resources: Vec<Resource>,
}

/// Read an archive from disk and walk its envelope.
pub fn read_envelope(path: &Path) -> Result<Envelope> {
    if !path.is_file() {
        return Err(DecomposeError::NotFound(path.to_path_buf()));
    }
    let raw = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DecomposeError::NotFound(path.to_path_buf())
        } else {
            DecomposeError::parse(path, e)
        }
    })?;
    parse_envelope(path, &raw)
}

/// Walk an in-memory archive. `path` is only used for error context.
///
/// Fails when the bytes are not a MIME message at all; individual parts that
/// cannot be decoded are logged and left out.
pub fn parse_envelope(path: &Path, raw: &[u8]) -> Result<Envelope> {
    let raw = skip_bom(raw);
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Err(DecomposeError::parse(path, "file is empty"));
    }

    let msg = MessageParser::default()
        .parse(raw)
        .ok_or_else(|| DecomposeError::parse(path, "not a MIME message"))?;
    if !declares_mime(&msg) {
        return Err(DecomposeError::parse(
            path,
            "no Content-Type or MIME-Version header",
        ));
    }

    let mut walker = Walker::default();
    walker.walk(&msg, 0);
    tracing::debug!(
        path = %path.display(),
        parts = walker.visited,
        "Walked MIME envelope"
    );

    let resources = keep_successes(walker.outcomes, "envelope");
    let html = resources
        .iter()
        .rfind(|r| r.content_type == "text/html")
        .map(|r| String::from_utf8_lossy(r.data()).into_owned());

    Ok(Envelope { html, resources })
}

/// Depth-first walk over the part tree, recording one outcome per leaf with a payload.
#[derive(Default)]
struct Walker {
    visited: usize,
    outcomes: Vec<std::result::Result<Resource, PartError>>,
}

impl Walker {
    fn walk(&mut self, msg: &Message<'_>, depth: usize) {
        for part in &msg.parts {
            let index = self.visited;
            self.visited += 1;

            match &part.body {
                PartType::Multipart(_) => {}
                PartType::Message(inner) => {
                    if depth + 1 > MAX_DEPTH {
                        self.outcomes.push(Err(PartError::TooDeep {
                            index,
                            max_depth: MAX_DEPTH,
                        }));
                    } else {
                        self.walk(inner, depth + 1);
                    }
                }
                _ => {
                    if let Some(outcome) = part_resource(msg, index, part) {
                        self.outcomes.push(outcome);
                    }
                }
            }
        }
    }
}

/// Build the resource for one leaf part. `None` means the part has no payload.
fn part_resource(
    msg: &Message<'_>,
    index: usize,
    part: &MessagePart<'_>,
) -> Option<std::result::Result<Resource, PartError>> {
    let content_type = content_type_of(part);
    let data = match &part.body {
        PartType::Text(text) | PartType::Html(text) => match text_payload(msg, part, text) {
            Some(data) => data,
            None => {
                return Some(Err(PartError::Encoding {
                    index,
                    content_type,
                }))
            }
        },
        PartType::Binary(bin) | PartType::InlineBinary(bin) => bin.to_vec(),
        PartType::Message(_) | PartType::Multipart(_) => return None,
    };
    if data.is_empty() {
        return None;
    }

    if part.is_encoding_problem {
        return Some(Err(PartError::Encoding {
            index,
            content_type,
        }));
    }

    // The page keeps a synthesized name even when the part declares one.
    let filename = if content_type == "text/html" {
        naming::page_name()
    } else {
        part.attachment_name()
            .filter(|name| !name.is_empty())
            .map(String::from)
            .unwrap_or_else(|| naming::resource_name(&content_type))
    };

    tracing::debug!(index, %content_type, %filename, size = data.len(), "Embedded part");

    let resource = Resource::new(content_type, filename, ResourceSource::Embedded, data)
        .with_location(part.content_location().map(String::from));
    Some(Ok(resource))
}

/// Transfer-decoded bytes of a text part, before any charset conversion.
///
/// `mail-parser` hands text bodies back already converted to UTF-8, so the
/// payload is decoded again from the part's slice of the raw message. `None`
/// means the transfer encoding is corrupt.
fn text_payload(msg: &Message<'_>, part: &MessagePart<'_>, text: &str) -> Option<Vec<u8>> {
    // Part offsets index the whole buffer, not the `raw_message()` view.
    let Some(raw) = msg
        .raw_message
        .get(part.raw_body_offset()..part.raw_end_offset())
    else {
        return Some(text.as_bytes().to_vec());
    };
    match part.encoding {
        Encoding::None => Some(raw.to_vec()),
        Encoding::QuotedPrintable => quoted_printable_decode(raw),
        Encoding::Base64 => base64_decode(raw),
    }
}

/// Lowercase `type/subtype` of a part, defaulting to `text/plain`.
fn content_type_of(part: &MessagePart<'_>) -> String {
    part.content_type()
        .and_then(|ct| {
            ct.subtype()
                .map(|sub| format!("{}/{}", ct.ctype(), sub).to_ascii_lowercase())
        })
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}

/// Whether the root part carries any MIME header at all.
fn declares_mime(msg: &Message<'_>) -> bool {
    msg.parts.first().is_some_and(|root| {
        root.headers
            .iter()
            .any(|h| matches!(h.name, HeaderName::ContentType | HeaderName::MimeVersion))
    })
}

fn skip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data)
}
