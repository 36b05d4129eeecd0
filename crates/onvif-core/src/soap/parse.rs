//! Streaming extraction of values from response documents.
//!
//! Responses come back with whatever namespace prefixes the device chose, so
//! all matching is done on local names.  Paths are matched from the document
//! root (e.g. `["Envelope", "Body", ...]`); a `"*"` segment matches any
//! element and reports the matched local name in [`PathHit::wildcards`];
//! this is how the capability parser recovers the category name from
//! `Capabilities/*/XAddr`.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::soap::SoapError;

/// One element matched by [`texts_at_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathHit {
    /// Local names matched by `"*"` path segments, in path order.
    pub wildcards: Vec<String>,
    /// Concatenated text content of the matched element.
    pub text: String,
}

/// Collects the text content of every element whose local-name path from the
/// document root matches `path`.
///
/// # Errors
///
/// Returns [`SoapError::Read`] if the document is not well-formed XML.
pub fn texts_at_path(xml: &str, path: &[&str]) -> Result<Vec<PathHit>, SoapError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<String> = Vec::new();
    let mut hits = Vec::new();
    let mut pending_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                stack.push(local_name(start.name().as_ref()));
                if stack_matches(&stack, path) {
                    pending_text.clear();
                }
            }
            Ok(Event::Text(text)) => {
                if stack_matches(&stack, path) {
                    let chunk = text
                        .unescape()
                        .map_err(|e| SoapError::Read(e.to_string()))?;
                    pending_text.push_str(&chunk);
                }
            }
            Ok(Event::End(_)) => {
                if stack_matches(&stack, path) {
                    hits.push(PathHit {
                        wildcards: wildcard_names(&stack, path),
                        text: std::mem::take(&mut pending_text),
                    });
                }
                stack.pop();
            }
            Ok(Event::Empty(empty)) => {
                // Self-closing element: can match, but carries no text.
                stack.push(local_name(empty.name().as_ref()));
                if stack_matches(&stack, path) {
                    hits.push(PathHit {
                        wildcards: wildcard_names(&stack, path),
                        text: String::new(),
                    });
                }
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(SoapError::Read(e.to_string())),
        }
    }
    Ok(hits)
}

/// Returns the text of the first element matching `path`, if any.
pub fn first_text_at_path(xml: &str, path: &[&str]) -> Result<Option<String>, SoapError> {
    Ok(texts_at_path(xml, path)?.into_iter().next().map(|h| h.text))
}

/// Strips the namespace prefix from a qualified name.
fn local_name(qname: &[u8]) -> String {
    let name = match qname.iter().rposition(|&b| b == b':') {
        Some(pos) => &qname[pos + 1..],
        None => qname,
    };
    String::from_utf8_lossy(name).into_owned()
}

fn stack_matches(stack: &[String], path: &[&str]) -> bool {
    stack.len() == path.len()
        && stack
            .iter()
            .zip(path)
            .all(|(name, seg)| *seg == "*" || name == seg)
}

fn wildcard_names(stack: &[String], path: &[&str]) -> Vec<String> {
    stack
        .iter()
        .zip(path)
        .filter(|(_, seg)| **seg == "*")
        .map(|(name, _)| name.clone())
        .collect()
}
