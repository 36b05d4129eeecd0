//! SOAP 1.2 envelope construction.
//!
//! An envelope wraps exactly one operation payload element in `<s:Body>`,
//! declares the full [`NAMESPACES`] registry on the root element, and, for
//! authenticated calls, carries one security block in `<s:Header>`.  The
//! result is a `String` used directly as an HTTP request body.

use std::fmt::Write as _;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::soap::namespaces::{ENVELOPE_NS, NAMESPACES};
use crate::soap::SoapError;

/// Wraps `payload` into a complete SOAP 1.2 envelope.
///
/// `security` is the pre-rendered WS-Security block from
/// [`crate::soap::security::username_token`]; when `None` the envelope
/// carries no `<s:Header>` at all.
///
/// # Errors
///
/// Returns [`SoapError::MalformedPayload`] if `payload` is not well-formed
/// XML.  The payload is embedded verbatim, so this check is what keeps a
/// broken operation serialization from producing a silently corrupt request.
pub fn build_envelope(payload: &str, security: Option<&str>) -> Result<String, SoapError> {
    check_well_formed(payload)?;

    let mut root = format!("<s:Envelope xmlns:s=\"{ENVELOPE_NS}\"");
    for (prefix, uri) in NAMESPACES {
        // The registry is small and static; write! on a String cannot fail.
        let _ = write!(root, " xmlns:{prefix}=\"{uri}\"");
    }
    root.push('>');

    let mut envelope = root;
    if let Some(header) = security {
        let _ = write!(envelope, "<s:Header>{header}</s:Header>");
    }
    let _ = write!(envelope, "<s:Body>{payload}</s:Body></s:Envelope>");
    Ok(envelope)
}

/// Runs the payload through a streaming reader to verify it parses as XML.
fn check_well_formed(payload: &str) -> Result<(), SoapError> {
    let mut reader = Reader::from_str(payload);
    let mut depth = 0usize;
    let mut seen_element = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => {
                depth += 1;
                seen_element = true;
            }
            Ok(Event::End(_)) => {
                if depth == 0 {
                    return Err(SoapError::MalformedPayload(
                        "unexpected closing tag".to_string(),
                    ));
                }
                depth -= 1;
            }
            Ok(Event::Empty(_)) => seen_element = true,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(SoapError::MalformedPayload(e.to_string())),
        }
    }
    if depth != 0 || !seen_element {
        return Err(SoapError::MalformedPayload(
            "payload must contain exactly one complete element".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_wraps_payload_in_body() {
        let env = build_envelope("<tds:GetSystemDateAndTime/>", None).unwrap();
        assert!(env.starts_with("<s:Envelope"));
        assert!(env.contains("<s:Body><tds:GetSystemDateAndTime/></s:Body>"));
        assert!(env.ends_with("</s:Envelope>"));
    }

    #[test]
    fn test_envelope_declares_all_namespaces() {
        let env = build_envelope("<tds:GetCapabilities/>", None).unwrap();
        for (prefix, uri) in NAMESPACES {
            assert!(env.contains(&format!("xmlns:{prefix}=\"{uri}\"")));
        }
        assert!(env.contains(&format!("xmlns:s=\"{ENVELOPE_NS}\"")));
    }

    #[test]
    fn test_envelope_without_security_has_no_header() {
        let env = build_envelope("<a/>", None).unwrap();
        assert!(!env.contains("<s:Header>"));
    }

    #[test]
    fn test_envelope_with_security_places_header_before_body() {
        let env = build_envelope("<a/>", Some("<Security>tok</Security>")).unwrap();
        let header_pos = env.find("<s:Header>").unwrap();
        let body_pos = env.find("<s:Body>").unwrap();
        assert!(header_pos < body_pos);
        assert!(env.contains("<s:Header><Security>tok</Security></s:Header>"));
    }

    #[test]
    fn test_unbalanced_payload_is_rejected() {
        let err = build_envelope("<a><b></a>", None).unwrap_err();
        assert!(matches!(err, SoapError::MalformedPayload(_)));
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        let err = build_envelope("", None).unwrap_err();
        assert!(matches!(err, SoapError::MalformedPayload(_)));
    }
}
