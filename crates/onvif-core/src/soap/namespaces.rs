//! The fixed ONVIF namespace registry.
//!
//! Every outgoing envelope declares the full set of protocol namespaces on
//! its root element so that any operation payload can reference its service
//! prefix without declaring it locally.  The table is process-wide immutable
//! configuration data: a `const` slice, never mutated after startup.

/// SOAP 1.2 envelope namespace, bound to the `s` prefix on the envelope root.
pub const ENVELOPE_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

/// Prefix → URI table attached to the root of every outgoing envelope.
pub const NAMESPACES: &[(&str, &str)] = &[
    ("onvif", "http://www.onvif.org/ver10/schema"),
    ("tds", "http://www.onvif.org/ver10/device/wsdl"),
    ("trt", "http://www.onvif.org/ver10/media/wsdl"),
    ("tev", "http://www.onvif.org/ver10/events/wsdl"),
    ("tptz", "http://www.onvif.org/ver20/ptz/wsdl"),
    ("timg", "http://www.onvif.org/ver20/imaging/wsdl"),
    ("tan", "http://www.onvif.org/ver20/analytics/wsdl"),
    ("xmime", "http://www.w3.org/2005/05/xmlmime"),
    ("wsnt", "http://docs.oasis-open.org/wsn/b-2"),
    ("xop", "http://www.w3.org/2004/08/xop/include"),
    ("wsa", "http://www.w3.org/2005/08/addressing"),
    ("wstop", "http://docs.oasis-open.org/wsn/t-1"),
    ("wsntw", "http://docs.oasis-open.org/wsn/bw-2"),
    ("wsrf-rw", "http://docs.oasis-open.org/wsrf/rw-2"),
    ("wsaw", "http://www.w3.org/2006/05/addressing/wsdl"),
];
