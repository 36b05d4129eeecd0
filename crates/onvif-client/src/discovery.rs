//! WS-Discovery: find ONVIF devices on the local network.
//!
//! A probe envelope restricted to the `NetworkVideoTransmitter` device type
//! is multicast to `239.255.255.250:3702`.  Matching devices answer with a
//! `ProbeMatch` announcement carrying one or more `XAddrs` service URIs; the
//! host of the first URI becomes the candidate address.  Candidates are
//! deduplicated across the whole pass (a device answers once per interface
//! it listens on), then a full [`DeviceSession`] is constructed per unique
//! host.  Per-candidate construction failures are logged and skipped;
//! partial results are the expected outcome on a mixed network, not an
//! error.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use onvif_core::texts_at_path;

use crate::session::DeviceSession;
use crate::transport::{HttpTransport, TransportError, DEFAULT_TIMEOUT};

/// WS-Discovery multicast group and port.
const MULTICAST_ADDR: &str = "239.255.255.250:3702";

/// Parameters for one discovery pass.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Local socket address to bind; stands in for an interface selection.
    /// `0.0.0.0:0` probes on the default interface.
    pub bind_addr: SocketAddr,
    /// Multicast destination for the probe.
    pub multicast_addr: SocketAddr,
    /// How long to collect announcements after sending the probe.
    pub response_window: Duration,
    /// Per-request HTTP timeout for the sessions constructed from
    /// discovered candidates.
    pub session_timeout: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:0".parse().expect("static addr"),
            multicast_addr: MULTICAST_ADDR.parse().expect("static addr"),
            response_window: Duration::from_secs(3),
            session_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Errors raised while probing the network.  Per-candidate session failures
/// are *not* errors; they are logged and excluded from the result.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The UDP socket could not be bound.
    #[error("failed to bind discovery socket on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// The probe datagram could not be sent.
    #[error("failed to send probe to {addr}: {source}")]
    SendFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// The HTTP transport for candidate sessions could not be constructed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Probes the network and constructs a session for every unique device that
/// answered.
///
/// # Errors
///
/// Returns [`DiscoveryError`] only for local socket failures.  An empty
/// result set is a valid outcome (no devices on the network).
pub async fn discover(config: &DiscoveryConfig) -> Result<Vec<DeviceSession>, DiscoveryError> {
    let announcements = collect_announcements(config).await?;
    let candidates = extract_candidates(&announcements);
    info!(
        announcements = announcements.len(),
        candidates = candidates.len(),
        "discovery pass complete, constructing sessions"
    );

    // One client, cloned per session, so the configured timeout applies to
    // every discovered device.
    let transport = HttpTransport::new(config.session_timeout)?;
    let mut sessions = Vec::new();
    for xaddr in candidates {
        match DeviceSession::connect_with_transport(&xaddr, None, Box::new(transport.clone()))
            .await
        {
            Ok(session) => sessions.push(session),
            Err(e) => {
                // One bad device must not abort the remaining candidates.
                warn!(xaddr = %xaddr, error = %e, "skipping discovered device");
            }
        }
    }
    Ok(sessions)
}

/// Sends the probe and collects raw announcement documents until the
/// response window elapses.
async fn collect_announcements(config: &DiscoveryConfig) -> Result<Vec<String>, DiscoveryError> {
    let socket = UdpSocket::bind(config.bind_addr)
        .await
        .map_err(|source| DiscoveryError::BindFailed {
            addr: config.bind_addr,
            source,
        })?;

    let probe = probe_envelope();
    socket
        .send_to(probe.as_bytes(), config.multicast_addr)
        .await
        .map_err(|source| DiscoveryError::SendFailed {
            addr: config.multicast_addr,
            source,
        })?;
    debug!(to = %config.multicast_addr, "probe sent");

    let mut announcements = Vec::new();
    let mut buf = vec![0u8; 65_535];
    let deadline = tokio::time::Instant::now() + config.response_window;

    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            break;
        }
        match timeout(remaining, socket.recv_from(&mut buf)).await {
            Ok(Ok((len, src))) => {
                debug!(from = %src, bytes = len, "announcement received");
                announcements.push(String::from_utf8_lossy(&buf[..len]).into_owned());
            }
            Ok(Err(e)) => {
                warn!(error = %e, "discovery recv error");
            }
            // Window elapsed.
            Err(_) => break,
        }
    }
    Ok(announcements)
}

/// Extracts unique candidate `host[:port]` addresses from raw announcement
/// documents, preserving first-seen order.
///
/// Each `XAddrs` field may carry multiple space-separated URIs; the first is
/// taken and reduced to its host segment.  Deduplication is a linear scan
/// across everything accepted so far in this pass, so a device announcing on
/// several interfaces still yields exactly one construction attempt.
fn extract_candidates(announcements: &[String]) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();
    for doc in announcements {
        let hits = match texts_at_path(
            doc,
            &["Envelope", "Body", "ProbeMatches", "ProbeMatch", "XAddrs"],
        ) {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "skipping unparsable announcement");
                continue;
            }
        };
        for hit in hits {
            let Some(host) = first_uri_host(&hit.text) else {
                continue;
            };
            if candidates.iter().any(|seen| *seen == host) {
                debug!(host = %host, "duplicate announcement ignored");
                continue;
            }
            candidates.push(host);
        }
    }
    candidates
}

/// Reduces a space-separated URI list to the host segment of its first
/// entry: `http://host:port/path` → `host:port`.
fn first_uri_host(xaddrs: &str) -> Option<String> {
    let first = xaddrs.split_whitespace().next()?;
    let host = first.split('/').nth(2)?;
    if host.is_empty() {
        return None;
    }
    Some(host.to_string())
}

/// Renders the WS-Discovery probe envelope with a fresh MessageID, filtered
/// to the ONVIF `NetworkVideoTransmitter` device type.
fn probe_envelope() -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>",
            "<s:Envelope xmlns:s=\"http://www.w3.org/2003/05/soap-envelope\"",
            " xmlns:wsa=\"http://schemas.xmlsoap.org/ws/2004/08/addressing\"",
            " xmlns:wsd=\"http://schemas.xmlsoap.org/ws/2005/04/discovery\"",
            " xmlns:dn=\"http://www.onvif.org/ver10/network/wsdl\">",
            "<s:Header>",
            "<wsa:Action>http://schemas.xmlsoap.org/ws/2005/04/discovery/Probe</wsa:Action>",
            "<wsa:MessageID>urn:uuid:{message_id}</wsa:MessageID>",
            "<wsa:To>urn:schemas-xmlsoap-org:ws:2005:04:discovery</wsa:To>",
            "</s:Header>",
            "<s:Body>",
            "<wsd:Probe><wsd:Types>dn:NetworkVideoTransmitter</wsd:Types></wsd:Probe>",
            "</s:Body>",
            "</s:Envelope>"
        ),
        message_id = Uuid::new_v4(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn announcement(hosts: &[&str]) -> String {
        let matches: String = hosts
            .iter()
            .map(|h| {
                format!(
                    "<ProbeMatch><XAddrs>http://{h}/onvif/device_service \
                     http://[fe80::1]/onvif/device_service</XAddrs></ProbeMatch>"
                )
            })
            .collect();
        format!("<Envelope><Body><ProbeMatches>{matches}</ProbeMatches></Body></Envelope>")
    }

    #[test]
    fn test_candidates_are_deduplicated_in_first_seen_order() {
        let docs = vec![
            announcement(&["192.168.1.10", "192.168.1.20"]),
            announcement(&["192.168.1.10"]),
            announcement(&["192.168.1.30", "192.168.1.20"]),
        ];
        assert_eq!(
            extract_candidates(&docs),
            vec!["192.168.1.10", "192.168.1.20", "192.168.1.30"]
        );
    }

    #[test]
    fn test_first_uri_of_space_separated_list_wins() {
        let doc = "<Envelope><Body><ProbeMatches><ProbeMatch><XAddrs>\
                   http://10.0.0.5:8080/onvif/device_service http://10.0.0.6/x\
                   </XAddrs></ProbeMatch></ProbeMatches></Body></Envelope>";
        assert_eq!(extract_candidates(&[doc.to_string()]), vec!["10.0.0.5:8080"]);
    }

    #[test]
    fn test_unparsable_announcement_is_skipped() {
        let docs = vec![
            "<Envelope><Body>".to_string(),
            announcement(&["192.168.1.40"]),
        ];
        assert_eq!(extract_candidates(&docs), vec!["192.168.1.40"]);
    }

    #[test]
    fn test_announcement_without_xaddrs_yields_nothing() {
        let doc = "<Envelope><Body><ProbeMatches><ProbeMatch/></ProbeMatches></Body></Envelope>";
        assert!(extract_candidates(&[doc.to_string()]).is_empty());
    }

    #[test]
    fn test_uri_host_extraction() {
        assert_eq!(
            first_uri_host("http://192.168.1.10:80/onvif/device_service"),
            Some("192.168.1.10:80".to_string())
        );
        assert_eq!(first_uri_host(""), None);
        assert_eq!(first_uri_host("not-a-uri"), None);
    }

    #[test]
    fn test_default_session_timeout_matches_transport_default() {
        assert_eq!(DiscoveryConfig::default().session_timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_probe_envelope_carries_fresh_message_id() {
        let a = probe_envelope();
        let b = probe_envelope();
        assert!(a.contains("urn:uuid:"));
        assert!(a.contains("dn:NetworkVideoTransmitter"));
        assert_ne!(a, b);
    }
}
