//! The device session: connection identity, credentials, clock offset, and
//! the per-service endpoint directory.
//!
//! A session is constructed from a `host[:port]` address, optionally with
//! credentials, and immediately performs two bootstrap queries:
//!
//! 1. `GetSystemDateAndTime`: computes the clock offset between the local
//!    clock and the device clock.  Authenticated requests timestamp their
//!    security header with the device's believed time, so a camera with a
//!    skewed clock would otherwise reject every call.
//! 2. `GetCapabilities`: populates the endpoint directory mapping each
//!    capability category (`Device`, `Media`, `PTZ`, ...) to its service
//!    base URL.
//!
//! If either query fails the constructor returns
//! [`SessionError::Unreachable`] and no session exists.  A malformed *time*
//! response, by contrast, is a documented best-effort degradation: the
//! offset stays at zero and the device remains usable (strict devices may
//! reject the resulting timestamps; call [`DeviceSession::resync_clock`] to
//! try again).
//!
//! Before the first capability response arrives the directory already holds
//! one synthesized bootstrap entry, `Device →
//! http://<address>/onvif/device_service`, because the two bootstrap queries
//! themselves need an endpoint to go to.

use std::collections::HashMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use onvif_core::schema::device::{GetCapabilities, GetDeviceInformation, GetSystemDateAndTime};
use onvif_core::soap::SoapError;
use onvif_core::{build_envelope, first_text_at_path, texts_at_path, username_token};
use onvif_core::{Category, OnvifRequest};

use crate::transport::{HttpTransport, SoapResponse, Transport, TransportError, DEFAULT_TIMEOUT};

/// Errors raised by session construction and dispatch.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A bootstrap query failed: the device is unreachable at this address
    /// or does not speak ONVIF.  Fatal to construction.
    #[error("device at {xaddr} is not reachable or does not support ONVIF services")]
    Unreachable {
        xaddr: String,
        #[source]
        source: Option<TransportError>,
    },

    /// The operation's capability category has no registered endpoint;
    /// the device's capability response did not offer this service.
    #[error("device offers no {0} service endpoint")]
    ServiceUnsupported(Category),

    /// The operation could not be serialized or wrapped in an envelope.
    #[error(transparent)]
    Soap(#[from] SoapError),

    /// The network call itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Username/password pair for WS-Security authentication.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// Descriptive device metadata from `GetDeviceInformation`.  Never required
/// for correct operation; absent unless explicitly queried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub manufacturer: String,
    pub model: String,
    pub firmware_version: String,
    pub serial_number: String,
    pub hardware_id: String,
}

/// One remote ONVIF device endpoint.
pub struct DeviceSession {
    /// `host[:port]` of the device; immutable after construction.
    xaddr: String,
    /// Credentials applied to every dispatched call, when present.
    credentials: Option<Credentials>,
    /// Device clock minus local clock, captured at the last time query.
    /// Goes stale if the device clock drifts; never refreshed automatically.
    clock_offset: Duration,
    /// Capability category name → service base URL.
    endpoints: HashMap<String, String>,
    /// Cached metadata from [`DeviceSession::fetch_device_information`].
    device_info: Option<DeviceInfo>,
    transport: Box<dyn Transport>,
}

impl DeviceSession {
    /// Connects to the device at `xaddr` without credentials.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Unreachable`] if either bootstrap query
    /// (time, capabilities) fails.
    pub async fn connect(xaddr: &str) -> Result<Self, SessionError> {
        let transport = HttpTransport::new(DEFAULT_TIMEOUT)?;
        Self::connect_with_transport(xaddr, None, Box::new(transport)).await
    }

    /// Connects and installs credentials in one step.  The credentials take
    /// effect from the capability query onward; the initial time query is
    /// always unauthenticated (the offset it establishes is what makes the
    /// authentication timestamps valid in the first place).
    pub async fn connect_with_credentials(
        xaddr: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, SessionError> {
        let transport = HttpTransport::new(DEFAULT_TIMEOUT)?;
        Self::connect_with_transport(
            xaddr,
            Some(Credentials::new(username, password)),
            Box::new(transport),
        )
        .await
    }

    /// Connects through a caller-supplied transport.  This is the seam used
    /// by tests and by embedders that need custom HTTP behaviour (proxies,
    /// TLS termination, instrumented clients).
    pub async fn connect_with_transport(
        xaddr: &str,
        credentials: Option<Credentials>,
        transport: Box<dyn Transport>,
    ) -> Result<Self, SessionError> {
        let mut session = Self::new_unconnected(xaddr, transport);

        let time_response = session
            .call_method(&GetSystemDateAndTime::default())
            .await
            .map_err(|e| session.unreachable(e))?;
        if !time_response.is_success() {
            return Err(session.unreachable_status(time_response.status));
        }
        session.apply_system_date_time(&time_response.body);

        session.credentials = credentials;

        let caps_response = session
            .call_method(&GetCapabilities::default())
            .await
            .map_err(|e| session.unreachable(e))?;
        if !caps_response.is_success() {
            return Err(session.unreachable_status(caps_response.status));
        }
        session.register_capabilities(&caps_response.body);

        info!(
            xaddr = %session.xaddr,
            services = session.endpoints.len(),
            offset_secs = session.clock_offset.num_seconds(),
            "device session established"
        );
        Ok(session)
    }

    /// Builds the pre-bootstrap session state: empty directory except for
    /// the synthesized device-management endpoint.
    fn new_unconnected(xaddr: &str, transport: Box<dyn Transport>) -> Self {
        let mut endpoints = HashMap::new();
        endpoints.insert(
            Category::Device.as_str().to_string(),
            format!("http://{xaddr}/onvif/device_service"),
        );
        Self {
            xaddr: xaddr.to_string(),
            credentials: None,
            clock_offset: Duration::zero(),
            endpoints,
            device_info: None,
            transport,
        }
    }

    /// Sets or replaces the credentials used for authenticated requests.
    /// Takes effect on the next dispatched call.
    pub fn authenticate(&mut self, username: &str, password: &str) {
        self.credentials = Some(Credentials::new(username, password));
    }

    /// Dispatches one operation to the device.
    ///
    /// The operation's declared [`Category`] is resolved through the
    /// endpoint directory; the payload is serialized, wrapped in an
    /// envelope (with a fresh security header iff credentials are set), and
    /// POSTed once.  The response is returned raw; this layer never
    /// interprets response bodies for business outcomes.
    ///
    /// # Errors
    ///
    /// - [`SessionError::ServiceUnsupported`] if the device's capability
    ///   response offered no endpoint for the operation's category.
    /// - [`SessionError::Soap`] if the payload cannot be serialized.
    /// - [`SessionError::Transport`] if the POST fails.
    pub async fn call_method<R: OnvifRequest>(
        &self,
        request: &R,
    ) -> Result<SoapResponse, SessionError> {
        let category = request.category();
        let endpoint = match self.endpoints.get(category.as_str()) {
            Some(url) => url.clone(),
            None => return Err(SessionError::ServiceUnsupported(category)),
        };

        let payload = request.to_xml()?;
        // Regenerated per call: replay protection depends on a fresh nonce
        // and timestamp every time.
        let security = self
            .credentials
            .as_ref()
            .map(|c| username_token(&c.username, &c.password, self.clock_offset));
        let envelope = build_envelope(&payload, security.as_deref())?;

        debug!(category = %category, endpoint = %endpoint, "dispatching operation");
        Ok(self.transport.post(&endpoint, &envelope).await?)
    }

    /// Returns the endpoint registered for `category`, or the empty string
    /// if the device does not offer that service.
    pub fn get_endpoint(&self, category: &str) -> String {
        self.endpoints.get(category).cloned().unwrap_or_default()
    }

    /// The full capability-category → endpoint directory.
    pub fn get_services(&self) -> &HashMap<String, String> {
        &self.endpoints
    }

    /// The device address this session was constructed with.
    pub fn xaddr(&self) -> &str {
        &self.xaddr
    }

    /// Device clock minus local clock at the last successful time query.
    pub fn clock_offset(&self) -> Duration {
        self.clock_offset
    }

    /// Metadata cached by [`DeviceSession::fetch_device_information`].
    pub fn device_info(&self) -> Option<&DeviceInfo> {
        self.device_info.as_ref()
    }

    /// Re-issues the time query and recomputes the clock offset.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Unreachable`] if the query fails.  A
    /// successful query with an unparsable body leaves the previous offset
    /// in place.
    pub async fn resync_clock(&mut self) -> Result<(), SessionError> {
        let response = self.call_method(&GetSystemDateAndTime::default()).await?;
        if !response.is_success() {
            return Err(self.unreachable_status(response.status));
        }
        self.apply_system_date_time(&response.body);
        Ok(())
    }

    /// Queries `GetDeviceInformation` and caches the result.
    ///
    /// # Errors
    ///
    /// Propagates dispatch errors; a successful response with missing
    /// fields yields empty strings for those fields.
    pub async fn fetch_device_information(&mut self) -> Result<&DeviceInfo, SessionError> {
        let response = self.call_method(&GetDeviceInformation::default()).await?;
        let field = |name: &str| {
            first_text_at_path(
                &response.body,
                &["Envelope", "Body", "GetDeviceInformationResponse", name],
            )
            .ok()
            .flatten()
            .map(|t| t.trim().to_string())
            .unwrap_or_default()
        };
        let info = DeviceInfo {
            manufacturer: field("Manufacturer"),
            model: field("Model"),
            firmware_version: field("FirmwareVersion"),
            serial_number: field("SerialNumber"),
            hardware_id: field("HardwareId"),
        };
        Ok(self.device_info.insert(info))
    }

    /// Clock synchronizer: computes `device time − local time` from a
    /// `GetSystemDateAndTimeResponse` body.
    ///
    /// Local time is captured *before* parsing, so response-parsing latency
    /// does not leak into the offset.  Any missing or unparsable field
    /// leaves the offset untouched: a misformatted time response degrades
    /// authentication but must not block device use.
    fn apply_system_date_time(&mut self, body: &str) {
        let local: DateTime<Utc> = Utc::now();

        let field = |date_or_time: &str, name: &str| -> Option<u32> {
            first_text_at_path(
                body,
                &[
                    "Envelope",
                    "Body",
                    "GetSystemDateAndTimeResponse",
                    "SystemDateAndTime",
                    "UTCDateTime",
                    date_or_time,
                    name,
                ],
            )
            .ok()
            .flatten()
            .and_then(|t| t.trim().parse().ok())
        };

        let (Some(year), Some(month), Some(day), Some(hour), Some(minute), Some(second)) = (
            field("Date", "Year"),
            field("Date", "Month"),
            field("Date", "Day"),
            field("Time", "Hour"),
            field("Time", "Minute"),
            field("Time", "Second"),
        ) else {
            warn!(xaddr = %self.xaddr, "time response missing UTCDateTime fields; keeping zero clock offset");
            return;
        };

        let Some(device_time) = Utc
            .with_ymd_and_hms(year as i32, month, day, hour, minute, second)
            .single()
        else {
            warn!(xaddr = %self.xaddr, "time response fields out of range; keeping zero clock offset");
            return;
        };

        self.clock_offset = device_time - local;
        debug!(
            xaddr = %self.xaddr,
            offset_secs = self.clock_offset.num_seconds(),
            "clock offset updated"
        );
    }

    /// Endpoint directory population: registers every
    /// `Capabilities/<Category>/XAddr` entry, overwriting prior entries for
    /// the same category.  A capability response that omits a category
    /// simply leaves it absent, discovered lazily at dispatch.
    fn register_capabilities(&mut self, body: &str) {
        let hits = match texts_at_path(
            body,
            &[
                "Envelope",
                "Body",
                "GetCapabilitiesResponse",
                "Capabilities",
                "*",
                "XAddr",
            ],
        ) {
            Ok(hits) => hits,
            Err(e) => {
                warn!(xaddr = %self.xaddr, error = %e, "unparsable capability response; endpoint directory unchanged");
                return;
            }
        };

        for hit in hits {
            let Some(category) = hit.wildcards.first() else {
                continue;
            };
            debug!(category = %category, endpoint = %hit.text, "registered service endpoint");
            self.endpoints.insert(category.clone(), hit.text);
        }
    }

    fn unreachable(&self, cause: SessionError) -> SessionError {
        let source = match cause {
            SessionError::Transport(e) => Some(e),
            _ => None,
        };
        SessionError::Unreachable {
            xaddr: self.xaddr.clone(),
            source,
        }
    }

    fn unreachable_status(&self, status: u16) -> SessionError {
        SessionError::Unreachable {
            xaddr: self.xaddr.clone(),
            source: Some(TransportError::Unavailable(format!(
                "bootstrap query returned HTTP {status}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;

    fn session_with_mock() -> (DeviceSession, MockTransport) {
        let mock = MockTransport::new();
        let session = DeviceSession::new_unconnected("192.168.1.10:80", Box::new(mock.clone()));
        (session, mock)
    }

    fn time_response(offset: chrono::Duration) -> String {
        let t = Utc::now() + offset;
        use chrono::{Datelike, Timelike};
        format!(
            "<Envelope><Body><GetSystemDateAndTimeResponse><SystemDateAndTime><UTCDateTime>\
             <Time><Hour>{}</Hour><Minute>{}</Minute><Second>{}</Second></Time>\
             <Date><Year>{}</Year><Month>{}</Month><Day>{}</Day></Date>\
             </UTCDateTime></SystemDateAndTime></GetSystemDateAndTimeResponse></Body></Envelope>",
            t.hour(),
            t.minute(),
            t.second(),
            t.year(),
            t.month(),
            t.day()
        )
    }

    #[test]
    fn test_bootstrap_endpoint_is_seeded_from_address() {
        let (session, _mock) = session_with_mock();
        assert_eq!(
            session.get_endpoint("Device"),
            "http://192.168.1.10:80/onvif/device_service"
        );
    }

    #[test]
    fn test_clock_offset_matches_device_time_ahead() {
        let (mut session, _mock) = session_with_mock();
        session.apply_system_date_time(&time_response(Duration::hours(1)));
        let diff = session.clock_offset() - Duration::hours(1);
        assert!(diff.num_seconds().abs() < 5, "offset was off by {diff}");
    }

    #[test]
    fn test_clock_offset_matches_device_time_behind() {
        let (mut session, _mock) = session_with_mock();
        session.apply_system_date_time(&time_response(Duration::minutes(-30)));
        let diff = session.clock_offset() + Duration::minutes(30);
        assert!(diff.num_seconds().abs() < 5, "offset was off by {diff}");
    }

    #[test]
    fn test_malformed_time_response_keeps_zero_offset() {
        let (mut session, _mock) = session_with_mock();
        // Missing the Date element entirely.
        session.apply_system_date_time(
            "<Envelope><Body><GetSystemDateAndTimeResponse><SystemDateAndTime><UTCDateTime>\
             <Time><Hour>1</Hour><Minute>2</Minute><Second>3</Second></Time>\
             </UTCDateTime></SystemDateAndTime></GetSystemDateAndTimeResponse></Body></Envelope>",
        );
        assert_eq!(session.clock_offset(), Duration::zero());
    }

    #[test]
    fn test_out_of_range_time_fields_keep_zero_offset() {
        let (mut session, _mock) = session_with_mock();
        session.apply_system_date_time(
            "<Envelope><Body><GetSystemDateAndTimeResponse><SystemDateAndTime><UTCDateTime>\
             <Time><Hour>25</Hour><Minute>0</Minute><Second>0</Second></Time>\
             <Date><Year>2024</Year><Month>13</Month><Day>40</Day></Date>\
             </UTCDateTime></SystemDateAndTime></GetSystemDateAndTimeResponse></Body></Envelope>",
        );
        assert_eq!(session.clock_offset(), Duration::zero());
    }

    #[test]
    fn test_capability_registration_is_exact_and_last_write_wins() {
        let (mut session, _mock) = session_with_mock();
        session.register_capabilities(
            "<Envelope><Body><GetCapabilitiesResponse><Capabilities>\
             <Device><XAddr>http://a/device</XAddr></Device>\
             <Media><XAddr>http://a/media1</XAddr></Media>\
             <Media><XAddr>http://a/media2</XAddr></Media>\
             </Capabilities></GetCapabilitiesResponse></Body></Envelope>",
        );
        assert_eq!(session.get_services().len(), 2);
        assert_eq!(session.get_endpoint("Device"), "http://a/device");
        assert_eq!(session.get_endpoint("Media"), "http://a/media2");
    }

    #[test]
    fn test_unparsable_capability_response_leaves_directory_unchanged() {
        let (mut session, _mock) = session_with_mock();
        session.register_capabilities("<Envelope><Body></Envelope>");
        // Only the bootstrap entry remains.
        assert_eq!(session.get_services().len(), 1);
    }

    #[test]
    fn test_unknown_category_lookup_returns_empty_string() {
        let (session, _mock) = session_with_mock();
        assert_eq!(session.get_endpoint("PTZ"), "");
    }
}
