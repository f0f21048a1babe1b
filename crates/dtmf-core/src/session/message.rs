//! Minimal SIP message model used between the relay and the session layer
//!
//! Only what the relay reads or writes is modelled: the request method,
//! its Content-Type/Content-Length and body, and the response status.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::types::{PeerId, TransactionKey};

/// SIP request methods
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    Invite,
    Ack,
    Bye,
    Cancel,
    Options,
    Info,
    Update,
    Refer,
    Notify,
    Message,
    Extension(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Invite => "INVITE",
            Method::Ack => "ACK",
            Method::Bye => "BYE",
            Method::Cancel => "CANCEL",
            Method::Options => "OPTIONS",
            Method::Info => "INFO",
            Method::Update => "UPDATE",
            Method::Refer => "REFER",
            Method::Notify => "NOTIFY",
            Method::Message => "MESSAGE",
            Method::Extension(name) => name,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media type of a message body (`type/subtype`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentType {
    pub m_type: String,
    pub m_subtype: String,
}

impl ContentType {
    pub fn new(m_type: impl Into<String>, m_subtype: impl Into<String>) -> Self {
        Self {
            m_type: m_type.into(),
            m_subtype: m_subtype.into(),
        }
    }

    /// Case-insensitive comparison of type and subtype
    pub fn matches(&self, m_type: &str, m_subtype: &str) -> bool {
        self.m_type.eq_ignore_ascii_case(m_type) && self.m_subtype.eq_ignore_ascii_case(m_subtype)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.m_type, self.m_subtype)
    }
}

/// An in-dialog request built by the session layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub peer: PeerId,
    pub cseq: u32,
    content_type: Option<ContentType>,
    content_length: usize,
    body: Bytes,
}

impl Request {
    pub fn new(method: Method, peer: PeerId, cseq: u32) -> Self {
        Self {
            method,
            peer,
            cseq,
            content_type: None,
            content_length: 0,
            body: Bytes::new(),
        }
    }

    /// Replace the body and its Content-Type, keeping Content-Length in step
    pub fn set_content(&mut self, body: Bytes, content_type: ContentType) {
        self.content_length = body.len();
        self.content_type = Some(content_type);
        self.body = body;
    }

    pub fn set_content_length(&mut self, length: usize) {
        self.content_length = length;
    }

    pub fn content_type(&self) -> Option<&ContentType> {
        self.content_type.as_ref()
    }

    pub fn content_length(&self) -> usize {
        self.content_length
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as text, if it is valid UTF-8
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// A final or provisional response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status_code: u16,
    pub reason_phrase: String,
}

impl Response {
    pub fn new(status_code: u16, reason_phrase: impl Into<String>) -> Self {
        Self {
            status_code,
            reason_phrase: reason_phrase.into(),
        }
    }

    pub fn is_provisional(&self) -> bool {
        (100..200).contains(&self.status_code)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// A client transaction and the request it carries
///
/// The session layer may drop the request once the transaction has
/// completed, hence the `Option`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientTransaction {
    pub key: TransactionKey,
    request: Option<Request>,
}

impl ClientTransaction {
    pub fn new(key: TransactionKey, request: Request) -> Self {
        Self { key, request: Some(request) }
    }

    /// Transaction whose original request is no longer available
    pub fn without_request(key: TransactionKey) -> Self {
        Self { key, request: None }
    }

    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }
}

/// An inbound response delivered by the session layer
///
/// Both parts are optional: the session layer passes along whatever it
/// managed to correlate, and processors ignore events they cannot read.
#[derive(Debug, Clone, Default)]
pub struct ResponseEvent {
    pub response: Option<Response>,
    pub client_transaction: Option<ClientTransaction>,
}

impl ResponseEvent {
    pub fn new(response: Response, client_transaction: ClientTransaction) -> Self {
        Self {
            response: Some(response),
            client_transaction: Some(client_transaction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_matching_ignores_case() {
        let ct = ContentType::new("Application", "DTMF-Relay");
        assert!(ct.matches("application", "dtmf-relay"));
        assert!(!ct.matches("application", "sdp"));
        assert_eq!(ct.to_string(), "Application/DTMF-Relay");
    }

    #[test]
    fn set_content_tracks_byte_length() {
        let mut request = Request::new(Method::Info, PeerId::new(), 2);
        request.set_content(Bytes::from_static(b"Signal=1\r\n"), ContentType::new("application", "dtmf-relay"));
        assert_eq!(request.content_length(), 10);
        assert_eq!(request.body_str(), Some("Signal=1\r\n"));
    }

    #[test]
    fn status_categories() {
        assert!(Response::new(100, "Trying").is_provisional());
        assert!(Response::new(202, "Accepted").is_success());
        assert!(!Response::new(481, "Call/Transaction Does Not Exist").is_success());
    }
}
