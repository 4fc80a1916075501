//! Transport client options parsed from raw settings.

use crate::config::RawSettings;
use crate::error::DecryptError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Wire protocol for the transport client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    #[default]
    Https,
}

impl Protocol {
    /// Parse a protocol name; anything but `http`/`https` is rejected.
    pub fn parse(value: &str) -> Option<Protocol> {
        if value.eq_ignore_ascii_case("http") {
            Some(Protocol::Http)
        } else if value.eq_ignore_ascii_case("https") {
            Some(Protocol::Https)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Http => write!(f, "http"),
            Protocol::Https => write!(f, "https"),
        }
    }
}

/// Host-provided capability for decrypting stored secret settings.
pub trait DecryptSecret: Send + Sync {
    /// Decrypt an encrypted setting value into cleartext.
    fn decrypt(&self, value: &str) -> Result<String, DecryptError>;
}

/// Passthrough decryptor for settings stored in cleartext.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDecrypt;

impl DecryptSecret for NoopDecrypt {
    fn decrypt(&self, value: &str) -> Result<String, DecryptError> {
        Ok(value.to_string())
    }
}

/// Options applied to the transport client.
///
/// Every field is optional: `None` leaves the client's own default in
/// place. Parsing never fails; an invalid value is reported and skipped
/// so the remaining options still apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Connection establishment timeout in milliseconds.
    pub connection_timeout_ms: Option<u64>,
    /// Socket read timeout in milliseconds.
    pub socket_timeout_ms: Option<u64>,
    /// Connection pool ceiling.
    pub max_connections: Option<u32>,
    /// Client-internal retry ceiling, distinct from the filter's own
    /// attempt loop.
    pub max_error_retry: Option<u32>,
    /// Wire protocol.
    pub protocol: Option<Protocol>,
    /// User agent override.
    pub user_agent: Option<String>,
    /// Proxy host.
    pub proxy_host: Option<String>,
    /// Proxy port.
    pub proxy_port: Option<u16>,
    /// Proxy username.
    pub proxy_username: Option<String>,
    /// Proxy password, decrypted.
    pub proxy_password: Option<String>,
    /// NTLM proxy domain.
    pub proxy_domain: Option<String>,
    /// NTLM proxy workstation.
    pub proxy_workstation: Option<String>,
    /// Socket (send, receive) buffer size hints; only meaningful as a
    /// pair.
    pub socket_buffer_size_hints: Option<(u32, u32)>,
}

impl ClientConfig {
    /// Build client options from raw settings.
    ///
    /// The proxy password travels encrypted and goes through the host's
    /// decrypt capability; a decryption failure skips that one setting.
    pub fn from_settings(settings: &RawSettings, decrypt: &dyn DecryptSecret) -> ClientConfig {
        let mut config = ClientConfig {
            connection_timeout_ms: settings.get_parsed("connectionTimeout"),
            socket_timeout_ms: settings.get_parsed("socketTimeout"),
            max_connections: settings.get_parsed("maxConnections"),
            max_error_retry: settings.get_parsed("maxErrorRetry"),
            protocol: None,
            user_agent: settings.get("userAgent").map(str::to_string),
            proxy_host: settings.get("proxyHost").map(str::to_string),
            proxy_port: settings.get_parsed("proxyPort"),
            proxy_username: settings.get("proxyUsername").map(str::to_string),
            proxy_password: None,
            proxy_domain: settings.get("proxyDomain").map(str::to_string),
            proxy_workstation: settings.get("proxyWorkstation").map(str::to_string),
            socket_buffer_size_hints: None,
        };

        if let Some(value) = settings.get("protocol") {
            match Protocol::parse(value) {
                Some(protocol) => config.protocol = Some(protocol),
                None => warn!("Invalid protocol value: {}", value),
            }
        }

        if let Some(encrypted) = settings.get("proxyPassword") {
            match decrypt.decrypt(encrypted) {
                Ok(cleartext) => config.proxy_password = Some(cleartext),
                Err(err) => warn!("Error decrypting proxyPassword: {}", err),
            }
        }

        // Buffer hints are only applied as a pair.
        let send = settings.get_parsed("socketSendBufferSizeHint");
        let receive = settings.get_parsed("socketReceiveBufferSizeHint");
        if let (Some(send), Some(receive)) = (send, receive) {
            config.socket_buffer_size_hints = Some((send, receive));
        }

        config
    }
}
