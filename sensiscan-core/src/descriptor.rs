// sensiscan-core/src/descriptor.rs
//! Connection descriptors.
//!
//! A descriptor is given either as discrete fields or as a URL-shaped string
//! `scheme://host[:port]/database?key=value&...`. Query keys and values are
//! form-decoded (`%XX` escapes, `+` as space) and pairs with an empty value are
//! dropped. The only parameter with an effect is `trusted_connection`, matched
//! exactly; its value is compared case-insensitively and the last occurrence
//! wins. Everything else is ignored.
//!
//! License: MIT OR APACHE 2.0

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::ScanError;

/// Where to connect, and how to authenticate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    /// Server name. A port is kept as `host,port`.
    pub server: String,
    /// The home database; it holds the catalog tables and the ledger.
    pub database: String,
    pub trusted_connection: bool,
}

impl ConnectionDescriptor {
    pub fn new(server: impl Into<String>, database: impl Into<String>, trusted_connection: bool) -> Self {
        Self {
            server: server.into(),
            database: database.into(),
            trusted_connection,
        }
    }

    /// Parses a URL-shaped descriptor.
    ///
    /// ```
    /// use sensiscan_core::ConnectionDescriptor;
    ///
    /// let d = ConnectionDescriptor::parse("mssql://dwdb:1433/DQ_DEV?trusted_connection=TRUE&charset=utf8").unwrap();
    /// assert_eq!(d.server, "dwdb,1433");
    /// assert_eq!(d.database, "DQ_DEV");
    /// assert!(d.trusted_connection);
    /// ```
    pub fn parse(input: &str) -> Result<Self, ScanError> {
        let invalid = |reason: &str| ScanError::InvalidDescriptor(input.to_string(), reason.to_string());

        let trimmed = input.trim();
        let without_scheme = match trimmed.split_once("://") {
            Some((scheme, rest)) => {
                if scheme.is_empty() {
                    return Err(invalid("empty scheme"));
                }
                rest
            }
            None => trimmed,
        };

        let (server_part, rest) = without_scheme
            .split_once('/')
            .ok_or_else(|| invalid("missing '/database'"))?;

        let server = match server_part.split_once(':') {
            Some((host, port)) => {
                if port.is_empty() || !port.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid("port must be numeric"));
                }
                format!("{},{}", host, port)
            }
            None => server_part.to_string(),
        };

        let (database, query) = match rest.split_once('?') {
            Some((db, q)) => (db, Some(q)),
            None => (rest, None),
        };
        let database = database.trim_end_matches('/');
        if database.is_empty() {
            return Err(invalid("missing database name"));
        }

        let mut trusted_connection = false;
        for pair in query.unwrap_or_default().split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let (key, value) = (form_decode(key), form_decode(value));
            if value.is_empty() {
                continue;
            }
            if key == "trusted_connection" {
                trusted_connection = value.eq_ignore_ascii_case("true");
            } else {
                debug!("Ignoring connection parameter '{}'", key);
            }
        }

        Ok(Self {
            server,
            database: database.to_string(),
            trusted_connection,
        })
    }
}

/// Decodes one `application/x-www-form-urlencoded` component. Malformed
/// escapes are kept as written; invalid UTF-8 is replaced.
fn form_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .filter(|h| h.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|h| std::str::from_utf8(h).ok());
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(b) => {
                        out.push(b);
                        i += 2;
                    }
                    None => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

impl FromStr for ConnectionDescriptor {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} (trusted_connection={})",
            self.server, self.database, self.trusted_connection
        )
    }
}
