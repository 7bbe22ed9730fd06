//! OLE DB style connection strings (`Provider=MSOLAP;Data Source=...;Initial Catalog=...`)

use std::fmt;

/// Provider used when only a server address is given
pub const DEFAULT_PROVIDER: &str = "MSOLAP";

pub const PROVIDER_KEY: &str = "Provider";
pub const DATA_SOURCE_KEY: &str = "Data Source";
pub const INITIAL_CATALOG_KEY: &str = "Initial Catalog";

/// Ordered `key=value` pairs of a connection string.
///
/// Keys compare case-insensitively; the original spelling and order are kept
/// when the string is written back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStringBuilder {
    entries: Vec<(String, String)>,
}

impl ConnectionStringBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder for a bare server address with the default provider
    pub fn for_server(server: &str) -> Self {
        let mut builder = Self::new();
        builder.set(PROVIDER_KEY, DEFAULT_PROVIDER);
        builder.set(DATA_SOURCE_KEY, server);
        builder
    }

    /// Parse `text` as a connection string.
    ///
    /// Returns `None` when the text is not a connection string: empty input,
    /// a segment without `=`, an empty key, or an unterminated quoted value.
    pub fn try_parse(text: &str) -> Option<Self> {
        let mut entries: Vec<(String, String)> = Vec::new();
        let mut chars = text.chars().peekable();

        loop {
            let mut key = String::new();
            let mut saw_equals = false;
            while let Some(c) = chars.next() {
                match c {
                    '=' => {
                        saw_equals = true;
                        break;
                    }
                    ';' if key.trim().is_empty() => key.clear(),
                    ';' => return None,
                    _ => key.push(c),
                }
            }

            if !saw_equals {
                if key.trim().is_empty() {
                    break;
                }
                return None;
            }

            let key = key.trim();
            if key.is_empty() {
                return None;
            }

            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }

            let value = match chars.peek().copied() {
                Some(quote @ ('"' | '\'')) => {
                    chars.next();
                    let mut value = String::new();
                    loop {
                        match chars.next() {
                            Some(c) if c == quote => {
                                if chars.peek() == Some(&quote) {
                                    chars.next();
                                    value.push(quote);
                                } else {
                                    break;
                                }
                            }
                            Some(c) => value.push(c),
                            None => return None,
                        }
                    }
                    // only whitespace may follow the closing quote
                    loop {
                        match chars.next() {
                            Some(';') | None => break,
                            Some(c) if c.is_whitespace() => continue,
                            Some(_) => return None,
                        }
                    }
                    value
                }
                _ => {
                    let mut value = String::new();
                    for c in chars.by_ref() {
                        if c == ';' {
                            break;
                        }
                        value.push(c);
                    }
                    value.trim().to_string()
                }
            };

            match entries.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
                // last occurrence wins
                Some(entry) => entry.1 = value,
                None => entries.push((key.to_string(), value)),
            }
        }

        if entries.is_empty() {
            None
        } else {
            Some(Self { entries })
        }
    }

    /// Parse a connection string, or treat the whole text as a server address
    pub fn from_server_or_connection_string(text: &str) -> Self {
        Self::try_parse(text).unwrap_or_else(|| Self::for_server(text))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Set a value, replacing an existing key in place
    pub fn set(&mut self, key: &str, value: &str) {
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn provider(&self) -> Option<&str> {
        self.get(PROVIDER_KEY)
    }

    pub fn data_source(&self) -> Option<&str> {
        self.get(DATA_SOURCE_KEY)
    }

    pub fn initial_catalog(&self) -> Option<&str> {
        self.get(INITIAL_CATALOG_KEY).filter(|c| !c.is_empty())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ConnectionStringBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}={}", key, quote_value(value))?;
        }
        Ok(())
    }
}

fn quote_value(value: &str) -> String {
    let needs_quotes = value.contains(';')
        || value.starts_with(['"', '\''])
        || value.trim() != value;
    if !needs_quotes {
        return value.to_string();
    }
    if !value.contains('"') {
        format!("\"{}\"", value)
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else {
        format!("\"{}\"", value.replace('"', "\"\""))
    }
}

/// Connection string for `database_name` on a server given either as a
/// connection string or as a bare address.
///
/// A connection string keeps all its other fields; a bare address gets the
/// default provider. The catalog is always set to `database_name`.
pub fn build_connection_string(server_or_connection_string: &str, database_name: &str) -> String {
    let mut builder =
        ConnectionStringBuilder::from_server_or_connection_string(server_or_connection_string);
    builder.set(INITIAL_CATALOG_KEY, database_name);
    builder.to_string()
}

/// Server address named by a connection string, or the text itself when it is a bare address
pub fn data_source(server_or_connection_string: &str) -> String {
    ConnectionStringBuilder::try_parse(server_or_connection_string)
        .and_then(|b| b.data_source().map(str::to_string))
        .unwrap_or_else(|| server_or_connection_string.to_string())
}
