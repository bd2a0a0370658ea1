// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Channel catalog and server-list normalization.
//!
//! The catalog maps a channel key to one opaque entry. An entry is either the
//! list form `{ "servidores": [{ "nombre", "url", "k1"?, "k2"? }, ...] }` or
//! the legacy single-server form `{ "url", "k1"?, "k2"? }`. Keys keep document
//! order so that "first channel" is well defined.

use serde_json::{Map, Value};

/// Errors raised while reading a catalog document.
///
/// Only the document as a whole can fail; malformed entries normalize to an
/// empty server list instead.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The text was not valid JSON.
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The document parsed, but its root is not an object.
    #[error("catalog root must be an object, found {0}")]
    NotAnObject(&'static str),
}

/// One upstream candidate for a channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerDescriptor {
    name: String,
    url: String,
    key_id: Option<String>,
    key: Option<String>,
}

impl ServerDescriptor {
    /// Creates a descriptor without content keys.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            key_id: None,
            key: None,
        }
    }

    /// Attaches the optional content-key pair (`k1`, `k2`).
    #[must_use]
    pub fn with_keys(mut self, key_id: Option<String>, key: Option<String>) -> Self {
        self.key_id = key_id;
        self.key = key;
        self
    }

    /// Display name shown on the server button.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw media (or embed page) URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Content key id (`k1`), if configured.
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// Content key (`k2`), if configured.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns `(key_id, key)` only when both are present and non-empty.
    #[must_use]
    pub fn content_key(&self) -> Option<(&str, &str)> {
        match (self.key_id(), self.key()) {
            (Some(id), Some(key)) if !id.is_empty() && !key.is_empty() => Some((id, key)),
            _ => None,
        }
    }
}

/// One `servidores` sub-entry. Each field is read on its own, so a field of
/// the wrong type is dropped without losing its siblings.
#[derive(Debug)]
struct RawServer {
    nombre: Option<String>,
    url: Option<String>,
    k1: Option<String>,
    k2: Option<String>,
}

impl RawServer {
    fn read(raw: &Value) -> Self {
        Self {
            nombre: string_field(raw, "nombre"),
            url: string_field(raw, "url"),
            k1: string_field(raw, "k1"),
            k2: string_field(raw, "k2"),
        }
    }

    fn into_descriptor(self, position: usize) -> ServerDescriptor {
        let name = match self.nombre {
            Some(name) if !name.is_empty() => name,
            _ => default_server_name(position),
        };
        ServerDescriptor::new(name, self.url.unwrap_or_default()).with_keys(self.k1, self.k2)
    }
}

/// Returns the label used for a server without a `nombre`; `position` is
/// zero-based.
#[must_use]
pub fn default_server_name(position: usize) -> String {
    format!("Servidor {}", position + 1)
}

/// Turns one catalog entry into its ordered server list.
///
/// A non-empty `servidores` array wins; otherwise a non-empty top-level `url`
/// yields a single `"Servidor 1"`. Anything else is an empty list, meaning
/// "no playable server for this channel".
#[must_use]
pub fn normalize_servers(entry: &Value) -> Vec<ServerDescriptor> {
    if let Some(list) = entry.get("servidores").and_then(Value::as_array)
        && !list.is_empty()
    {
        return list
            .iter()
            .enumerate()
            .map(|(position, raw)| RawServer::read(raw).into_descriptor(position))
            .collect();
    }

    match entry.get("url").and_then(Value::as_str) {
        Some(url) if !url.is_empty() => {
            let key_id = string_field(entry, "k1");
            let key = string_field(entry, "k2");
            vec![ServerDescriptor::new(default_server_name(0), url).with_keys(key_id, key)]
        }
        _ => Vec::new(),
    }
}

fn string_field(entry: &Value, field: &str) -> Option<String> {
    entry.get(field).and_then(Value::as_str).map(str::to_owned)
}

/// The channel catalog, in document order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    channels: Map<String, Value>,
}

impl Catalog {
    /// Parses a catalog from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Wraps an already-parsed catalog value.
    pub fn from_value(value: Value) -> Result<Self, CatalogError> {
        match value {
            Value::Object(channels) => Ok(Self { channels }),
            Value::Null => Err(CatalogError::NotAnObject("null")),
            Value::Bool(_) => Err(CatalogError::NotAnObject("boolean")),
            Value::Number(_) => Err(CatalogError::NotAnObject("number")),
            Value::String(_) => Err(CatalogError::NotAnObject("string")),
            Value::Array(_) => Err(CatalogError::NotAnObject("array")),
        }
    }

    /// Returns `true` if the catalog has no channels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Channel keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    /// Returns the raw entry for `key`.
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&Value> {
        self.channels.get(key)
    }

    /// Picks the channel to show: `requested` if the catalog has it, else the
    /// first key. `None` only when the catalog is empty.
    #[must_use]
    pub fn resolve_channel(&self, requested: Option<&str>) -> Option<&str> {
        requested
            .and_then(|requested| self.keys().find(|key| *key == requested))
            .or_else(|| self.keys().next())
    }

    /// Normalized server list for `key`; empty for unknown channels.
    #[must_use]
    pub fn servers(&self, key: &str) -> Vec<ServerDescriptor> {
        self.entry(key).map(normalize_servers).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_entries_map_one_to_one() {
        let entry = json!({
            "servidores": [
                { "nombre": "A", "url": "http://x/stream.m3u8" },
                { "url": "http://y/embed", "k1": "id", "k2": "key" },
            ]
        });
        let servers = normalize_servers(&entry);

        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].name(), "A");
        assert_eq!(servers[0].url(), "http://x/stream.m3u8");
        assert_eq!(servers[1].name(), "Servidor 2");
        assert_eq!(servers[1].content_key(), Some(("id", "key")));
    }

    #[test]
    fn empty_name_uses_positional_default() {
        let entry = json!({ "servidores": [{ "nombre": "", "url": "u" }] });
        assert_eq!(normalize_servers(&entry)[0].name(), "Servidor 1");
    }

    #[test]
    fn legacy_single_url_becomes_servidor_1() {
        let entry = json!({ "url": "http://z/live.mpd", "k1": "a", "k2": "b" });
        let servers = normalize_servers(&entry);

        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].name(), "Servidor 1");
        assert_eq!(servers[0].key_id(), Some("a"));
        assert_eq!(servers[0].key(), Some("b"));
    }

    #[test]
    fn empty_list_falls_back_to_legacy_url() {
        let entry = json!({ "servidores": [], "url": "http://z/a.m3u8" });
        assert_eq!(normalize_servers(&entry).len(), 1);
    }

    #[test]
    fn malformed_entries_normalize_to_empty() {
        assert!(normalize_servers(&json!(null)).is_empty());
        assert!(normalize_servers(&json!({ "url": "" })).is_empty());
        assert!(normalize_servers(&json!({ "servidores": "nope" })).is_empty());
        assert!(normalize_servers(&json!(42)).is_empty());
    }

    #[test]
    fn malformed_sub_entry_keeps_its_slot() {
        let entry = json!({ "servidores": [{ "url": 7 }, { "nombre": "B", "url": "b" }] });
        let servers = normalize_servers(&entry);

        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].name(), "Servidor 1");
        assert_eq!(servers[0].url(), "");
        assert_eq!(servers[1].name(), "B");
    }

    #[test]
    fn mistyped_field_drops_only_itself() {
        let entry = json!({ "servidores": [{
            "nombre": "A",
            "url": "http://x/stream.m3u8",
            "k1": 123,
            "k2": "abc",
        }, {
            "nombre": 9,
            "url": "http://y/embed",
        }] });
        let servers = normalize_servers(&entry);

        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].name(), "A");
        assert_eq!(servers[0].url(), "http://x/stream.m3u8");
        assert_eq!(servers[0].key_id(), None);
        assert_eq!(servers[0].key(), Some("abc"));
        assert_eq!(servers[1].name(), "Servidor 2");
        assert_eq!(servers[1].url(), "http://y/embed");
    }

    #[test]
    fn half_a_key_pair_is_not_a_content_key() {
        let server = ServerDescriptor::new("A", "u").with_keys(Some("id".into()), None);
        assert_eq!(server.content_key(), None);
        let server = ServerDescriptor::new("A", "u").with_keys(Some("id".into()), Some(String::new()));
        assert_eq!(server.content_key(), None);
    }

    #[test]
    fn resolve_channel_prefers_requested_then_first_key() {
        let catalog =
            Catalog::from_json(r#"{ "zeta": { "url": "z" }, "alpha": { "url": "a" } }"#).unwrap();

        assert_eq!(catalog.resolve_channel(Some("alpha")), Some("alpha"));
        assert_eq!(catalog.resolve_channel(Some("missing")), Some("zeta"));
        assert_eq!(catalog.resolve_channel(None), Some("zeta"));
    }

    #[test]
    fn empty_catalog_resolves_nothing() {
        let catalog = Catalog::from_json("{}").unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.resolve_channel(Some("news")), None);
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(matches!(
            Catalog::from_json("[1, 2]"),
            Err(CatalogError::NotAnObject("array"))
        ));
        assert!(matches!(Catalog::from_json("{"), Err(CatalogError::Json(_))));
    }
}
