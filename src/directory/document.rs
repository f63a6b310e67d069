//! In-memory model of the proxy configuration document.
//!
//! The document is kept as a `serde_json::Value` tree so every field this
//! service does not own survives a rewrite in its original position. Only
//! `inbounds[*].settings.clients[*].id` is ever interpreted.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::directory::error::{DirectoryError, DirectoryResult};

/// A client entry as appended by this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Client {
    pub id: String,
    pub flow: String,
}

impl Client {
    /// New client with the default (empty) flow.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            flow: String::new(),
        }
    }

    fn to_value(&self) -> Value {
        let mut entry = Map::new();
        entry.insert("id".to_string(), Value::String(self.id.clone()));
        entry.insert("flow".to_string(), Value::String(self.flow.clone()));
        Value::Object(entry)
    }
}

/// Summary of one inbound's client list, used by the admin listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboundSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub clients: Vec<String>,
}

/// The parsed proxy configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyDocument {
    root: Value,
}

impl ProxyDocument {
    /// Parse raw bytes. The root must be an object whose `inbounds` is an array.
    pub fn from_slice(bytes: &[u8]) -> DirectoryResult<Self> {
        let root: Value = serde_json::from_slice(bytes)
            .map_err(|e| DirectoryError::MalformedConfig(e.to_string()))?;
        Self::from_value(root)
    }

    /// Wrap an already parsed tree after the same structural checks.
    pub fn from_value(root: Value) -> DirectoryResult<Self> {
        match root.get("inbounds") {
            Some(Value::Array(_)) => Ok(Self { root }),
            Some(_) => Err(DirectoryError::MalformedConfig(
                "`inbounds` is not an array".to_string(),
            )),
            None if root.is_object() => Err(DirectoryError::MalformedConfig(
                "missing `inbounds` field".to_string(),
            )),
            None => Err(DirectoryError::MalformedConfig(
                "document root is not an object".to_string(),
            )),
        }
    }

    /// Pretty JSON with two-space indentation and a trailing newline.
    pub fn to_pretty_bytes(&self) -> DirectoryResult<Vec<u8>> {
        let mut out = serde_json::to_vec_pretty(&self.root).map_err(DirectoryError::Serialize)?;
        out.push(b'\n');
        Ok(out)
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    fn inbounds(&self) -> &[Value] {
        self.root
            .get("inbounds")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn inbounds_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.root.get_mut("inbounds").and_then(Value::as_array_mut)
    }

    /// Number of inbounds that carry a client list.
    pub fn client_list_count(&self) -> usize {
        self.inbounds().iter().filter_map(client_list).count()
    }

    /// Lengths of every client list, in inbound order.
    pub fn client_list_lengths(&self) -> Vec<usize> {
        self.inbounds()
            .iter()
            .filter_map(client_list)
            .map(Vec::len)
            .collect()
    }

    /// True when any client list holds `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.inbounds()
            .iter()
            .filter_map(client_list)
            .any(|clients| clients.iter().any(|c| client_id(c) == Some(id)))
    }

    /// Deduplicated ids across all inbounds, in first-seen order.
    pub fn user_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for clients in self.inbounds().iter().filter_map(client_list) {
            for id in clients.iter().filter_map(client_id) {
                if seen.insert(id) {
                    ids.push(id.to_string());
                }
            }
        }
        ids
    }

    /// Per-inbound view for listing.
    pub fn summaries(&self) -> Vec<InboundSummary> {
        self.inbounds()
            .iter()
            .filter_map(|inbound| {
                let clients = client_list(inbound)?;
                Some(InboundSummary {
                    tag: inbound
                        .get("tag")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    clients: clients
                        .iter()
                        .filter_map(client_id)
                        .map(str::to_string)
                        .collect(),
                })
            })
            .collect()
    }

    /// Append `client` to every existing client list. Returns how many lists changed.
    pub(crate) fn append_everywhere(&mut self, client: &Client) -> usize {
        let entry = client.to_value();
        let mut touched = 0;
        if let Some(inbounds) = self.inbounds_mut() {
            for clients in inbounds.iter_mut().filter_map(client_list_mut) {
                clients.push(entry.clone());
                touched += 1;
            }
        }
        touched
    }

    /// Drop every entry with `id` from every list. Returns how many lists changed.
    pub(crate) fn remove_everywhere(&mut self, id: &str) -> usize {
        let mut touched = 0;
        if let Some(inbounds) = self.inbounds_mut() {
            for clients in inbounds.iter_mut().filter_map(client_list_mut) {
                let before = clients.len();
                clients.retain(|c| client_id(c) != Some(id));
                if clients.len() != before {
                    touched += 1;
                }
            }
        }
        touched
    }
}

fn client_list(inbound: &Value) -> Option<&Vec<Value>> {
    inbound.get("settings")?.get("clients")?.as_array()
}

fn client_list_mut(inbound: &mut Value) -> Option<&mut Vec<Value>> {
    inbound
        .get_mut("settings")?
        .get_mut("clients")?
        .as_array_mut()
}

fn client_id(entry: &Value) -> Option<&str> {
    entry.get("id").and_then(Value::as_str)
}
