//! Add/remove semantics over the virtual client directory.
//!
//! Every inbound with a client list holds a copy of the same directory, so
//! both operations apply to all of them or to none. The functions are pure:
//! they take a document by reference and hand back a new one.

use serde::Serialize;

use crate::directory::document::{Client, ProxyDocument};
use crate::directory::error::{DirectoryError, DirectoryResult};

/// Which directory operation produced a [`Mutation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Add,
    Remove,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Add => "add",
            MutationKind::Remove => "remove",
        }
    }
}

/// Result of a successful add or remove.
#[derive(Debug, Clone)]
pub struct Mutation {
    pub kind: MutationKind,
    /// The trimmed id the operation applied to.
    pub id: String,
    pub document: ProxyDocument,
    /// Unique ids across all inbounds after the change.
    pub total_users: usize,
    pub all_users: Vec<String>,
    /// Client lists that gained or lost an entry.
    pub affected_inbounds: usize,
}

impl Mutation {
    /// Drop the document once it is persisted; callers only report totals.
    pub fn into_summary(self) -> MutationSummary {
        MutationSummary {
            kind: self.kind,
            id: self.id,
            total_users: self.total_users,
            all_users: self.all_users,
            affected_inbounds: self.affected_inbounds,
        }
    }
}

/// What a committed mutation changed, without the document itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationSummary {
    pub kind: MutationKind,
    pub id: String,
    pub total_users: usize,
    pub all_users: Vec<String>,
    pub affected_inbounds: usize,
}

/// Trim `raw` and reject it when nothing is left.
pub fn normalize_id(raw: &str) -> DirectoryResult<String> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(DirectoryError::InvalidInput(
            "User ID cannot be empty".to_string(),
        ));
    }
    Ok(id.to_string())
}

/// Append `{id, flow: ""}` to every client list.
///
/// Fails with `Conflict` if any list already holds the id, and with
/// `MalformedConfig` if no inbound has a client list to append to.
pub fn add_client(doc: &ProxyDocument, raw_id: &str) -> DirectoryResult<Mutation> {
    let id = normalize_id(raw_id)?;

    if doc.contains(&id) {
        return Err(DirectoryError::Conflict(id));
    }
    if doc.client_list_count() == 0 {
        return Err(DirectoryError::MalformedConfig(
            "no inbound carries a client list".to_string(),
        ));
    }

    let mut next = doc.clone();
    let affected_inbounds = next.append_everywhere(&Client::new(id.as_str()));

    Ok(finish(MutationKind::Add, id, next, affected_inbounds))
}

/// Remove every entry with a matching id from every client list.
///
/// Fails with `NotFound` when no list held the id; the input is never modified.
pub fn remove_client(doc: &ProxyDocument, raw_id: &str) -> DirectoryResult<Mutation> {
    let id = normalize_id(raw_id)?;

    if !doc.contains(&id) {
        return Err(DirectoryError::NotFound(id));
    }

    let mut next = doc.clone();
    let affected_inbounds = next.remove_everywhere(&id);

    Ok(finish(MutationKind::Remove, id, next, affected_inbounds))
}

fn finish(
    kind: MutationKind,
    id: String,
    document: ProxyDocument,
    affected_inbounds: usize,
) -> Mutation {
    let all_users = document.user_ids();
    Mutation {
        kind,
        id,
        total_users: all_users.len(),
        all_users,
        document,
        affected_inbounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn two_inbounds() -> ProxyDocument {
        ProxyDocument::from_value(json!({
            "log": {"loglevel": "warning"},
            "inbounds": [
                {"tag": "a", "settings": {"clients": [{"id": "a", "flow": ""}]}},
                {"tag": "b", "settings": {"clients": [{"id": "a", "flow": ""}, {"id": "b", "flow": ""}]}},
                {"tag": "dns", "protocol": "dokodemo-door", "settings": {"network": "udp"}}
            ]
        }))
        .unwrap()
    }

    fn clients(doc: &ProxyDocument, inbound: usize) -> Vec<Value> {
        doc.as_value()["inbounds"][inbound]["settings"]["clients"]
            .as_array()
            .cloned()
            .unwrap_or_default()
    }

    #[test]
    fn test_add_appends_to_every_list() {
        let doc = two_inbounds();
        let m = add_client(&doc, "c").unwrap();

        assert_eq!(m.total_users, 3);
        assert_eq!(m.all_users, vec!["a", "b", "c"]);
        assert_eq!(m.affected_inbounds, 2);
        assert_eq!(clients(&m.document, 0).last(), Some(&json!({"id": "c", "flow": ""})));
        assert_eq!(clients(&m.document, 1).last(), Some(&json!({"id": "c", "flow": ""})));
        // inbound without a client list is not given one
        assert!(m.document.as_value()["inbounds"][2]["settings"].get("clients").is_none());
        // input untouched
        assert!(!doc.contains("c"));
    }

    #[test]
    fn test_add_grows_each_list_by_one() {
        let doc = two_inbounds();
        let before = doc.client_list_lengths();
        let m = add_client(&doc, "zed").unwrap();
        let after = m.document.client_list_lengths();
        for (b, a) in before.iter().zip(after.iter()) {
            assert_eq!(b + 1, *a);
        }
    }

    #[test]
    fn test_add_trims_id() {
        let m = add_client(&two_inbounds(), "  carol \n").unwrap();
        assert_eq!(m.id, "carol");
        assert!(m.document.contains("carol"));
    }

    #[test]
    fn test_add_conflict_checks_all_inbounds() {
        // "b" only lives in the second inbound
        let err = add_client(&two_inbounds(), "b").unwrap_err();
        assert!(matches!(err, DirectoryError::Conflict(id) if id == "b"));
    }

    #[test]
    fn test_add_twice_conflicts() {
        let doc = two_inbounds();
        let first = add_client(&doc, "dave").unwrap();
        let err = add_client(&first.document, "dave").unwrap_err();
        assert!(matches!(err, DirectoryError::Conflict(_)));
    }

    #[test]
    fn test_blank_id_rejected() {
        let doc = two_inbounds();
        assert!(matches!(add_client(&doc, "   "), Err(DirectoryError::InvalidInput(_))));
        assert!(matches!(remove_client(&doc, ""), Err(DirectoryError::InvalidInput(_))));
    }

    #[test]
    fn test_add_without_client_lists() {
        let doc = ProxyDocument::from_value(json!({"inbounds": [{"protocol": "socks"}]})).unwrap();
        assert!(matches!(add_client(&doc, "x"), Err(DirectoryError::MalformedConfig(_))));
    }

    #[test]
    fn test_remove_from_every_list() {
        let m = remove_client(&two_inbounds(), "a").unwrap();
        assert_eq!(m.affected_inbounds, 2);
        assert_eq!(m.total_users, 1);
        assert_eq!(m.all_users, vec!["b"]);
        assert!(clients(&m.document, 0).is_empty());
        assert_eq!(clients(&m.document, 1), vec![json!({"id": "b", "flow": ""})]);
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let err = remove_client(&two_inbounds(), "ghost").unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound(id) if id == "ghost"));
    }

    #[test]
    fn test_summary_keeps_totals() {
        let summary = remove_client(&two_inbounds(), "a").unwrap().into_summary();
        assert_eq!(summary.kind, MutationKind::Remove);
        assert_eq!(summary.id, "a");
        assert_eq!(summary.affected_inbounds, 2);
        assert_eq!(summary.all_users, vec!["b"]);
    }

    #[test]
    fn test_add_then_remove_restores_membership() {
        let doc = two_inbounds();
        let added = add_client(&doc, "eve").unwrap();
        let removed = remove_client(&added.document, "eve").unwrap();
        assert_eq!(removed.document, doc);
    }

    #[test]
    fn test_remove_keeps_extra_client_fields() {
        let doc = ProxyDocument::from_value(json!({"inbounds": [
            {"settings": {"clients": [
                {"id": "a", "email": "a@example.com", "flow": "xtls-rprx-vision"},
                {"id": "b", "flow": ""}
            ]}}
        ]}))
        .unwrap();
        let m = remove_client(&doc, "b").unwrap();
        assert_eq!(
            clients(&m.document, 0),
            vec![json!({"id": "a", "email": "a@example.com", "flow": "xtls-rprx-vision"})]
        );
    }
}
