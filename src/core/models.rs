use serde::{Deserialize, Serialize};

/// Cursor paginated envelope returned by the ledger and webhook services.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

/// Anything a list can be updated in place by.
pub trait Identified {
    fn id(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub provider: String,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthClient {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    #[serde(default)]
    pub post_logout_redirect_uris: Vec<String>,
    #[serde(default)]
    pub secrets: Vec<OAuthSecret>,
}

impl Identified for OAuthClient {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthSecret {
    pub id: String,
    #[serde(default)]
    pub last_digits: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOAuthClient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    pub endpoint: String,
    #[serde(default)]
    pub event_types: Vec<String>,
    #[serde(default)]
    pub active: bool,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Identified for Webhook {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerLogType {
    NewTransaction,
    SetMetadata,
    RevertedTransaction,
    DeleteMetadata,
    #[serde(other)]
    Unknown,
}

impl LedgerLogType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NewTransaction => "NEW_TRANSACTION",
            Self::SetMetadata => "SET_METADATA",
            Self::RevertedTransaction => "REVERTED_TRANSACTION",
            Self::DeleteMetadata => "DELETE_METADATA",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// One entry of a ledger's append-only log. The payload shape depends on the
/// log type so it stays untyped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerLog {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: LedgerLogType,
    pub date: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl LedgerLog {
    /// Transaction id carried by transaction logs, if any.
    pub fn transaction_id(&self) -> Option<u64> {
        self.data
            .get("txid")
            .or_else(|| self.data.get("id"))
            .and_then(serde_json::Value::as_u64)
    }
}

/// Loaded list the page mutates in place after a successful mutation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceList<T> {
    items: Vec<T>,
}

impl<T: Identified> ResourceList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Applies `f` to the item whose id matches. Returns whether one did.
    pub fn update_by_id(&mut self, id: &str, f: impl FnOnce(&mut T)) -> bool {
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                f(item);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn webhook(id: &str, active: bool) -> Webhook {
        Webhook {
            id: id.to_string(),
            endpoint: format!("https://hooks.example.com/{}", id),
            event_types: vec!["ledger.committed_transactions".to_string()],
            active,
            created_at: "2022-07-20T09:00:00Z".to_string(),
            updated_at: None,
        }
    }

    #[test]
    fn update_by_id_touches_only_the_matching_item() {
        let mut list = ResourceList::new(vec![webhook("a", true), webhook("b", false)]);
        assert!(list.update_by_id("b", |w| w.active = !w.active));
        assert!(list.items()[0].active);
        assert!(list.items()[1].active);
        assert!(!list.update_by_id("missing", |w| w.active = false));
    }

    #[test]
    fn cursor_defaults_missing_metadata() {
        let cursor: Cursor<Webhook> = serde_json::from_value(json!({
            "data": [{
                "id": "a",
                "endpoint": "https://x",
                "eventTypes": [],
                "active": true,
                "createdAt": "2022-07-20T09:00:00Z"
            }]
        }))
        .unwrap();
        assert_eq!(cursor.data.len(), 1);
        assert!(!cursor.has_more);
        assert!(cursor.next.is_none());
    }

    #[test]
    fn unknown_log_types_still_parse() {
        let log: LedgerLog = serde_json::from_value(json!({
            "id": 3,
            "type": "SOMETHING_NEW",
            "date": "2022-07-20T09:00:00Z",
            "data": {"txid": 12}
        }))
        .unwrap();
        assert_eq!(log.kind, LedgerLogType::Unknown);
        assert_eq!(log.transaction_id(), Some(12));
    }
}
