//! Page paths and the sidebar navigation.

use serde::Serialize;

pub const ROOT_ROUTE: &str = "/";
pub const OVERVIEW_ROUTE: &str = "/overview";
pub const ACCOUNT_ROUTE: &str = "/ledgers/:slug/accounts/:id";
pub const TRANSACTION_ROUTE: &str = "/ledgers/:slug/transactions/:id";
pub const PAYMENTS_ROUTE: &str = "/payments";
pub const PAYMENT_ROUTE: &str = "/payments/:id";
pub const OAUTH_CLIENTS_ROUTE: &str = "/connectors/oauth-clients";
pub const OAUTH_CLIENT_CREATE_ROUTE: &str = "/oauth-clients";
pub const OAUTH_CLIENT_ROUTE: &str = "/oauth-clients/:id";
pub const WEBHOOKS_ROUTE: &str = "/connectors/webhooks";
pub const WEBHOOK_ROUTE: &str = "/webhooks/:id";
pub const WEBHOOK_TOGGLE_ROUTE: &str = "/connectors/webhooks/:id/toggle";
pub const APPS_ROUTE: &str = "/connectors/apps";
pub const APP_ROUTE: &str = "/apps/:name";
pub const ACCOUNTS_ROUTE: &str = "/accounts";
pub const TRANSACTIONS_ROUTE: &str = "/transactions";
pub const CONNECTORS_ROUTE: &str = APPS_ROUTE;
pub const LEDGERS_ROUTE: &str = "/ledgers";
pub const LEDGERS_LOGS_ROUTE: &str = "/ledgers/:id/logs";
pub const LEDGER_ROUTE: &str = "/ledgers/:id";

/// Length of the `:name` placeholder starting at `s`, if `s` starts with one.
fn placeholder_len(s: &str) -> Option<usize> {
    let rest = s.strip_prefix(':')?;
    let name = rest
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map_or(rest.len(), |(i, _)| i);
    if name == 0 {
        None
    } else {
        Some(name + 1)
    }
}

/// Replaces the first `:param` of `template` with `id`. Without an id the
/// template comes back unchanged.
pub fn get_route(template: &str, id: Option<&str>) -> String {
    let id = match id {
        Some(id) => id,
        None => return template.to_string(),
    };

    for (start, _) in template.match_indices(':') {
        if let Some(len) = placeholder_len(&template[start..]) {
            return format!("{}{}{}", &template[..start], id, &template[start + len..]);
        }
    }
    template.to_string()
}

fn get_ledger_details(route: &str, id: &str, current_ledger: &str) -> String {
    get_route(&route.replacen(":slug", current_ledger, 1), Some(id))
}

pub fn get_ledger_account_details_route(id: &str, current_ledger: &str) -> String {
    get_ledger_details(ACCOUNT_ROUTE, id, current_ledger)
}

pub fn get_ledger_transaction_details_route(id: &str, current_ledger: &str) -> String {
    get_ledger_details(TRANSACTION_ROUTE, id, current_ledger)
}

/// Whether a concrete request path is an instance of a route template.
pub fn matches_route(template: &str, path: &str) -> bool {
    let template: Vec<&str> = template.trim_end_matches('/').split('/').collect();
    let path: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    template.len() == path.len()
        && template
            .iter()
            .zip(path.iter())
            .all(|(t, p)| t == p || (placeholder_len(t) == Some(t.len()) && !p.is_empty()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouterConfig {
    pub id: &'static str,
    pub label: &'static str,
    pub paths: Vec<&'static str>,
    /// Whether the console serves the entry's own page. Unserved entries are
    /// listed without a link.
    pub served: bool,
}

impl RouterConfig {
    /// Where the sidebar entry links to.
    pub fn href(&self) -> Option<&'static str> {
        if self.served {
            Some(self.paths.first().copied().unwrap_or(ROOT_ROUTE))
        } else {
            None
        }
    }

    pub fn is_active(&self, path: &str) -> bool {
        self.paths.iter().any(|t| matches_route(t, path))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouterGroup {
    pub label: Option<&'static str>,
    pub children: Vec<RouterConfig>,
}

pub fn overview() -> RouterConfig {
    RouterConfig {
        id: "overview",
        label: "Overview",
        paths: vec![OVERVIEW_ROUTE, ROOT_ROUTE],
        served: true,
    }
}

pub fn payments() -> RouterConfig {
    RouterConfig {
        id: "payments",
        label: "Payments",
        paths: vec![PAYMENTS_ROUTE, PAYMENT_ROUTE],
        served: false,
    }
}

pub fn accounts() -> RouterConfig {
    RouterConfig {
        id: "accounts",
        label: "Accounts",
        paths: vec![ACCOUNTS_ROUTE, ACCOUNT_ROUTE],
        served: false,
    }
}

pub fn ledgers() -> RouterConfig {
    RouterConfig {
        id: "ledgers",
        label: "Ledgers",
        paths: vec![LEDGERS_ROUTE, LEDGER_ROUTE, LEDGERS_LOGS_ROUTE],
        served: false,
    }
}

pub fn transactions() -> RouterConfig {
    RouterConfig {
        id: "transactions",
        label: "Transactions",
        paths: vec![TRANSACTIONS_ROUTE, TRANSACTION_ROUTE],
        served: false,
    }
}

pub fn apps() -> RouterConfig {
    RouterConfig {
        id: "apps",
        label: "Apps",
        paths: vec![APPS_ROUTE, APP_ROUTE],
        served: true,
    }
}

pub fn oauth_clients() -> RouterConfig {
    RouterConfig {
        id: "oAuthClient",
        label: "OAuth clients",
        paths: vec![OAUTH_CLIENTS_ROUTE, OAUTH_CLIENT_CREATE_ROUTE, OAUTH_CLIENT_ROUTE],
        served: true,
    }
}

pub fn webhooks() -> RouterConfig {
    RouterConfig {
        id: "webhooks",
        label: "Webhooks",
        paths: vec![WEBHOOKS_ROUTE, WEBHOOK_ROUTE],
        served: true,
    }
}

pub fn router_config() -> Vec<RouterGroup> {
    vec![
        RouterGroup {
            label: None,
            children: vec![overview()],
        },
        RouterGroup {
            label: Some("Ledgers"),
            children: vec![ledgers(), transactions(), accounts()],
        },
        RouterGroup {
            label: Some("Payments"),
            children: vec![payments()],
        },
        RouterGroup {
            label: Some("Configuration"),
            children: vec![apps(), oauth_clients(), webhooks()],
        },
    ]
}
