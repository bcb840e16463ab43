//! Columns and row renderers of each resource list.

use super::routes::{
    get_ledger_transaction_details_route, get_route, OAUTH_CLIENT_ROUTE, WEBHOOK_ROUTE,
    WEBHOOK_TOGGLE_ROUTE,
};
use super::table::{Cell, Chip, ChipColor, Column, RowAction, RowDescriptor, RowRenderer};
use crate::core::models::{Connector, LedgerLog, LedgerLogType, OAuthClient, Webhook};
use crate::core::types::LedgerId;

pub const CONNECTORS_TABLE: &str = "connectors-list";
pub const OAUTH_CLIENTS_TABLE: &str = "oauth-clients-list";
pub const WEBHOOKS_TABLE: &str = "webhooks-list";
pub const LEDGER_LOGS_TABLE: &str = "ledger-logs-list";

pub fn connector_columns() -> Vec<Column> {
    vec![
        Column::with_width("provider", "Name", 20),
        Column::with_width("disabled", "Status", 80),
    ]
}

/// The payments service does not report connector status yet, so every
/// connector shows as active.
pub struct ConnectorRows;

impl RowRenderer<Connector> for ConnectorRows {
    fn render_item(&self, connector: &Connector, _: usize) -> RowDescriptor {
        RowDescriptor::new(vec![
            Cell::provider(&connector.provider),
            Cell::chip("Active", ChipColor::Green),
        ])
    }
}

pub fn oauth_client_columns() -> Vec<Column> {
    vec![
        Column::new("name", "Name"),
        Column::new("public", "Type"),
        Column::new("description", "Description"),
    ]
}

pub struct OAuthClientRows;

impl RowRenderer<OAuthClient> for OAuthClientRows {
    fn render_item(&self, client: &OAuthClient, _: usize) -> RowDescriptor {
        let kind = if client.public {
            Cell::chip("Public", ChipColor::Blue)
        } else {
            Cell::chip("Private", ChipColor::Violet)
        };
        RowDescriptor::new(vec![
            Cell::text(client.name.clone()),
            kind,
            Cell::text(client.description.clone().unwrap_or_default()),
        ])
        .with_action(RowAction::Show {
            href: get_route(OAUTH_CLIENT_ROUTE, Some(&client.id)),
        })
    }
}

pub fn webhook_columns() -> Vec<Column> {
    vec![
        Column::with_width("endpoint", "Endpoint", 15),
        Column::with_width("eventTypes", "Event types", 60),
        Column::with_width("active", "Status", 10),
        Column::with_width("createdAt", "Created at", 15),
    ]
}

pub struct WebhookRows;

impl RowRenderer<Webhook> for WebhookRows {
    fn render_item(&self, webhook: &Webhook, _: usize) -> RowDescriptor {
        let status = if webhook.active {
            Cell::chip("Active", ChipColor::Green)
        } else {
            Cell::chip("Inactive", ChipColor::Red)
        };
        let label = if webhook.active { "Deactivate" } else { "Activate" };

        RowDescriptor::new(vec![
            Cell::text(webhook.endpoint.clone()),
            Cell::Chips {
                chips: webhook
                    .event_types
                    .iter()
                    .map(|event| Chip::new(event.clone(), ChipColor::Yellow))
                    .collect(),
            },
            status,
            Cell::Date {
                timestamp: webhook.created_at.clone(),
            },
        ])
        .with_action(RowAction::Toggle {
            href: get_route(WEBHOOK_TOGGLE_ROUTE, Some(&webhook.id)),
            label,
            active: webhook.active,
        })
        .with_action(RowAction::Show {
            href: get_route(WEBHOOK_ROUTE, Some(&webhook.id)),
        })
    }
}

pub fn ledger_log_columns() -> Vec<Column> {
    vec![
        Column::new("id", "Id"),
        Column::new("type", "Type"),
        Column::new("transaction", "Transaction"),
        Column::new("hash", "Hash"),
        Column::new("date", "Date"),
    ]
}

pub struct LedgerLogRows<'a> {
    pub ledger: &'a LedgerId,
}

fn log_type_color(kind: LedgerLogType) -> ChipColor {
    match kind {
        LedgerLogType::NewTransaction => ChipColor::Blue,
        LedgerLogType::SetMetadata => ChipColor::Violet,
        LedgerLogType::RevertedTransaction => ChipColor::Red,
        LedgerLogType::DeleteMetadata => ChipColor::Yellow,
        LedgerLogType::Unknown => ChipColor::Default,
    }
}

impl RowRenderer<LedgerLog> for LedgerLogRows<'_> {
    fn render_item(&self, log: &LedgerLog, _: usize) -> RowDescriptor {
        let transaction = match log.transaction_id() {
            Some(id) => {
                let id = id.to_string();
                Cell::Link {
                    href: get_ledger_transaction_details_route(&id, &self.ledger.0),
                    value: id,
                }
            }
            None => Cell::text(""),
        };

        RowDescriptor::new(vec![
            Cell::text(log.id.to_string()),
            Cell::chip(log.kind.label(), log_type_color(log.kind)),
            transaction,
            Cell::text(log.hash.clone()),
            Cell::Date {
                timestamp: log.date.clone(),
            },
        ])
    }
}
