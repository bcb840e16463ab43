//! Generic list rendering: every resource page is a `Table` of rows built by a
//! per-resource `RowRenderer`.

use serde::Serialize;

use crate::core::models::Cursor;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u8>,
}

impl Column {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            width: None,
        }
    }

    pub const fn with_width(key: &'static str, label: &'static str, width: u8) -> Self {
        Self {
            key,
            label,
            width: Some(width),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChipColor {
    Default,
    Green,
    Red,
    Blue,
    Yellow,
    Violet,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chip {
    pub label: String,
    pub color: ChipColor,
}

impl Chip {
    pub fn new(label: impl Into<String>, color: ChipColor) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Cell {
    Text { value: String },
    Link { value: String, href: String },
    Chip { chip: Chip },
    Chips { chips: Vec<Chip> },
    Provider { name: String, label: String },
    Date { timestamp: String },
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    pub fn chip(label: impl Into<String>, color: ChipColor) -> Self {
        Self::Chip {
            chip: Chip::new(label, color),
        }
    }

    /// A payment provider, labelled "Stripe" for `STRIPE`.
    pub fn provider(name: &str) -> Self {
        let label = name
            .split(' ')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_string() + &chars.as_str().to_lowercase(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        Self::Provider {
            name: name.to_string(),
            label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RowAction {
    /// Navigate to the item's detail page.
    Show { href: String },
    /// Mutation posted as a form.
    Toggle {
        href: String,
        label: &'static str,
        active: bool,
    },
}

/// One rendered row: the cells in column order, then trailing actions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowDescriptor {
    pub keys: Vec<Cell>,
    pub actions: Vec<RowAction>,
}

impl RowDescriptor {
    pub fn new(keys: Vec<Cell>) -> Self {
        Self {
            keys,
            actions: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: RowAction) -> Self {
        self.actions.push(action);
        self
    }
}

pub trait RowRenderer<T> {
    fn render_item(&self, item: &T, index: usize) -> RowDescriptor;
}

impl<T, F> RowRenderer<T> for F
where
    F: Fn(&T, usize) -> RowDescriptor,
{
    fn render_item(&self, item: &T, index: usize) -> RowDescriptor {
        self(item, index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Pagination {
    Disabled,
    Cursor {
        previous: Option<String>,
        next: Option<String>,
    },
}

#[derive(Serialize)]
struct PageParams<'a> {
    cursor: &'a str,
    #[serde(rename = "pageSize", skip_serializing_if = "Option::is_none")]
    page_size: Option<u64>,
}

impl Pagination {
    /// Links to the neighbouring pages of `cursor`, served from `path`.
    pub fn from_cursor<T>(cursor: &Cursor<T>, path: &str) -> Self {
        let link = |token: &Option<String>| {
            token.as_deref().and_then(|token| {
                let params = PageParams {
                    cursor: token,
                    page_size: cursor.page_size,
                };
                serde_urlencoded::to_string(params)
                    .ok()
                    .map(|qs| format!("{}?{}", path, qs))
            })
        };
        Self::Cursor {
            previous: link(&cursor.previous),
            next: link(&cursor.next),
        }
    }
}

/// A list page before rendering.
pub struct Table<'a, T> {
    id: &'static str,
    columns: Vec<Column>,
    items: &'a [T],
    pagination: Pagination,
}

/// What the table template consumes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub id: &'static str,
    pub columns: Vec<Column>,
    pub rows: Vec<RowDescriptor>,
    pub has_actions: bool,
    pub pagination: Pagination,
}

impl<'a, T> Table<'a, T> {
    /// A missing collection renders like an empty one.
    pub fn new(id: &'static str, columns: Vec<Column>, items: Option<&'a [T]>) -> Self {
        Self {
            id,
            columns,
            items: items.unwrap_or(&[]),
            pagination: Pagination::Disabled,
        }
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn render<R>(self, renderer: &R) -> TableView
    where
        R: RowRenderer<T> + ?Sized,
    {
        let rows: Vec<RowDescriptor> = self
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| renderer.render_item(item, index))
            .collect();

        TableView {
            id: self.id,
            has_actions: rows.iter().any(|r| !r.actions.is_empty()),
            columns: self.columns,
            rows,
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<Column> {
        vec![Column::new("name", "Name")]
    }

    fn by_name(item: &String, _: usize) -> RowDescriptor {
        RowDescriptor::new(vec![Cell::text(item.clone())])
    }

    #[test]
    fn one_row_per_item_in_order() {
        let items = vec!["a".to_string(), "b".to_string()];
        let view = Table::new("names", columns(), Some(items.as_slice())).render(&by_name);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[1].keys, vec![Cell::text("b")]);
        assert!(!view.has_actions);
    }

    #[test]
    fn missing_and_empty_collections_render_no_rows() {
        let none: Table<String> = Table::new("names", columns(), None);
        assert!(none.render(&by_name).rows.is_empty());

        let empty: Vec<String> = Vec::new();
        assert!(Table::new("names", columns(), Some(empty.as_slice()))
            .render(&by_name)
            .rows
            .is_empty());
    }

    #[test]
    fn cursor_pagination_links_neighbouring_pages() {
        let cursor: Cursor<u32> = Cursor {
            data: vec![],
            has_more: true,
            page_size: Some(15),
            next: Some("n3xt".to_string()),
            previous: None,
        };
        assert_eq!(
            Pagination::from_cursor(&cursor, "/ledgers/main/logs"),
            Pagination::Cursor {
                previous: None,
                next: Some("/ledgers/main/logs?cursor=n3xt&pageSize=15".to_string()),
            }
        );
    }

    #[test]
    fn provider_labels_keep_only_leading_capitals() {
        let label = |name: &str| match Cell::provider(name) {
            Cell::Provider { label, .. } => label,
            _ => unreachable!(),
        };
        assert_eq!(label("STRIPE"), "Stripe");
        assert_eq!(label("CURRENCY CLOUD"), "Currency Cloud");
        assert_eq!(label(""), "");
    }

    #[test]
    fn cells_serialize_with_their_kind() {
        let json = serde_json::to_value(Cell::chip("Active", ChipColor::Green)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "chip", "chip": {"label": "Active", "color": "green"}})
        );
    }
}
