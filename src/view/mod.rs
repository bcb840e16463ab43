//! Server-side rendering of console pages.

use handlebars::Handlebars;
use serde::Serialize;

use crate::auth::{RootContext, LOGOUT_ROUTE, REFRESH_ROUTE};
use crate::core::types::RedirectUri;

pub mod boundary;
pub mod lists;
pub mod routes;
pub mod table;

use boundary::{ErrorState, RouteBoundary, RouteErrorView, TopLevelErrorView};
use routes::{router_config, OVERVIEW_ROUTE};

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("template does not parse: {0}")]
    Template(#[from] handlebars::TemplateError),
    #[error("page could not be rendered: {0}")]
    Render(#[from] handlebars::RenderError),
}

const PARTIALS: [(&str, &str); 2] = [
    ("table", include_str!("../../templates/table.hbs")),
    ("error_card", include_str!("../../templates/error_card.hbs")),
];

const TEMPLATES: [(&str, &str); 8] = [
    ("layout", include_str!("../../templates/layout.hbs")),
    ("error_page", include_str!("../../templates/error_page.hbs")),
    ("route_error", include_str!("../../templates/route_error.hbs")),
    ("overview", include_str!("../../templates/overview.hbs")),
    ("list", include_str!("../../templates/list.hbs")),
    ("oauth_clients", include_str!("../../templates/oauth_clients.hbs")),
    ("oauth_client", include_str!("../../templates/oauth_client.hbs")),
    ("webhook", include_str!("../../templates/webhook.hbs")),
];

/// Where a page is rendered and for whom.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub title: &'a str,
    pub path: &'a str,
    pub root: &'a RootContext,
}

#[derive(Serialize)]
struct NavItem {
    label: &'static str,
    href: Option<&'static str>,
    active: bool,
}

#[derive(Serialize)]
struct NavGroup {
    label: Option<&'static str>,
    items: Vec<NavItem>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutContext<'a> {
    title: &'a str,
    content: String,
    nav: Vec<NavGroup>,
    home_url: &'static str,
    refresh_url: &'static str,
    logout_url: String,
    scopes: &'a [String],
}

fn navigation(path: &str) -> Vec<NavGroup> {
    router_config()
        .into_iter()
        .map(|group| NavGroup {
            label: group.label,
            items: group
                .children
                .iter()
                .map(|entry| NavItem {
                    label: entry.label,
                    href: entry.href(),
                    active: entry.is_active(path),
                })
                .collect(),
        })
        .collect()
}

pub struct Renderer {
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer").finish()
    }
}

impl Renderer {
    pub fn new() -> Result<Self, ViewError> {
        let mut registry = Handlebars::new();
        for (name, source) in PARTIALS.iter() {
            registry.register_partial(name, *source)?;
        }
        for (name, source) in TEMPLATES.iter() {
            registry.register_template_string(name, *source)?;
        }
        Ok(Self { registry })
    }

    /// Renders `template` with `data` and wraps it in the console layout.
    pub fn page<T: Serialize>(&self, frame: Frame<'_>, template: &str, data: &T) -> Result<String, ViewError> {
        let content = self.registry.render(template, data)?;
        self.layout(frame, content)
    }

    /// A loader failure, shown in place of the page body.
    pub fn route_error(
        &self,
        frame: Frame<'_>,
        boundary: RouteBoundary,
        state: ErrorState,
    ) -> Result<String, ViewError> {
        self.page(frame, "route_error", &RouteErrorView::new(boundary, state))
    }

    /// A failure with no session to render a layout for.
    pub fn error_page(&self, state: ErrorState, origin: &RedirectUri) -> Result<String, ViewError> {
        Ok(self
            .registry
            .render("error_page", &TopLevelErrorView::new(state, origin))?)
    }

    fn layout(&self, frame: Frame<'_>, content: String) -> Result<String, ViewError> {
        let context = LayoutContext {
            title: frame.title,
            content,
            nav: navigation(frame.path),
            home_url: OVERVIEW_ROUTE,
            refresh_url: REFRESH_ROUTE,
            logout_url: frame.root.metas.origin.join(LOGOUT_ROUTE),
            scopes: &frame.root.current_user.scp,
        };
        Ok(self.registry.render("layout", &context)?)
    }
}
