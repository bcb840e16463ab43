use std::sync::Arc;

use serde::{Deserialize, Serialize};
use warp::Filter;

use crate::api::{ApiError, Unwrap};
use crate::core::models::{CreateOAuthClient, OAuthClient, OAuthSecret};
use crate::http::encoding::{self, reply, Page};
use crate::http::Context;
use crate::util::url::join_segments;
use crate::view::boundary::RouteBoundary;
use crate::view::lists::{oauth_client_columns, OAuthClientRows, OAUTH_CLIENTS_TABLE};
use crate::view::routes::OAUTH_CLIENT_CREATE_ROUTE;
use crate::view::table::{Table, TableView};

pub const OAUTH_CLIENTS_BOUNDARY: RouteBoundary = RouteBoundary::new("oauth-clients");
pub const OAUTH_CLIENT_BOUNDARY: RouteBoundary = RouteBoundary::titled("oauth-client", "OAuth client").with_action();

const FORM_LIMIT: u64 = 16 * 1024;

/// Create form as submitted. Both fields may be missing.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CreateForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Serialize)]
pub struct FormErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'static str>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

impl CreateForm {
    pub fn validate(&self) -> Result<CreateOAuthClient, FormErrors> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormErrors {
                name: Some("Name is required"),
            });
        }
        let description = self.description.trim();
        Ok(CreateOAuthClient {
            name: name.to_string(),
            description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
        })
    }
}

#[derive(Serialize)]
struct ClientsPage<'a> {
    table: TableView,
    form: &'a CreateForm,
    errors: &'a FormErrors,
}

#[derive(Serialize)]
struct ClientPage<'a> {
    client: &'a OAuthClient,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret: Option<&'a str>,
}

async fn list(page: &Page, ctx: &Context) -> Result<Option<Vec<OAuthClient>>, warp::Rejection> {
    let url = format!("{}/clients", ctx.console.settings().api.auth);
    page.load(
        OAUTH_CLIENTS_BOUNDARY,
        page.api(ctx).get_resource::<Vec<OAuthClient>>(&url, Unwrap::Data).await,
    )
}

fn render_list(
    page: &Page,
    ctx: &Context,
    clients: Option<Vec<OAuthClient>>,
    form: &CreateForm,
    errors: &FormErrors,
) -> Result<warp::reply::Response, warp::Rejection> {
    let table = Table::new(OAUTH_CLIENTS_TABLE, oauth_client_columns(), clients.as_deref())
        .render(&OAuthClientRows);
    let status = if errors.is_empty() { 200 } else { 422 };
    reply::render(
        ctx.renderer.page(
            page.frame("OAuth clients"),
            "oauth_clients",
            &ClientsPage { table, form, errors },
        ),
        status,
    )
}

/// Creates the client, then its first secret. The secret is only ever shown
/// in clear in this response.
async fn create(page: &Page, ctx: &Context, request: &CreateOAuthClient) -> Result<(OAuthClient, Option<String>), ApiError> {
    let api = page.api(ctx);
    let base = &ctx.console.settings().api.auth;

    let client: OAuthClient = api
        .post_resource(&format!("{}/clients", base), request, Unwrap::Data)
        .await?
        .ok_or(ApiError::Status(502))?;

    let secret: Option<OAuthSecret> = api
        .post_resource(
            join_segments(base, ["clients", client.id.as_str(), "secrets"])?.as_str(),
            &serde_json::json!({}),
            Unwrap::Data,
        )
        .await?;

    Ok((client, secret.and_then(|s| s.clear)))
}

pub fn oauth_clients_endpoint(
    ctx: Arc<Context>,
) -> impl warp::Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let with_context = encoding::with_context(ctx.clone());

    let index = warp::path::end()
        .and(warp::get())
        .and(encoding::page(ctx.clone()))
        .and(with_context.clone())
        .and_then(|page: Page, ctx: Arc<Context>| async move {
            let clients = list(&page, &ctx).await?;
            render_list(&page, &ctx, clients, &CreateForm::default(), &FormErrors::default())
        });

    let submit = warp::path::end()
        .and(warp::post())
        .and(encoding::form_page(ctx.clone(), OAUTH_CLIENT_CREATE_ROUTE))
        .and(with_context.clone())
        .and(warp::body::content_length_limit(FORM_LIMIT))
        .and(warp::body::form::<CreateForm>())
        .and_then(|page: Page, ctx: Arc<Context>, form: CreateForm| async move {
            let request = match form.validate() {
                Ok(request) => request,
                Err(errors) => {
                    let clients = list(&page, &ctx).await?;
                    return render_list(&page, &ctx, clients, &form, &errors);
                }
            };

            let (client, secret) = page.load(OAUTH_CLIENTS_BOUNDARY, create(&page, &ctx, &request).await)?;
            let view = ClientPage {
                client: &client,
                secret: secret.as_deref(),
            };
            reply::render(ctx.renderer.page(page.frame(&client.name), "oauth_client", &view), 201)
        });

    let show = warp::path!(String)
        .and(warp::get())
        .and(encoding::page(ctx))
        .and(with_context)
        .and_then(|id: String, page: Page, ctx: Arc<Context>| async move {
            let url = page.load(
                OAUTH_CLIENT_BOUNDARY,
                join_segments(&ctx.console.settings().api.auth, ["clients", id.as_str()])
                    .map_err(ApiError::from),
            )?;
            let client = page
                .load(
                    OAUTH_CLIENT_BOUNDARY,
                    page.api(&ctx).get_resource::<OAuthClient>(url.as_str(), Unwrap::Data).await,
                )?
                .ok_or_else(|| page.reject(OAUTH_CLIENT_BOUNDARY, ApiError::Status(404)))?;

            let view = ClientPage {
                client: &client,
                secret: None,
            };
            reply::render(ctx.renderer.page(page.frame(&client.name), "oauth_client", &view), 200)
        });

    warp::path("oauth-clients").and(index.or(submit).or(show))
}
