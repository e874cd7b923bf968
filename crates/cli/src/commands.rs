//! Command handlers. Each prints its result to stdout; diagnostics go
//! through `tracing` to stderr.

use anyhow::{Context, Result};
use resto_client::context::AppContext;
use resto_core::access::check_access;
use resto_core::auth::{Credentials, RegisterRequest};
use resto_core::error::CoreError;
use resto_core::pagination::PageQuery;
use resto_core::resource::Resource;
use resto_core::types::Identifier;
use resto_core::user::SessionUser;
use validator::Validate;

pub async fn login(ctx: &AppContext, username: String, password: String) -> Result<()> {
    let credentials = Credentials::new(username, password);
    credentials.validate().map_err(CoreError::from)?;

    let session = ctx
        .session
        .login(&credentials)
        .await
        .context("Login failed")?;

    println!("Logged in as {}", describe(session.user.as_ref()));
    Ok(())
}

pub async fn register(
    ctx: &AppContext,
    username: String,
    email: String,
    password: String,
    role_id: &str,
) -> Result<()> {
    let request = RegisterRequest {
        username,
        email,
        password,
        role_id: parse_identifier(role_id),
    };
    request.validate().map_err(CoreError::from)?;

    let session = ctx
        .session
        .register(&request)
        .await
        .context("Registration failed")?;

    println!("Registered and logged in as {}", describe(session.user.as_ref()));
    Ok(())
}

pub fn logout(ctx: &AppContext) {
    ctx.session.logout();
    println!("Logged out");
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
    let session = ctx.session.snapshot();
    match (&session.token, &session.user) {
        (None, None) => println!("Not logged in"),
        (token, user) => {
            if token.is_none() {
                println!("No token stored; cached profile only");
            }
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
    }
    Ok(())
}

pub async fn list(
    ctx: &AppContext,
    resource: Resource,
    page: u32,
    size: u32,
    search: Option<String>,
) -> Result<()> {
    guard(ctx, resource)?;

    let mut query = PageQuery::new(page, size);
    if let Some(term) = search {
        query = query.with_search(term);
    }

    let result = ctx
        .resource(resource)
        .list(&query)
        .await
        .with_context(|| format!("Failed to list {resource}"))?;

    println!("{}", serde_json::to_string_pretty(&result.items)?);
    println!(
        "-- page {}/{} ({} total)",
        result.page + 1,
        result.total_pages.max(1),
        result.total
    );
    Ok(())
}

pub async fn get(ctx: &AppContext, resource: Resource, id: &str) -> Result<()> {
    guard(ctx, resource)?;

    let entry = ctx
        .resource(resource)
        .get(&parse_identifier(id))
        .await
        .with_context(|| format!("Failed to fetch {resource} {id}"))?;

    println!("{}", serde_json::to_string_pretty(&entry)?);
    Ok(())
}

pub async fn delete(ctx: &AppContext, resource: Resource, id: &str) -> Result<()> {
    guard(ctx, resource)?;

    ctx.resource(resource)
        .delete(&parse_identifier(id))
        .await
        .with_context(|| format!("Failed to delete {resource} {id}"))?;

    println!("Deleted {} {id}", resource.entity_name());
    Ok(())
}

/// Refuse locally when the cached role cannot manage `resource`. Public
/// resources (no role restriction) are reachable without logging in. A
/// cached profile without a token counts as logged out.
fn guard(ctx: &AppContext, resource: Resource) -> Result<()> {
    let allowed = resource.allowed_roles();
    if allowed.is_empty() {
        return Ok(());
    }
    let session = ctx.session.snapshot();
    let user = session.token.as_ref().and(session.user.as_ref());
    check_access(user, allowed)
        .into_result()
        .with_context(|| format!("Access to {resource} denied"))
}

/// Numeric ids are sent as numbers, anything else as text.
fn parse_identifier(raw: &str) -> Identifier {
    match raw.trim().parse() {
        Ok(id) => Identifier::Number(id),
        Err(_) => Identifier::Text(raw.trim().to_string()),
    }
}

fn describe(user: Option<&SessionUser>) -> String {
    let Some(user) = user else {
        return "<unknown>".to_string();
    };
    let name = user.username.as_deref().unwrap_or("<unknown>");
    match user.role.as_deref() {
        Some(role) => format!("{name} ({role})"),
        None => name.to_string(),
    }
}
