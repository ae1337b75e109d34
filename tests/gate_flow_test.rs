// ABOUTME: End-to-end tests for hostname rewriting plus the access gate
// ABOUTME: Subdomain requests land on tenant-scoped pages with correct redirects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MedMap

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use medmap_server::routes;
use std::sync::Arc;
use tower::ServiceExt;

use medmap_server::resources::ServerResources;

async fn app() -> (Router, Arc<ServerResources>) {
    let resources = common::create_test_resources().await;
    (routes::router(resources.clone()), resources)
}

fn get(uri: &str, host: Option<&str>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(host) = host {
        builder = builder.header(header::HOST, host);
    }
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

async fn admin_token(resources: &Arc<ServerResources>, email: &str) -> String {
    let user = resources
        .database
        .get_user_by_email(email)
        .await
        .unwrap()
        .unwrap();
    resources.auth_manager.generate_token(&user).unwrap()
}

async fn root_token(resources: &Arc<ServerResources>) -> String {
    let root = medmap_server::services::accounts::register_root(
        &resources.database,
        medmap_server::services::accounts::RegisterRootInput {
            name: Some("Root".into()),
            email: Some("root@medmap.test".into()),
            password: Some(common::TEST_PASSWORD.to_owned()),
        },
        Some(common::TEST_SETUP_KEY),
        Some(common::TEST_SETUP_KEY),
    )
    .await
    .unwrap();
    resources.auth_manager.generate_token(&root).unwrap()
}

#[tokio::test]
async fn subdomain_root_path_lands_on_dashboard_then_login_redirect() {
    let (app, resources) = app().await;
    common::seed_tenant(
        &resources.database,
        "Acme Saúde",
        "acme",
        "11.111.111/0001-11",
        "a@x.com",
    )
    .await;

    // Unauthenticated: / on the subdomain rewrites to /acme/dashboard and
    // the gate bounces to the tenant login.
    let response = app
        .oneshot(get("/", Some("acme.medmap.test"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/acme/login");
}

#[tokio::test]
async fn login_form_renders_with_tenant_branding() {
    let (app, resources) = app().await;
    common::seed_tenant(
        &resources.database,
        "Acme Saúde",
        "acme",
        "11.111.111/0001-11",
        "a@x.com",
    )
    .await;

    let response = app
        .oneshot(get("/login", Some("acme.medmap.test"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["page"], "login");
    assert_eq!(body["tenant"]["slug"], "acme");
}

#[tokio::test]
async fn tenant_admin_reaches_own_dashboard() {
    let (app, resources) = app().await;
    common::seed_tenant(
        &resources.database,
        "Acme Saúde",
        "acme",
        "11.111.111/0001-11",
        "a@x.com",
    )
    .await;
    let token = admin_token(&resources, "a@x.com").await;

    let response = app
        .oneshot(get("/", Some("acme.medmap.test"), Some(token.as_str())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["page"], "dashboard");
    assert_eq!(body["tenant"]["slug"], "acme");
}

#[tokio::test]
async fn tenant_admin_on_foreign_tenant_gets_unauthorized_redirect() {
    let (app, resources) = app().await;
    common::seed_tenant(
        &resources.database,
        "Acme Saúde",
        "acme",
        "11.111.111/0001-11",
        "a@x.com",
    )
    .await;
    common::seed_tenant(
        &resources.database,
        "Outra Saúde",
        "other",
        "22.222.222/0001-22",
        "b@x.com",
    )
    .await;
    let token = admin_token(&resources, "a@x.com").await;

    // Editing the slug segment must not grant access to another tenant.
    let response = app
        .oneshot(get("/other/dashboard", None, Some(token.as_str())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/other/login?error=unauthorized");
}

#[tokio::test]
async fn authenticated_admin_on_login_page_goes_to_dashboard() {
    let (app, resources) = app().await;
    common::seed_tenant(
        &resources.database,
        "Acme Saúde",
        "acme",
        "11.111.111/0001-11",
        "a@x.com",
    )
    .await;
    let token = admin_token(&resources, "a@x.com").await;

    let response = app
        .oneshot(get("/acme/login", None, Some(token.as_str())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/acme/dashboard");
}

#[tokio::test]
async fn root_bypasses_tenant_scoping_but_not_its_login_form() {
    let (app, resources) = app().await;
    common::seed_tenant(
        &resources.database,
        "Acme Saúde",
        "acme",
        "11.111.111/0001-11",
        "a@x.com",
    )
    .await;
    let token = root_token(&resources).await;

    let dashboard = app
        .clone()
        .oneshot(get("/acme/dashboard", None, Some(token.as_str())))
        .await
        .unwrap();
    assert_eq!(dashboard.status(), StatusCode::OK);

    // A ROOT on a tenant login form is sent to the admin area instead of
    // looping through tenant login.
    let login = app
        .clone()
        .oneshot(get("/acme/login", None, Some(token.as_str())))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&login), "/admin");
}

#[tokio::test]
async fn admin_area_is_root_only() {
    let (app, resources) = app().await;
    common::seed_tenant(
        &resources.database,
        "Acme Saúde",
        "acme",
        "11.111.111/0001-11",
        "a@x.com",
    )
    .await;

    let anonymous = app.clone().oneshot(get("/admin", None, None)).await.unwrap();
    assert_eq!(anonymous.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&anonymous), "/login");

    let admin = admin_token(&resources, "a@x.com").await;
    let forbidden = app
        .clone()
        .oneshot(get("/admin", None, Some(admin.as_str())))
        .await
        .unwrap();
    assert_eq!(forbidden.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&forbidden), "/login");

    let root = root_token(&resources).await;
    let allowed = app
        .clone()
        .oneshot(get("/admin", None, Some(root.as_str())))
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_tenant_page_is_not_found() {
    let (app, _) = app().await;

    let response = app
        .oneshot(get("/ghost/dashboard", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn apex_host_is_not_rewritten() {
    let (app, resources) = app().await;
    common::seed_tenant(
        &resources.database,
        "Acme Saúde",
        "acme",
        "11.111.111/0001-11",
        "a@x.com",
    )
    .await;

    // www is the reserved apex label: no tenant, no rewrite, so / has no
    // route and 404s rather than landing on a tenant page.
    let response = app
        .oneshot(get("/", Some("www.medmap.test"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_paths_bypass_the_host_rewrite() {
    let (app, resources) = app().await;
    let (tenant, _) = common::seed_tenant(
        &resources.database,
        "Acme Saúde",
        "acme",
        "11.111.111/0001-11",
        "a@x.com",
    )
    .await;

    let response = app
        .oneshot(get(
            &format!("/api/tenants/{}", tenant.id),
            Some("acme.medmap.test"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
