#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use agentova_api::config::AppConfig;
use agentova_api::database::models::Workspace;
use agentova_api::database::WorkspaceRepository;
use agentova_api::firewall::Firewall;
use agentova_api::handlers;
use agentova_api::services::ServiceContext;
use agentova_api::types::WorkspaceRole;

/// In-process application over empty in-memory repositories
pub struct TestApp {
    pub ctx: ServiceContext,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::from_context(ServiceContext::in_memory(&AppConfig::development()))
    }

    pub fn with_firewall(firewall: Firewall) -> Self {
        Self::from_context(ServiceContext::in_memory(&AppConfig::development()).with_firewall(firewall))
    }

    fn from_context(ctx: ServiceContext) -> Self {
        let router = handlers::app(ctx.clone(), &["*".to_string()]);
        Self { ctx, router }
    }

    /// Make `uid` a member of `workspace_id` (created on demand) and return a
    /// workspace token for it
    pub async fn member(&self, workspace_id: &str, uid: &str, role: WorkspaceRole) -> Result<String> {
        if self.ctx.workspaces.find_by_id(workspace_id).await?.is_none() {
            self.ctx
                .workspaces
                .create(Workspace {
                    id: workspace_id.to_string(),
                    name: workspace_id.to_string(),
                    color: None,
                    owner_id: uid.to_string(),
                })
                .await?;
        }
        self.ctx.workspaces.add_member(workspace_id, uid, role).await?;
        Ok(self.ctx.gate.issue_token(uid, workspace_id, role)?)
    }

    pub fn identity(&self, uid: &str) -> Result<String> {
        Ok(self.ctx.identity.issue(uid)?)
    }

    /// POST /api/<operation> with an optional identity token
    pub async fn call(&self, operation: &str, identity: Option<&str>, body: &Value) -> Result<(StatusCode, Value)> {
        let mut request = Request::builder()
            .method("POST")
            .uri(format!("/api/{}", operation))
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = identity {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = request.body(Body::from(serde_json::to_vec(body)?))?;
        self.send(request).await
    }

    pub async fn call_raw(&self, operation: &str, identity: &str, body: &'static str) -> Result<(StatusCode, Value)> {
        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/{}", operation))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {}", identity))
            .body(Body::from(body))?;
        self.send(request).await
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        let request = Request::builder().uri(path).body(Body::empty())?;
        self.send(request).await
    }

    /// /internal/healthcheck with any method and an optional server token.
    /// The body is `None` when the response is not JSON (405).
    pub async fn internal_healthcheck(
        &self,
        method: Method,
        server_token: Option<&str>,
    ) -> Result<(StatusCode, Option<Value>)> {
        let mut request = Request::builder().method(method).uri("/internal/healthcheck");
        if let Some(token) = server_token {
            request = request.header("x-server-token", token);
        }

        let (status, bytes) = self.send_bytes(request.body(Body::empty())?).await?;
        Ok((status, serde_json::from_slice(&bytes).ok()))
    }

    async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let (status, bytes) = self.send_bytes(request).await?;
        let body = serde_json::from_slice(&bytes).context("response body is not JSON")?;
        Ok((status, body))
    }

    async fn send_bytes(&self, request: Request<Body>) -> Result<(StatusCode, Bytes)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, bytes))
    }
}
