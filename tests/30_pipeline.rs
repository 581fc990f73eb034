mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

use agentova_api::firewall::{Firewall, InMemoryFirewallStore};
use agentova_api::types::WorkspaceRole;
use std::sync::Arc;

#[tokio::test]
async fn missing_identity_is_unauthenticated() -> Result<()> {
    let app = TestApp::new();
    let token = app.member("W", "u1", WorkspaceRole::Admin).await?;

    let (status, body) = app.call("getTexts", None, &json!({"workspaceToken": token})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");

    let (_, body) = app
        .call("getTexts", Some("not-a-jwt"), &json!({"workspaceToken": token}))
        .await?;
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
    Ok(())
}

#[tokio::test]
async fn required_fields_stop_at_the_first_missing() -> Result<()> {
    let app = TestApp::new();
    let identity = app.identity("u1")?;

    let (_, body) = app.call("createComment", Some(&identity), &json!({})).await?;
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
    assert_eq!(body["error"]["details"]["field"], "workspaceToken");

    let (_, body) = app
        .call("createComment", Some(&identity), &json!({"workspaceToken": "t", "text": ""}))
        .await?;
    assert_eq!(body["error"]["details"]["field"], "text");
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_invalid_input() -> Result<()> {
    let app = TestApp::new();
    let identity = app.identity("u1")?;

    let (status, body) = app.call_raw("getTexts", &identity, "{not json").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
    assert!(body["error"]["details"]["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn workspace_token_states_surface_as_errors() -> Result<()> {
    let app = TestApp::new();
    let editor_token = app.member("W", "u1", WorkspaceRole::Editor).await?;
    let outsider_token = app.ctx.gate.issue_token("u1", "elsewhere", WorkspaceRole::Admin)?;
    let identity = app.identity("u1")?;

    let (_, body) = app
        .call("getTexts", Some(&identity), &json!({"workspaceToken": "abc.def.ghi"}))
        .await?;
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
    assert_eq!(body["error"]["message"], "Le token est invalide ou modifié");

    let (_, body) = app
        .call("getTexts", Some(&identity), &json!({"workspaceToken": outsider_token}))
        .await?;
    assert_eq!(body["error"]["code"], "WORKSPACE_NOT_ACCESSIBLE");

    let (_, body) = app
        .call("deleteText", Some(&identity), &json!({"workspaceToken": editor_token, "textId": "x"}))
        .await?;
    assert_eq!(body["error"]["code"], "ROLE_NOT_ALLOWED");
    assert!(body.get("workspace_tokens").is_none());
    Ok(())
}

#[tokio::test]
async fn eleventh_call_in_window_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let token = app.member("W", "u1", WorkspaceRole::Editor).await?;
    let identity = app.identity("u1")?;
    let payload = json!({"workspaceToken": token});

    for _ in 0..10 {
        let (_, body) = app.call("listComments", Some(&identity), &payload).await?;
        assert_eq!(body["success"], true);
    }

    let (status, body) = app.call("listComments", Some(&identity), &payload).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
    assert!(body["error"]["details"]["error"]
        .as_str()
        .unwrap()
        .contains("listComments"));

    // Other operations keep their own budget
    let (_, body) = app.call("getTexts", Some(&identity), &payload).await?;
    assert_eq!(body["success"], true);
    Ok(())
}

#[tokio::test]
async fn injected_firewall_budget_is_honored() -> Result<()> {
    let app = TestApp::with_firewall(Firewall::new(Arc::new(InMemoryFirewallStore::new()), 2, 60_000));
    let token = app.member("W", "u1", WorkspaceRole::Editor).await?;
    let identity = app.identity("u1")?;
    let payload = json!({"workspaceToken": token});

    for expected in [true, true, false] {
        let (_, body) = app.call("getTexts", Some(&identity), &payload).await?;
        assert_eq!(body["success"], expected);
    }
    Ok(())
}

#[tokio::test]
async fn tokens_rotate_for_every_membership() -> Result<()> {
    let app = TestApp::new();
    let token = app.member("A", "u1", WorkspaceRole::Admin).await?;
    app.member("B", "u1", WorkspaceRole::Editor).await?;
    let identity = app.identity("u1")?;

    let (_, body) = app.call("listComments", Some(&identity), &json!({"workspaceToken": token})).await?;
    let tokens = body["workspace_tokens"].as_object().unwrap();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens["A"]["role"], "admin");
    assert_eq!(tokens["B"]["role"], "editor");

    // A rotated token authorizes the next call
    let rotated = tokens["B"]["token"].as_str().unwrap();
    let (_, body) = app
        .call("createComment", Some(&identity), &json!({"workspaceToken": rotated, "text": "Looks good"}))
        .await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["comment"]["workspace_id"], "B");
    Ok(())
}
