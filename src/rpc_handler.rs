//! RPC method handler for the rxportal JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested without stdio.
//! `handle_method` dispatches a call to the managers held by [`App`].

use serde_json::{json, Value};

use crate::app::App;
use crate::types::bookmark::{BookmarkRecord, ToggleOutcome};
use crate::types::profile::Profile;

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

fn profile_json(profile: &Profile) -> Value {
    json!({
        "profile_id": profile.profile_id,
        "display_name": profile.display_name(),
        "profile_role": profile.profile_role,
    })
}

/// A bookmark row as the panel renders it.
fn bookmark_row_json(record: &BookmarkRecord) -> Value {
    let kind = record.kind();
    json!({
        "id": record.id,
        "resource_id": record.resource_id,
        "display_name": record.display_name(),
        "file_url": record.file_url,
        "created_at": record.created_at,
        "kind": kind,
        "action_label": kind.action_label(),
    })
}

fn panel_json(app: &App) -> Value {
    json!({"is_open": app.panel.is_open(), "search": app.panel_search.term()})
}

fn snapshot_json(app: &App) -> Result<Value, String> {
    serde_json::to_value(app.bookmarks.snapshot()).map_err(|e| e.to_string())
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method(app: &App, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        // ─── Session ───
        "session.sign_in" => {
            let account_id = str_param(params, "account_id")?;
            let active = app.sign_in(account_id).await.map_err(|e| e.to_string())?;
            let profiles: Vec<Value> = app.profiles.profiles().iter().map(profile_json).collect();
            Ok(json!({
                "active_profile": active.as_ref().map(profile_json),
                "profiles": profiles,
            }))
        }
        "session.sign_out" => {
            app.sign_out().await;
            Ok(json!({"ok": true}))
        }

        // ─── Profiles ───
        "profile.list" => {
            let profiles: Vec<Value> = app.profiles.profiles().iter().map(profile_json).collect();
            Ok(json!({
                "active_profile_id": app.profiles.active_profile_id(),
                "profiles": profiles,
            }))
        }
        "profile.select" => {
            let profile_id = str_param(params, "profile_id")?;
            let profile = app.select_profile(profile_id).await.map_err(|e| e.to_string())?;
            Ok(json!({"ok": true, "profile_id": profile.profile_id}))
        }

        // ─── Bookmarks ───
        "bookmark.state" => snapshot_json(app),
        "bookmark.refresh" => {
            app.bookmarks.refresh().await;
            snapshot_json(app)
        }
        "bookmark.toggle" => {
            // A missing param is treated as a blank id so the store records the error.
            let resource_id = params.get("resource_id").and_then(|v| v.as_str()).unwrap_or("");
            let outcome = app
                .bookmarks
                .toggle_bookmark(resource_id)
                .await
                .map_err(|e| e.to_string())?;
            let record = match &outcome {
                ToggleOutcome::Added(record) => Some(bookmark_row_json(record)),
                ToggleOutcome::Removed(_) => None,
            };
            Ok(json!({
                "resource_id": resource_id,
                "bookmarked": outcome.is_bookmarked(),
                "bookmark": record,
            }))
        }
        "bookmark.is_bookmarked" => {
            let resource_id = str_param(params, "resource_id")?;
            Ok(json!(app.bookmarks.is_bookmarked(resource_id)))
        }
        "bookmark.list" => {
            let query = match params.get("query").and_then(|v| v.as_str()) {
                Some(q) => q.to_string(),
                None => app.panel_search.term(),
            };
            let rows: Vec<Value> = app
                .bookmarks
                .filter_bookmarks(&query)
                .iter()
                .map(bookmark_row_json)
                .collect();
            Ok(json!({"total": app.bookmarks.bookmarks().len(), "rows": rows}))
        }

        // ─── Panel ───
        "panel.open" => {
            app.panel.open();
            Ok(panel_json(app))
        }
        "panel.close" => {
            app.close_panel();
            Ok(panel_json(app))
        }
        "panel.toggle" => {
            if !app.panel.toggle() {
                app.panel_search.reset();
            }
            Ok(panel_json(app))
        }
        "panel.state" => Ok(panel_json(app)),
        "panel.search" => {
            let query = str_param(params, "query")?;
            app.panel_search.set_term(query);
            Ok(panel_json(app))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
