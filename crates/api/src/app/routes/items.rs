use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use stockroom_auth::Action;
use stockroom_core::ItemId;
use stockroom_store::ItemQuery;

use crate::app::dto::{CreateItemRequest, ItemResponse, UpdateItemRequest};
use crate::app::errors::{json_error, store_error_to_response, store_error_to_unavailable};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::CurrentUser;

/// Query-string parameters for `/items`. `id` selects the single-item view;
/// `sort`/`order`/`search` shape the catalog listing.
#[derive(Debug, Default, Deserialize)]
pub struct ItemParams {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

fn parse_id(raw: &str) -> Result<ItemId, axum::response::Response> {
    raw.parse::<ItemId>()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "validation_error", "invalid item id"))
}

pub async fn read_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<ItemParams>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&user, Action::ReadItems, false) {
        return resp;
    }

    if let Some(raw) = params.id.as_deref() {
        let id = match parse_id(raw) {
            Ok(id) => id,
            Err(resp) => return resp,
        };
        return match services.items.get(id).await {
            Ok(Some(item)) => (StatusCode::OK, Json(ItemResponse::from(item))).into_response(),
            Ok(None) => json_error(StatusCode::NOT_FOUND, "not_found", "Item not found"),
            Err(err) => store_error_to_response(err, "Item not found", "Error fetching items"),
        };
    }

    let query = ItemQuery::from_params(
        params.sort.as_deref(),
        params.order.as_deref(),
        params.search.as_deref(),
    );
    match services.items.list(&query).await {
        Ok(items) => {
            let body: Vec<ItemResponse> = items.into_iter().map(ItemResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => store_error_to_response(err, "Item not found", "Error fetching items"),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    body: Result<Json<CreateItemRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&user, Action::CreateItem, false) {
        return resp;
    }
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                rejection.body_text(),
            );
        }
    };

    let draft = body.into_draft();
    if let Err(err) = draft.validate() {
        return json_error(StatusCode::BAD_REQUEST, "validation_error", err.to_string());
    }

    match services.items.create(&draft).await {
        Ok(id) => {
            tracing::info!(item_id = %id, name = %draft.name, "item created");
            (
                StatusCode::CREATED,
                Json(serde_json::json!({
                    "message": "Item created successfully",
                    "id": id,
                })),
            )
                .into_response()
        }
        Err(err) => store_error_to_unavailable(err, "Item not found", "Unable to create item"),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<ItemParams>,
    body: Result<Json<UpdateItemRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&user, Action::UpdateItem, false) {
        return resp;
    }
    let Some(raw) = params.id.as_deref() else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "Item ID is required for update",
        );
    };
    let id = match parse_id(raw) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                rejection.body_text(),
            );
        }
    };

    let patch = body.into_patch();
    if let Err(err) = patch.validate() {
        return json_error(StatusCode::BAD_REQUEST, "validation_error", err.to_string());
    }

    match services.items.update(id, &patch).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Item updated successfully" })),
        )
            .into_response(),
        Err(err) => store_error_to_response(err, "Item not found", "Error updating item"),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<ItemParams>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&user, Action::DeleteItem, false) {
        return resp;
    }
    let Some(raw) = params.id.as_deref() else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "Item ID is required for delete",
        );
    };
    let id = match parse_id(raw) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.items.delete(id).await {
        Ok(()) => {
            tracing::info!(item_id = %id, deleted_by = %user.username(), "item deleted");
            (
                StatusCode::OK,
                Json(serde_json::json!({ "message": "Item deleted successfully" })),
            )
                .into_response()
        }
        Err(err) => store_error_to_response(err, "Item not found", "Error deleting item"),
    }
}
