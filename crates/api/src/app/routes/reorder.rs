use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use stockroom_auth::Action;
use stockroom_inventory::reorder_report;
use stockroom_store::ItemQuery;

use crate::app::dto::ReorderLineResponse;
use crate::app::errors::store_error_to_response;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::CurrentUser;

/// Items at or below their minimum quantity, with the shortfall to order.
/// Lines come out ordered by `item_id` ascending.
pub async fn report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&user, Action::ReadItems, false) {
        return resp;
    }

    match services.items.list(&ItemQuery::default()).await {
        Ok(items) => {
            let lines: Vec<ReorderLineResponse> = reorder_report(items)
                .into_iter()
                .map(ReorderLineResponse::from)
                .collect();
            (StatusCode::OK, Json(lines)).into_response()
        }
        Err(err) => {
            store_error_to_response(err, "Item not found", "Error generating reorder report")
        }
    }
}
