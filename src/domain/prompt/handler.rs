use axum::Json;

use super::catalog::{option_catalog, OptionCatalog};
use crate::response::BaseResponse;

/// Input screen options
///
/// Labels, help text, defaults and length limits for the notes form.
#[utoipa::path(
    get,
    path = "/api/notes/options",
    tag = "Notes",
    responses(
        (status = 200, description = "Option catalogue", body = BaseResponse<OptionCatalog>)
    )
)]
pub async fn get_options() -> Json<BaseResponse<OptionCatalog>> {
    Json(BaseResponse::success(option_catalog()))
}
