use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use prodcat_core::{ingest::body_preview, parse_batch, IngestSummary, ProductRecord};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, map_ingest_error, ApiError, ApiResponse, AppState, ResponseMeta};

const BODY_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Serialize)]
pub(super) struct BulkInsertResponse {
    message: &'static str,
    #[serde(flatten)]
    summary: IngestSummary,
}

/// Accepts one product object or an array of them and stores the batch.
pub(super) async fn bulk_insert_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<BulkInsertResponse>>), ApiError> {
    tracing::info!(request_id = %req_id.0, bytes = body.len(), "received product batch");
    tracing::debug!(
        request_id = %req_id.0,
        preview = %body_preview(&body, BODY_PREVIEW_CHARS),
        "product batch body"
    );

    let records = parse_batch(&body).map_err(|e| map_ingest_error(req_id.0.clone(), e))?;

    let summary = prodcat_db::ingest_batch(&state.pool, records, &state.ingest)
        .await
        .map_err(|e| map_ingest_error(req_id.0.clone(), e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: BulkInsertResponse {
                message: "Products upserted successfully",
                summary,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ProductRecord>>, ApiError> {
    let row = prodcat_db::get_product_by_id(&state.pool, &id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("product '{id}' not found"),
            )
        })?;

    Ok(Json(ApiResponse {
        data: ProductRecord::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}
