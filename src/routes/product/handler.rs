use axum::{
    extract::{Json, Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState, database::CreateProductDto, error::AppError, utils::success_to_api_response,
};

#[axum::debug_handler]
pub async fn get_all_products(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let fetched = state.products.get_all_products().await?;
    Ok(success_to_api_response(fetched.value))
}

#[axum::debug_handler]
pub async fn get_products_by_colour(
    State(state): State<AppState>,
    Path(colour): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let fetched = state.products.get_products_by_colour(&colour).await?;
    Ok(success_to_api_response(fetched.value))
}

#[axum::debug_handler]
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<CreateProductDto>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(dto) = payload?;
    let product = state.products.add_product(dto).await?;
    Ok((StatusCode::CREATED, success_to_api_response(product)))
}
