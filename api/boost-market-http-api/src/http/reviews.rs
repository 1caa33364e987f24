use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use boost_market_app::domain::{OrderId, review::Review};
use serde::{Deserialize, Serialize};

use crate::{error::ServiceError, http::AppState, jwt::AuthUser};

#[derive(Serialize)]
pub struct JsonReview {
    id: i64,
    order: i64,
    rating: f64,
    comment: String,
}

impl From<Review> for JsonReview {
    fn from(review: Review) -> Self {
        Self {
            id: review.id.0,
            order: review.order_id.0,
            rating: review.rating,
            comment: review.comment,
        }
    }
}

#[derive(Deserialize)]
pub struct JsonPutReview {
    order: i64,
    rating: f64,
    comment: Option<String>,
}

#[derive(Deserialize)]
pub struct JsonPatchReview {
    rating: Option<f64>,
    comment: Option<String>,
}

pub async fn list_reviews(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<JsonReview>>, ServiceError> {
    let reviews = app_state.app.review_query_use_case.list_reviews().await?;
    Ok(Json(reviews.into_iter().map(JsonReview::from).collect()))
}

pub async fn get_review(
    Path(order_id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<Json<JsonReview>, ServiceError> {
    let review = app_state
        .app
        .review_query_use_case
        .get_review(OrderId(order_id))
        .await?;
    Ok(Json(review.into()))
}

pub async fn put_review(
    AuthUser(user_id): AuthUser,
    State(app_state): State<AppState>,
    Json(body): Json<JsonPutReview>,
) -> Result<(StatusCode, Json<JsonReview>), ServiceError> {
    let review = app_state
        .app
        .edit_review_use_case
        .put_review(user_id, OrderId(body.order), body.rating, body.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}

pub async fn patch_review(
    AuthUser(user_id): AuthUser,
    Path(order_id): Path<i64>,
    State(app_state): State<AppState>,
    Json(body): Json<JsonPatchReview>,
) -> Result<(StatusCode, Json<JsonReview>), ServiceError> {
    let review = app_state
        .app
        .edit_review_use_case
        .patch_review(user_id, OrderId(order_id), body.rating, body.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}

pub async fn delete_review(
    AuthUser(user_id): AuthUser,
    Path(order_id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<StatusCode, ServiceError> {
    app_state
        .app
        .edit_review_use_case
        .delete_review(user_id, OrderId(order_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
