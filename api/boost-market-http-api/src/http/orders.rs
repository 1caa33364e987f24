use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use boost_market_app::{
    domain::{
        GameId, OrderId, SellerId,
        order::{Order, OrderRequirements, OrderStatus, RequirementsUpdate},
    },
    workflow::order::{OrderView, place::PlaceOrder},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::ServiceError, http::AppState, jwt::AuthUser};

#[derive(Serialize)]
pub struct JsonOrder {
    id: i64,
    buyer_id: i64,
    seller_id: i64,
    game_id: i64,
    gaming_account_id: String,
    gaming_account_password: String,
    price: u32,
    description: String,
    days_to_complete: u32,
    start_time: DateTime<Utc>,
    due_time: DateTime<Utc>,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    game_name: Option<String>,
}

impl From<Order> for JsonOrder {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.0,
            buyer_id: order.buyer_id.0,
            seller_id: order.seller_id.0,
            game_id: order.game_id.0,
            due_time: order.due_time(),
            gaming_account_id: order.requirements.gaming_account_id,
            gaming_account_password: order.requirements.gaming_account_password,
            price: order.requirements.price,
            description: order.requirements.description,
            days_to_complete: order.requirements.days_to_complete,
            start_time: order.start_time,
            status: order.status.code(),
            game_name: None,
        }
    }
}

impl From<OrderView> for JsonOrder {
    fn from(view: OrderView) -> Self {
        JsonOrder {
            game_name: Some(view.game_name),
            ..view.order.into()
        }
    }
}

#[derive(Deserialize)]
pub struct JsonPlaceOrder {
    seller_id: i64,
    game_id: i64,
    gaming_account_id: String,
    gaming_account_password: String,
    price: u32,
    #[serde(default)]
    description: String,
    days_to_complete: u32,
}

#[derive(Deserialize)]
pub struct JsonRequirementsUpdate {
    gaming_account_id: Option<String>,
    gaming_account_password: Option<String>,
    price: Option<u32>,
    game_id: Option<i64>,
    description: Option<String>,
    days_to_complete: Option<u32>,
}

#[derive(Deserialize)]
pub struct JsonStatusUpdate {
    status: String,
}

pub async fn place_order(
    AuthUser(user_id): AuthUser,
    State(app_state): State<AppState>,
    Json(body): Json<JsonPlaceOrder>,
) -> Result<(StatusCode, Json<JsonOrder>), ServiceError> {
    let order = PlaceOrder {
        seller_id: SellerId(body.seller_id),
        game_id: GameId(body.game_id),
        requirements: OrderRequirements {
            gaming_account_id: body.gaming_account_id,
            gaming_account_password: body.gaming_account_password,
            price: body.price,
            description: body.description,
            days_to_complete: body.days_to_complete,
        },
    };
    let order = app_state
        .app
        .place_order_use_case
        .place_order(user_id, order)
        .await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

pub async fn my_orders(
    AuthUser(user_id): AuthUser,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<JsonOrder>>, ServiceError> {
    let orders = app_state.app.my_orders_use_case.my_orders(user_id).await?;
    Ok(Json(orders.into_iter().map(JsonOrder::from).collect()))
}

pub async fn update_status(
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    State(app_state): State<AppState>,
    Json(body): Json<JsonStatusUpdate>,
) -> Result<Json<JsonOrder>, ServiceError> {
    let Some(status) = OrderStatus::from_code(body.status.trim()) else {
        return Err(ServiceError::BadRequest(format!(
            "Unknown order status '{}'",
            body.status
        )));
    };
    let order = app_state
        .app
        .update_status_use_case
        .update_status(user_id, OrderId(id), status)
        .await?;
    Ok(Json(order.into()))
}

pub async fn update_requirements(
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    State(app_state): State<AppState>,
    Json(body): Json<JsonRequirementsUpdate>,
) -> Result<Json<JsonOrder>, ServiceError> {
    let update = RequirementsUpdate {
        gaming_account_id: body.gaming_account_id,
        gaming_account_password: body.gaming_account_password,
        price: body.price,
        game_id: body.game_id.map(GameId),
        description: body.description,
        days_to_complete: body.days_to_complete,
    };
    let order = app_state
        .app
        .change_requirements_use_case
        .update_requirements(user_id, OrderId(id), update)
        .await?;
    Ok(Json(order.into()))
}

pub async fn delete_order(
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<StatusCode, ServiceError> {
    app_state
        .app
        .change_requirements_use_case
        .delete_order(user_id, OrderId(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
