use axum::{
    Json,
    extract::{Path, State},
};
use boost_market_app::domain::{GameId, SellerId, rating::RatingEntry};
use serde::Serialize;
use serde_json::{Value, json};

use crate::{error::ServiceError, http::AppState};

#[derive(Serialize)]
pub struct JsonRating {
    id: i64,
    rating: f64,
}

impl From<RatingEntry> for JsonRating {
    fn from(entry: RatingEntry) -> Self {
        Self {
            id: entry.id,
            rating: entry.rating,
        }
    }
}

fn to_json(entries: Vec<RatingEntry>) -> Json<Vec<JsonRating>> {
    Json(entries.into_iter().map(JsonRating::from).collect())
}

pub async fn api_overview() -> Json<Value> {
    Json(json!({
        "Seller ratings": "/api/rating/seller",
        "Game ratings": "/api/rating/game",
        "Seller rating": "/api/rating/seller/<seller_id>",
        "Game rating": "/api/rating/game/<game_id>",
        "Game ratings of seller": "/api/rating/seller/<seller_id>/game",
        "Seller ratings of game": "/api/rating/game/<game_id>/seller",
        "Game rating of seller": "/api/rating/seller/<seller_id>/game/<game_id>",
        "Seller rating of game": "/api/rating/game/<game_id>/seller/<seller_id>",
        "Reviews": "/api/review/order",
        "Review of order": "/api/review/order/<order_id>",
        "Order requirements": "/api/order/<order_id>",
    }))
}

pub async fn seller_ratings(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<JsonRating>>, ServiceError> {
    let ratings = app_state.app.rating_query_use_case.seller_ratings().await?;
    Ok(to_json(ratings))
}

pub async fn game_ratings(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<JsonRating>>, ServiceError> {
    let ratings = app_state.app.rating_query_use_case.game_ratings().await?;
    Ok(to_json(ratings))
}

pub async fn seller_rating(
    Path(id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<Json<JsonRating>, ServiceError> {
    let rating = app_state
        .app
        .rating_query_use_case
        .seller_rating(SellerId(id))
        .await?;
    Ok(Json(rating.into()))
}

pub async fn game_rating(
    Path(id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<Json<JsonRating>, ServiceError> {
    let rating = app_state
        .app
        .rating_query_use_case
        .game_rating(GameId(id))
        .await?;
    Ok(Json(rating.into()))
}

pub async fn seller_game_ratings(
    Path(id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<JsonRating>>, ServiceError> {
    let ratings = app_state
        .app
        .rating_query_use_case
        .seller_game_ratings(SellerId(id))
        .await?;
    Ok(to_json(ratings))
}

pub async fn game_seller_ratings(
    Path(id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<JsonRating>>, ServiceError> {
    let ratings = app_state
        .app
        .rating_query_use_case
        .game_seller_ratings(GameId(id))
        .await?;
    Ok(to_json(ratings))
}

pub async fn seller_game_rating(
    Path((seller_id, game_id)): Path<(i64, i64)>,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<JsonRating>>, ServiceError> {
    let ratings = app_state
        .app
        .rating_query_use_case
        .seller_game_rating(SellerId(seller_id), GameId(game_id))
        .await?;
    Ok(to_json(ratings))
}

pub async fn game_seller_rating(
    Path((game_id, seller_id)): Path<(i64, i64)>,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<JsonRating>>, ServiceError> {
    let ratings = app_state
        .app
        .rating_query_use_case
        .game_seller_rating(GameId(game_id), SellerId(seller_id))
        .await?;
    Ok(to_json(ratings))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use boost_market_app::domain::{game::GameRepository, seller::SellerRepository};
    use serde_json::json;

    use crate::http::test_support::{send, test_router};

    #[tokio::test]
    async fn test_rating_lists_and_details() {
        let (store, router) = test_router().await;
        let offer = store.seed_offer().await;
        SellerRepository::set_rating(store.as_ref(), offer.seller.id, 4.0)
            .await
            .unwrap();
        GameRepository::set_rating(store.as_ref(), offer.game.id, 3.5)
            .await
            .unwrap();

        let (status, body) = send(&router, "GET", "/api/rating/seller", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{ "id": offer.seller.id.0, "rating": 4.0 }]));

        let (_, body) = send(&router, "GET", "/api/rating/game", None, None).await;
        assert_eq!(body, json!([{ "id": offer.game.id.0, "rating": 3.5 }]));

        let (status, body) = send(
            &router,
            "GET",
            &format!("/api/rating/seller/{}", offer.seller.id),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rating"], 4.0);

        let (status, _) = send(&router, "GET", "/api/rating/game/999", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cross_ratings() {
        let (store, router) = test_router().await;
        let offer = store.seed_offer().await;
        let seller = offer.seller.id.0;
        let game = offer.game.id.0;

        let (_, body) = send(
            &router,
            "GET",
            &format!("/api/rating/seller/{}/game", seller),
            None,
            None,
        )
        .await;
        assert_eq!(body, json!([{ "id": game, "rating": 2.5 }]));

        let (_, body) = send(
            &router,
            "GET",
            &format!("/api/rating/game/{}/seller", game),
            None,
            None,
        )
        .await;
        assert_eq!(body, json!([{ "id": seller, "rating": 2.5 }]));

        let (_, body) = send(
            &router,
            "GET",
            &format!("/api/rating/seller/{}/game/{}", seller, game),
            None,
            None,
        )
        .await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, body) = send(
            &router,
            "GET",
            &format!("/api/rating/game/{}/seller/{}", game, 999),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_api_overview() {
        let (_, router) = test_router().await;
        let (status, body) = send(&router, "GET", "/api", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Seller ratings"], "/api/rating/seller");
    }
}
