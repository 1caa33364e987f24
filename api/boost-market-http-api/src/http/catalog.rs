use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use boost_market_app::{
    domain::{
        CategoryId, GameId, SellerId,
        game::{Category, Game},
        offering::Offering,
        seller::BadgeRank,
    },
    workflow::catalog::{
        GameOffer, OfferedGame, game_sellers::GameSellers, manage::CreateGame,
        offerings::AddOffering,
    },
};
use serde::{Deserialize, Serialize};

use crate::{
    error::ServiceError,
    http::{
        AppState,
        accounts::{JsonSeller, SearchQuery},
    },
    jwt::AuthUser,
};

#[derive(Serialize)]
pub struct JsonCategory {
    id: i64,
    name: String,
}

impl From<Category> for JsonCategory {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.0,
            name: category.name,
        }
    }
}

#[derive(Serialize)]
pub struct JsonGame {
    id: i64,
    name: String,
    description: String,
    image: Option<String>,
    categories: Vec<JsonCategory>,
    rating: f64,
    clicks: u64,
}

impl From<Game> for JsonGame {
    fn from(game: Game) -> Self {
        Self {
            id: game.id.0,
            name: game.name,
            description: game.description,
            image: game.image,
            categories: game.categories.into_iter().map(JsonCategory::from).collect(),
            rating: game.rating,
            clicks: game.clicks,
        }
    }
}

#[derive(Serialize)]
pub struct JsonOffering {
    id: i64,
    seller_id: i64,
    game_id: i64,
    price: Option<u32>,
    description: Option<String>,
}

impl From<Offering> for JsonOffering {
    fn from(offering: Offering) -> Self {
        Self {
            id: offering.id.0,
            seller_id: offering.seller_id.0,
            game_id: offering.game_id.0,
            price: offering.price,
            description: offering.description,
        }
    }
}

#[derive(Serialize)]
pub struct JsonOfferedGame {
    #[serde(flatten)]
    offering: JsonOffering,
    game: JsonGame,
}

impl From<OfferedGame> for JsonOfferedGame {
    fn from(offered: OfferedGame) -> Self {
        Self {
            offering: offered.offering.into(),
            game: offered.game.into(),
        }
    }
}

#[derive(Serialize)]
pub struct JsonGameOffer {
    #[serde(flatten)]
    offering: JsonOffering,
    seller: JsonSeller,
}

impl From<GameOffer> for JsonGameOffer {
    fn from(offer: GameOffer) -> Self {
        Self {
            offering: offer.offering.into(),
            seller: offer.seller.into(),
        }
    }
}

#[derive(Serialize)]
pub struct JsonGameSellers {
    game: JsonGame,
    sellers: Vec<JsonGameOffer>,
}

impl From<GameSellers> for JsonGameSellers {
    fn from(game_sellers: GameSellers) -> Self {
        Self {
            game: game_sellers.game.into(),
            sellers: game_sellers
                .offers
                .into_iter()
                .map(JsonGameOffer::from)
                .collect(),
        }
    }
}

#[derive(Deserialize)]
pub struct JsonCreateCategory {
    name: String,
}

#[derive(Deserialize)]
pub struct JsonCreateGame {
    name: String,
    #[serde(default)]
    description: String,
    image: Option<String>,
    #[serde(default)]
    categories: Vec<i64>,
}

#[derive(Deserialize)]
pub struct JsonSetBadge {
    badge: String,
}

#[derive(Deserialize)]
pub struct JsonAddOffering {
    game_id: i64,
    price: Option<u32>,
    description: Option<String>,
}

pub async fn list_games(
    State(app_state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<JsonGame>>, ServiceError> {
    let games = app_state
        .app
        .list_games_use_case
        .list_games(query.search.as_deref())
        .await?;
    Ok(Json(games.into_iter().map(JsonGame::from).collect()))
}

pub async fn create_game(
    AuthUser(user_id): AuthUser,
    State(app_state): State<AppState>,
    Json(body): Json<JsonCreateGame>,
) -> Result<(StatusCode, Json<JsonGame>), ServiceError> {
    let game = CreateGame {
        name: body.name,
        description: body.description,
        image: body.image,
        category_ids: body.categories.into_iter().map(CategoryId).collect(),
    };
    let game = app_state
        .app
        .manage_catalog_use_case
        .create_game(user_id, game)
        .await?;
    Ok((StatusCode::CREATED, Json(game.into())))
}

pub async fn list_categories(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<JsonCategory>>, ServiceError> {
    let categories = app_state.app.list_games_use_case.list_categories().await?;
    Ok(Json(
        categories.into_iter().map(JsonCategory::from).collect(),
    ))
}

pub async fn create_category(
    AuthUser(user_id): AuthUser,
    State(app_state): State<AppState>,
    Json(body): Json<JsonCreateCategory>,
) -> Result<(StatusCode, Json<JsonCategory>), ServiceError> {
    let category = app_state
        .app
        .manage_catalog_use_case
        .create_category(user_id, &body.name)
        .await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

pub async fn set_badge(
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    State(app_state): State<AppState>,
    Json(body): Json<JsonSetBadge>,
) -> Result<StatusCode, ServiceError> {
    let Some(badge) = BadgeRank::from_label(&body.badge) else {
        return Err(ServiceError::BadRequest(format!(
            "Unknown badge '{}'",
            body.badge
        )));
    };
    app_state
        .app
        .manage_catalog_use_case
        .set_badge(user_id, SellerId(id), badge)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn sellers_for_game(
    Path(id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<Json<JsonGameSellers>, ServiceError> {
    let game_sellers = app_state
        .app
        .game_sellers_use_case
        .sellers_for_game(GameId(id))
        .await?;
    Ok(Json(game_sellers.into()))
}

pub async fn my_offerings(
    AuthUser(user_id): AuthUser,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<JsonOfferedGame>>, ServiceError> {
    let offerings = app_state
        .app
        .offerings_use_case
        .my_offerings(user_id)
        .await?;
    Ok(Json(
        offerings.into_iter().map(JsonOfferedGame::from).collect(),
    ))
}

pub async fn add_offering(
    AuthUser(user_id): AuthUser,
    State(app_state): State<AppState>,
    Json(body): Json<JsonAddOffering>,
) -> Result<(StatusCode, Json<JsonOffering>), ServiceError> {
    let offering = AddOffering {
        game_id: GameId(body.game_id),
        price: body.price,
        description: body.description,
    };
    let offering = app_state
        .app
        .offerings_use_case
        .add_offering(user_id, offering)
        .await?;
    Ok((StatusCode::CREATED, Json(offering.into())))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use boost_market_app::domain::seller::SellerRepository;
    use serde_json::json;

    use crate::http::test_support::{send, test_router, token_for};

    #[tokio::test]
    async fn test_staff_maintains_catalog() {
        let (store, router) = test_router().await;
        let staff = store.seed_user("admin", "pw-pw-pw-pw", true).await;
        let token = token_for(staff.id);

        let (status, category) = send(
            &router,
            "POST",
            "/categories",
            Some(&token),
            Some(json!({ "name": "Shooter" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, game) = send(
            &router,
            "POST",
            "/games",
            Some(&token),
            Some(json!({
                "name": "Valorant",
                "description": "Tactical shooter",
                "categories": [category["id"]],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(game["categories"][0]["name"], "Shooter");
        assert_eq!(game["rating"], 2.5);

        let (status, games) = send(&router, "GET", "/games?search=valo", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(games.as_array().unwrap().len(), 1);

        let (_, categories) = send(&router, "GET", "/categories", None, None).await;
        assert_eq!(categories.as_array().unwrap().len(), 1);

        let (status, _) = send(
            &router,
            "POST",
            "/games",
            Some(&token),
            Some(json!({ "name": "Dota", "categories": [999] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_non_staff_cannot_change_catalog() {
        let (store, router) = test_router().await;
        let user = store.seed_user("sara", "pw-pw-pw-pw", false).await;
        let token = token_for(user.id);

        let (status, body) = send(
            &router,
            "POST",
            "/categories",
            Some(&token),
            Some(json!({ "name": "Shooter" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_set_badge() {
        let (store, router) = test_router().await;
        let staff = store.seed_user("admin", "pw-pw-pw-pw", true).await;
        let booster = store.seed_user("booster", "pw-pw-pw-pw", false).await;
        let seller = store.get_or_create_seller(booster.id).await.unwrap();
        let token = token_for(staff.id);
        let uri = format!("/sellers/{}/badge", seller.id);

        let (status, _) = send(
            &router,
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "badge": "gold" })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, sellers) = send(&router, "GET", "/sellers", None, None).await;
        assert_eq!(sellers[0]["badge"], "Gold");

        let (status, _) = send(
            &router,
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "badge": "Diamond" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_offerings_and_game_sellers() {
        let (store, router) = test_router().await;
        let offer = store.seed_offer().await;
        let token = token_for(offer.buyer_user.id);

        let (status, _) = send(
            &router,
            "POST",
            "/offerings",
            Some(&token),
            Some(json!({ "game_id": offer.game.id.0, "price": 25, "description": " Fast " })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = send(
            &router,
            "POST",
            "/offerings",
            Some(&token),
            Some(json!({ "game_id": offer.game.id.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, mine) = send(&router, "GET", "/offerings", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(mine[0]["game"]["name"], "Valorant");
        assert_eq!(mine[0]["description"], "Fast");

        let (status, body) = send(
            &router,
            "GET",
            &format!("/games/{}/sellers", offer.game.id),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["game"]["name"], "Valorant");
        assert_eq!(body["sellers"].as_array().unwrap().len(), 2);

        let (status, _) = send(&router, "GET", "/games/999/sellers", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
