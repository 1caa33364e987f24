use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use boost_market_app::{
    domain::{
        SellerId,
        seller::{Seller, SellerSummary},
        user::{Registration, User},
    },
    workflow::account::{PublicProfile, SellerProfile, update_profile::ProfileChanges},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::ServiceError,
    http::{AppState, catalog::JsonOfferedGame},
    jwt::{AuthBody, AuthUser, generate_jwt},
};

#[derive(Deserialize)]
pub struct JsonSignupRequest {
    email: String,
    user_name: String,
    password: String,
    password_confirmation: String,
}

#[derive(Deserialize)]
pub struct JsonLoginRequest {
    email: String,
    password: String,
}

/// Everything a user may see about themselves.
#[derive(Serialize)]
pub struct JsonOwnProfile {
    id: i64,
    email: String,
    user_name: String,
    full_name: String,
    joining_date: DateTime<Utc>,
    age: Option<u32>,
    date_of_birth: Option<DateTime<Utc>>,
    about_info: String,
    cnic: String,
    credit_card_number: String,
    profile_image: String,
    hide_email: bool,
    is_staff: bool,
}

impl From<User> for JsonOwnProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id.0,
            email: user.email,
            user_name: user.user_name,
            full_name: user.full_name,
            joining_date: user.joining_date,
            age: user.age,
            date_of_birth: user.date_of_birth,
            about_info: user.about_info,
            cnic: user.cnic,
            credit_card_number: user.credit_card_number,
            profile_image: user.profile_image,
            hide_email: user.hide_email,
            is_staff: user.is_staff,
        }
    }
}

#[derive(Deserialize)]
pub struct JsonProfileChanges {
    full_name: Option<String>,
    cnic: Option<String>,
    credit_card_number: Option<String>,
    age: Option<u32>,
    date_of_birth: Option<DateTime<Utc>>,
    about_info: Option<String>,
    profile_image: Option<String>,
    hide_email: Option<bool>,
    current_password: Option<String>,
    new_password: Option<String>,
    confirm_password: Option<String>,
}

impl From<JsonProfileChanges> for ProfileChanges {
    fn from(changes: JsonProfileChanges) -> Self {
        ProfileChanges {
            full_name: changes.full_name,
            cnic: changes.cnic,
            credit_card_number: changes.credit_card_number,
            age: changes.age,
            date_of_birth: changes.date_of_birth,
            about_info: changes.about_info,
            profile_image: changes.profile_image,
            hide_email: changes.hide_email,
            current_password: changes.current_password,
            new_password: changes.new_password,
            confirm_password: changes.confirm_password,
        }
    }
}

#[derive(Serialize)]
pub struct JsonSeller {
    id: i64,
    user_name: String,
    rating: f64,
    clicks: u64,
    number_of_games: u32,
    badge: &'static str,
    requirements_change_window_hours: u32,
}

impl JsonSeller {
    pub fn new(seller: &Seller, user_name: String) -> Self {
        Self {
            id: seller.id.0,
            user_name,
            rating: seller.rating,
            clicks: seller.clicks,
            number_of_games: seller.number_of_games,
            badge: seller.badge.label(),
            requirements_change_window_hours: seller.requirements_change_window_hours,
        }
    }
}

impl From<SellerSummary> for JsonSeller {
    fn from(summary: SellerSummary) -> Self {
        JsonSeller::new(&summary.seller, summary.user_name)
    }
}

#[derive(Serialize)]
pub struct JsonSellerProfile {
    #[serde(flatten)]
    seller: JsonSeller,
    starting_price: Option<u32>,
    total_orders: usize,
    recent_buyers: Vec<String>,
}

#[derive(Serialize)]
pub struct JsonPublicProfile {
    user_name: String,
    full_name: String,
    email: Option<String>,
    joining_date: DateTime<Utc>,
    age: Option<u32>,
    about_info: String,
    profile_image: String,
    seller: Option<JsonSellerProfile>,
}

impl From<PublicProfile> for JsonPublicProfile {
    fn from(profile: PublicProfile) -> Self {
        let seller = profile.seller.map(|s: SellerProfile| JsonSellerProfile {
            seller: JsonSeller::new(&s.seller, profile.user_name.clone()),
            starting_price: s.starting_price,
            total_orders: s.total_orders,
            recent_buyers: s.recent_buyers,
        });
        Self {
            user_name: profile.user_name,
            full_name: profile.full_name,
            email: profile.email,
            joining_date: profile.joining_date,
            age: profile.age,
            about_info: profile.about_info,
            profile_image: profile.profile_image,
            seller,
        }
    }
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

pub async fn signup(
    State(app_state): State<AppState>,
    Json(body): Json<JsonSignupRequest>,
) -> Result<(StatusCode, Json<JsonOwnProfile>), ServiceError> {
    let registration = Registration {
        email: body.email,
        user_name: body.user_name,
        password: body.password,
        password_confirmation: body.password_confirmation,
    };
    let user = app_state.app.register_use_case.register(registration).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(app_state): State<AppState>,
    Json(body): Json<JsonLoginRequest>,
) -> Result<Json<AuthBody>, ServiceError> {
    let user = app_state
        .app
        .login_use_case
        .login(&body.email, &body.password)
        .await?;
    let token = generate_jwt(user.id)
        .map_err(|_| ServiceError::Internal("Token creation error".to_string()))?;
    Ok(Json(AuthBody { token }))
}

pub async fn get_own_profile(
    AuthUser(user_id): AuthUser,
    State(app_state): State<AppState>,
) -> Result<Json<JsonOwnProfile>, ServiceError> {
    let user = app_state
        .app
        .get_own_profile_use_case
        .get_own_profile(user_id)
        .await?;
    Ok(Json(user.into()))
}

pub async fn update_profile(
    AuthUser(user_id): AuthUser,
    State(app_state): State<AppState>,
    Json(body): Json<JsonProfileChanges>,
) -> Result<Json<JsonOwnProfile>, ServiceError> {
    let user = app_state
        .app
        .update_profile_use_case
        .update_profile(user_id, body.into())
        .await?;
    Ok(Json(user.into()))
}

pub async fn become_seller(
    AuthUser(user_id): AuthUser,
    State(app_state): State<AppState>,
) -> Result<Json<JsonSeller>, ServiceError> {
    let seller = app_state
        .app
        .become_seller_use_case
        .become_seller(user_id)
        .await?;
    let user = app_state
        .app
        .get_own_profile_use_case
        .get_own_profile(user_id)
        .await?;
    Ok(Json(JsonSeller::new(&seller, user.user_name)))
}

pub async fn get_public_profile(
    Path(user_name): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<JsonPublicProfile>, ServiceError> {
    let profile = app_state
        .app
        .public_profile_use_case
        .display_public_profile(&user_name)
        .await?;
    Ok(Json(profile.into()))
}

pub async fn list_sellers(
    State(app_state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<JsonSeller>>, ServiceError> {
    let sellers = app_state
        .app
        .seller_directory_use_case
        .list_sellers(query.search.as_deref())
        .await?;
    Ok(Json(sellers.into_iter().map(JsonSeller::from).collect()))
}

pub async fn games_for_seller(
    Path(id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<JsonOfferedGame>>, ServiceError> {
    let games = app_state
        .app
        .seller_directory_use_case
        .games_for_seller(SellerId(id))
        .await?;
    Ok(Json(games.into_iter().map(JsonOfferedGame::from).collect()))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use boost_market_app::domain::{seller::SellerRepository, user::UserRepository};
    use serde_json::json;

    use crate::http::test_support::{send, test_router, token_for};

    #[tokio::test]
    async fn test_signup_then_login() {
        let (store, router) = test_router().await;
        let (status, body) = send(
            &router,
            "POST",
            "/accounts/signup",
            None,
            Some(json!({
                "email": "sara@example.com",
                "user_name": "sara",
                "password": "tr1cky-booster",
                "password_confirmation": "tr1cky-booster",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user_name"], "sara");
        assert!(body.get("password_hash").is_none());
        assert!(store.get_user_by_email("sara@example.com").await.is_ok());

        let (status, body) = send(
            &router,
            "POST",
            "/accounts/login",
            None,
            Some(json!({ "email": "sara@example.com", "password": "tr1cky-booster" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();

        let (status, body) = send(&router, "GET", "/accounts/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "sara@example.com");
    }

    #[tokio::test]
    async fn test_signup_conflict_and_bad_login() {
        let (store, router) = test_router().await;
        store.seed_user("sara", "tr1cky-booster", false).await;

        let (status, _) = send(
            &router,
            "POST",
            "/accounts/signup",
            None,
            Some(json!({
                "email": "sara@example.com",
                "user_name": "other",
                "password": "tr1cky-booster",
                "password_confirmation": "tr1cky-booster",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(
            &router,
            "POST",
            "/accounts/login",
            None,
            Some(json!({ "email": "sara@example.com", "password": "wrong" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Wrong credentials");
    }

    #[tokio::test]
    async fn test_own_profile_requires_token() {
        let (_, router) = test_router().await;
        let (status, _) = send(&router, "GET", "/accounts/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&router, "GET", "/accounts/me", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_update_profile() {
        let (store, router) = test_router().await;
        let user = store.seed_user("sara", "old-password", false).await;
        let token = token_for(user.id);

        let (status, body) = send(
            &router,
            "PATCH",
            "/accounts/me",
            Some(&token),
            Some(json!({ "full_name": "Sara Khan", "hide_email": false })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["full_name"], "Sara Khan");

        let (status, body) = send(
            &router,
            "PATCH",
            "/accounts/me",
            Some(&token),
            Some(json!({ "age": 200 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_public_profile_and_seller_directory() {
        let (store, router) = test_router().await;
        let user = store.seed_user("booster", "pw-pw-pw-pw", false).await;
        let token = token_for(user.id);

        let (status, body) = send(&router, "GET", "/accounts/booster", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], serde_json::Value::Null);
        assert_eq!(body["seller"], serde_json::Value::Null);

        let (status, body) =
            send(&router, "POST", "/accounts/me/seller", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_name"], "booster");
        assert_eq!(body["badge"], "Bronze");
        assert_eq!(body["rating"], 2.5);

        let (status, body) = send(&router, "GET", "/accounts/booster", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["seller"]["total_orders"], 0);

        let (status, body) = send(&router, "GET", "/sellers?search=BOO", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        let (_, body) = send(&router, "GET", "/sellers?search=nobody", None, None).await;
        assert!(body.as_array().unwrap().is_empty());

        let seller = store.get_seller_by_user(user.id).await.unwrap();
        let (status, body) = send(
            &router,
            "GET",
            &format!("/sellers/{}/games", seller.id),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());

        let (status, _) = send(&router, "GET", "/accounts/ghost", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
