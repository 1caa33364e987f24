use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post, put},
};
use boost_market_app::Application;
use log::info;

mod accounts;
mod catalog;
mod orders;
mod ratings;
mod reviews;

#[derive(Clone)]
pub struct AppState {
    pub app: Arc<Application>,
}

pub fn router(app: Arc<Application>) -> Router {
    Router::new()
        .route("/accounts/signup", post(accounts::signup))
        .route("/accounts/login", post(accounts::login))
        .route(
            "/accounts/me",
            get(accounts::get_own_profile).patch(accounts::update_profile),
        )
        .route("/accounts/me/seller", post(accounts::become_seller))
        .route("/accounts/{user_name}", get(accounts::get_public_profile))
        .route("/sellers", get(accounts::list_sellers))
        .route("/sellers/{id}/games", get(accounts::games_for_seller))
        .route("/sellers/{id}/badge", put(catalog::set_badge))
        .route("/games", get(catalog::list_games).post(catalog::create_game))
        .route(
            "/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route("/games/{id}/sellers", get(catalog::sellers_for_game))
        .route(
            "/offerings",
            get(catalog::my_offerings).post(catalog::add_offering),
        )
        .route("/orders", post(orders::place_order))
        .route("/orders/mine", get(orders::my_orders))
        .route("/orders/{id}/status", put(orders::update_status))
        .nest("/api", api_router())
        .with_state(AppState { app })
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/", get(ratings::api_overview))
        .route("/rating/seller", get(ratings::seller_ratings))
        .route("/rating/game", get(ratings::game_ratings))
        .route("/rating/seller/{id}", get(ratings::seller_rating))
        .route("/rating/game/{id}", get(ratings::game_rating))
        .route("/rating/seller/{id}/game", get(ratings::seller_game_ratings))
        .route("/rating/game/{id}/seller", get(ratings::game_seller_ratings))
        .route(
            "/rating/seller/{seller_id}/game/{game_id}",
            get(ratings::seller_game_rating),
        )
        .route(
            "/rating/game/{game_id}/seller/{seller_id}",
            get(ratings::game_seller_rating),
        )
        .route(
            "/review/order",
            get(reviews::list_reviews).put(reviews::put_review),
        )
        .route(
            "/review/order/{order_id}",
            get(reviews::get_review)
                .patch(reviews::patch_review)
                .delete(reviews::delete_review),
        )
        .route(
            "/order/{id}",
            patch(orders::update_requirements).delete(orders::delete_order),
        )
}

pub async fn run(
    app: Arc<Application>,
    host: &str,
    port: u16,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;

    info!("HTTP API listening on {}:{}", host, port);
    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("HTTP API shut down gracefully");
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use boost_market_app::{
        build_application,
        domain::UserId,
        testing::{FakePasswordHasher, InMemoryStore},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::jwt::generate_jwt;

    pub async fn test_router() -> (Arc<InMemoryStore>, Router) {
        let store = Arc::new(InMemoryStore::new());
        let app = build_application(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(FakePasswordHasher),
        )
        .await;
        (store, super::router(Arc::new(app)))
    }

    pub fn token_for(user_id: UserId) -> String {
        generate_jwt(user_id).unwrap()
    }

    pub async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}
