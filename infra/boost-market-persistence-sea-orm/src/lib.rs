use boost_market_app::domain::{RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema, SqlErr,
    sea_query::Index,
};

pub mod buyers;
pub mod entity;
pub mod games;
pub mod offerings;
pub mod orders;
pub mod reviews;
pub mod sellers;
pub mod users;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://boost-market.db?mode=rwc";

pub fn database_url_from_env() -> String {
    std::env::var("BOOST_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

pub async fn create_db_pool(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(5).sqlx_logging(false);
    Database::connect(opt).await
}

/// Creates every table and index that does not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());
    let statements = vec![
        schema.create_table_from_entity(entity::user::Entity),
        schema.create_table_from_entity(entity::seller::Entity),
        schema.create_table_from_entity(entity::buyer::Entity),
        schema.create_table_from_entity(entity::category::Entity),
        schema.create_table_from_entity(entity::game::Entity),
        schema.create_table_from_entity(entity::game_category::Entity),
        schema.create_table_from_entity(entity::seller_game::Entity),
        schema.create_table_from_entity(entity::order::Entity),
        schema.create_table_from_entity(entity::review::Entity),
    ];
    for mut statement in statements {
        statement.if_not_exists();
        db.execute(&statement).await?;
    }

    // a seller offers each game once
    let offering_index = Index::create()
        .name("idx_seller_games_seller_game")
        .table(entity::seller_game::Entity)
        .col(entity::seller_game::Column::SellerId)
        .col(entity::seller_game::Column::GameId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(&offering_index).await?;
    Ok(())
}

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn repo_error(e: DbErr) -> RepoError {
    RepoError::StorageError(e.to_string())
}

fn retrieve_error(e: DbErr) -> RepoRetrieveError {
    RepoRetrieveError::StorageError(e.to_string())
}

fn create_error(e: DbErr) -> RepoCreateError {
    if is_unique_violation(&e) {
        RepoCreateError::Conflict
    } else {
        RepoCreateError::StorageError(e.to_string())
    }
}

fn update_error(e: DbErr) -> RepoUpdateError {
    if is_unique_violation(&e) {
        RepoUpdateError::Conflict
    } else {
        RepoUpdateError::StorageError(e.to_string())
    }
}

#[cfg(test)]
pub(crate) async fn test_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    create_tables(&db).await.unwrap();
    db
}
