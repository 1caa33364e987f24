use boost_market_persistence_sea_orm::{create_db_pool, create_tables, database_url_from_env};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let pool = create_db_pool(&database_url_from_env())
        .await
        .expect("Failed to connect to database");

    create_tables(&pool)
        .await
        .expect("Failed to create database tables");

    println!("Created database tables successfully");
}
