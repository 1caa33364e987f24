use boost_market_app::domain::user::{NewUser, UserRepository};
use boost_market_persistence_sea_orm::{
    create_db_pool, create_tables, database_url_from_env, users::UserRepositoryImpl,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: {} <email> <user_name> <password>", args[0]);
        std::process::exit(2);
    }

    let pool = create_db_pool(&database_url_from_env())
        .await
        .expect("Failed to connect to database");
    create_tables(&pool)
        .await
        .expect("Failed to create database tables");

    let password_hash =
        bcrypt::hash(&args[3], bcrypt::DEFAULT_COST).expect("Failed to hash password");
    let users = UserRepositoryImpl::new(pool);
    let user = users
        .create_user(NewUser::superuser(
            &args[1],
            &args[2],
            password_hash,
            chrono::Utc::now(),
        ))
        .await
        .expect("Failed to create staff account");

    println!("Created staff account {} with id {}", user.user_name, user.id);
}
