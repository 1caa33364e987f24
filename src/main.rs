use std::sync::Arc;

use boost_market_app::{build_application, ports::password::BcryptPasswordHasher};
use boost_market_persistence_sea_orm::{
    buyers::BuyerRepositoryImpl, create_db_pool, create_tables, games::GameRepositoryImpl,
    offerings::OfferingRepositoryImpl, orders::OrderRepositoryImpl,
    reviews::ReviewRepositoryImpl, sellers::SellerRepositoryImpl, users::UserRepositoryImpl,
};
use log::{LevelFilter, error, info};
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        rolling_file::{
            RollingFileAppender,
            policy::compound::{
                CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
            },
        },
    },
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};

const LOG_SIZE_LIMIT: u64 = 10 * 1024 * 1024; // 10 MB

const LOG_FILE_COUNT: u32 = 3;

struct Config {
    database_url: String,
    host: String,
    http_port: u16,
    bcrypt_cost: u32,
    log_file_path: String,
    log_archive_pattern: String,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    fn from_env() -> Result<Self, String> {
        let http_port = env_or("BOOST_HTTP_PORT", "8000")
            .parse()
            .map_err(|e| format!("BOOST_HTTP_PORT is not a valid port: {}", e))?;
        let bcrypt_cost = match std::env::var("BOOST_BCRYPT_COST") {
            Ok(cost) => cost
                .parse()
                .map_err(|e| format!("BOOST_BCRYPT_COST is not a number: {}", e))?,
            Err(_) => bcrypt::DEFAULT_COST,
        };
        Ok(Self {
            database_url: boost_market_persistence_sea_orm::database_url_from_env(),
            host: env_or("BOOST_HOST", "127.0.0.1"),
            http_port,
            bcrypt_cost,
            log_file_path: env_or("LOG_FILE_PATH", "logs/boost-market.log"),
            log_archive_pattern: env_or("LOG_ARCHIVE_PATTERN", "logs/boost-market.{}.log.gz"),
        })
    }
}

fn init_logger(config: &Config) {
    let stderr_level = LevelFilter::Info;
    let file_level = LevelFilter::Debug;

    let stderr = ConsoleAppender::builder().target(Target::Stderr).build();

    let trigger = SizeTrigger::new(LOG_SIZE_LIMIT);
    let roller = FixedWindowRoller::builder()
        .build(&config.log_archive_pattern, LOG_FILE_COUNT)
        .expect("Invalid log archive pattern");
    let policy = CompoundPolicy::new(Box::new(trigger), Box::new(roller));

    let logfile = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d} {l} {t} - {m}\n")))
        .build(&config.log_file_path, Box::new(policy))
        .expect("Failed to open log file");

    let log_config = log4rs::Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(file_level)))
                .build("logfile", Box::new(logfile)),
        )
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(stderr_level)))
                .build("stderr", Box::new(stderr)),
        )
        .build(
            Root::builder()
                .appender("logfile")
                .appender("stderr")
                .build(LevelFilter::Trace),
        )
        .expect("Invalid logger configuration");

    let _handle = log4rs::init_config(log_config).expect("Failed to initialize logger");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received. Preparing graceful exit...");
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    init_logger(&config);

    let db = create_db_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    create_tables(&db)
        .await
        .expect("Failed to create database tables");

    let app = Arc::new(
        build_application(
            Arc::new(UserRepositoryImpl::new(db.clone())),
            Arc::new(SellerRepositoryImpl::new(db.clone())),
            Arc::new(BuyerRepositoryImpl::new(db.clone())),
            Arc::new(GameRepositoryImpl::new(db.clone())),
            Arc::new(OfferingRepositoryImpl::new(db.clone())),
            Arc::new(OrderRepositoryImpl::new(db.clone())),
            Arc::new(ReviewRepositoryImpl::new(db)),
            Arc::new(BcryptPasswordHasher::new(config.bcrypt_cost)),
        )
        .await,
    );

    info!("Starting application");

    if let Err(e) =
        boost_market_http_api::run(app, &config.host, config.http_port, shutdown_signal()).await
    {
        error!("HTTP server failed: {}", e);
        std::process::exit(1);
    }

    info!("Application shut down");
}
