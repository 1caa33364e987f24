pub mod buyer;
pub mod category;
pub mod game;
pub mod game_category;
pub mod order;
pub mod review;
pub mod seller;
pub mod seller_game;
pub mod user;
