use crate::domain::{game::Game, offering::Offering, seller::SellerSummary};

pub mod game_sellers;
pub mod list_games;
pub mod manage;
pub mod offerings;

/// An offering together with the game it is for.
#[derive(Clone, Debug, PartialEq)]
pub struct OfferedGame {
    pub offering: Offering,
    pub game: Game,
}

/// An offering together with the seller making it.
#[derive(Clone, Debug, PartialEq)]
pub struct GameOffer {
    pub offering: Offering,
    pub seller: SellerSummary,
}
