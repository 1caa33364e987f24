use crate::domain::{
    GameId, OfferingId, RepoCreateError, RepoError, RepoRetrieveError, SellerId,
};

/// A seller's listing for one game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Offering {
    pub id: OfferingId,
    pub seller_id: SellerId,
    pub game_id: GameId,
    pub price: Option<u32>,
    pub description: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NewOffering {
    pub seller_id: SellerId,
    pub game_id: GameId,
    pub price: Option<u32>,
    pub description: Option<String>,
}

#[async_trait::async_trait]
pub trait OfferingRepository {
    /// Fails with `Conflict` when the seller already offers the game.
    async fn create_offering(&self, offering: NewOffering) -> Result<Offering, RepoCreateError>;
    async fn get_offering(
        &self,
        seller_id: SellerId,
        game_id: GameId,
    ) -> Result<Offering, RepoRetrieveError>;
    async fn list_by_seller(&self, seller_id: SellerId) -> Result<Vec<Offering>, RepoError>;
    async fn list_by_game(&self, game_id: GameId) -> Result<Vec<Offering>, RepoError>;
}

/// The cheapest priced offering, if any offering carries a price.
pub fn starting_price(offerings: &[Offering]) -> Option<u32> {
    offerings.iter().filter_map(|o| o.price).min()
}
