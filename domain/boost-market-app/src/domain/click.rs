use crate::domain::{GameId, SellerId};

/// A counted view, emitted when a game's seller list or a seller's public
/// profile is displayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClickEvent {
    GameViewed(GameId),
    SellerProfileViewed(SellerId),
}
