use crate::domain::order::Order;

pub mod list_mine;
pub mod mark_late;
pub mod place;
pub mod requirements;
pub mod status;

#[derive(Clone, Debug, PartialEq)]
pub struct OrderView {
    pub order: Order,
    pub game_name: String,
}
