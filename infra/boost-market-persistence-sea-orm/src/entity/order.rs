use chrono::Utc;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub game_id: i64,
    pub gaming_account_id: String,
    pub gaming_account_password: String,
    pub price: i32,
    pub description: String,
    pub days_to_complete: i32,
    pub start_time: chrono::DateTime<Utc>,
    /// Two-letter status code.
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
