use chrono::Utc;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub user_name: String,
    pub password_hash: String,
    pub full_name: String,
    pub joining_date: chrono::DateTime<Utc>,
    pub age: Option<i32>,
    pub date_of_birth: Option<chrono::DateTime<Utc>>,
    pub about_info: String,
    pub cnic: String,
    pub credit_card_number: String,
    pub profile_image: String,
    pub hide_email: bool,
    pub is_staff: bool,
    pub is_active: bool,
    pub is_superuser: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
