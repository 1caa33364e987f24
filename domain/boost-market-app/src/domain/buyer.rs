use crate::domain::{BuyerId, RepoError, RepoRetrieveError, UserId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Buyer {
    pub id: BuyerId,
    pub user_id: UserId,
}

#[async_trait::async_trait]
pub trait BuyerRepository {
    async fn get_or_create_buyer(&self, user_id: UserId) -> Result<Buyer, RepoError>;
    async fn get_buyer(&self, id: BuyerId) -> Result<Buyer, RepoRetrieveError>;
    async fn get_buyer_by_user(&self, user_id: UserId) -> Result<Buyer, RepoRetrieveError>;
}
