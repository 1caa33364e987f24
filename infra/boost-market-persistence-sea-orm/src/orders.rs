use boost_market_app::domain::{
    BuyerId, GameId, OrderId, RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError,
    SellerId,
    order::{NewOrder, Order, OrderRepository, OrderRequirements, OrderStatus},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionError, TransactionTrait, prelude::Expr,
};

use crate::{
    create_error,
    entity::{order, review},
    repo_error, retrieve_error, update_error,
};

pub struct OrderRepositoryImpl {
    db: DatabaseConnection,
}

impl OrderRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_order(model: order::Model) -> Result<Order, String> {
        let status = OrderStatus::from_code(&model.status)
            .ok_or_else(|| format!("Unknown order status '{}'", model.status))?;
        Ok(Order {
            id: OrderId(model.id),
            buyer_id: BuyerId(model.buyer_id),
            seller_id: SellerId(model.seller_id),
            game_id: GameId(model.game_id),
            requirements: OrderRequirements {
                gaming_account_id: model.gaming_account_id,
                gaming_account_password: model.gaming_account_password,
                price: model.price as u32,
                description: model.description,
                days_to_complete: model.days_to_complete as u32,
            },
            start_time: model.start_time,
            status,
        })
    }

    fn order_to_model(order: &Order) -> order::ActiveModel {
        order::ActiveModel {
            id: Set(order.id.0),
            buyer_id: Set(order.buyer_id.0),
            seller_id: Set(order.seller_id.0),
            game_id: Set(order.game_id.0),
            gaming_account_id: Set(order.requirements.gaming_account_id.clone()),
            gaming_account_password: Set(order.requirements.gaming_account_password.clone()),
            price: Set(order.requirements.price as i32),
            description: Set(order.requirements.description.clone()),
            days_to_complete: Set(order.requirements.days_to_complete as i32),
            start_time: Set(order.start_time),
            status: Set(order.status.code().to_string()),
        }
    }

    async fn list_where(
        &self,
        column: order::Column,
        value: sea_orm::Value,
    ) -> Result<Vec<Order>, RepoError> {
        let models = order::Entity::find()
            .filter(column.eq(value))
            .order_by_asc(order::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_error)?;
        models
            .into_iter()
            .map(|m| Self::model_to_order(m).map_err(RepoError::StorageError))
            .collect()
    }
}

#[async_trait::async_trait]
impl OrderRepository for OrderRepositoryImpl {
    async fn create_order(&self, new_order: NewOrder) -> Result<Order, RepoCreateError> {
        let mut active_model = Self::order_to_model(&new_order.into_order(OrderId(0)));
        active_model.id = NotSet;
        let model = active_model.insert(&self.db).await.map_err(create_error)?;
        Self::model_to_order(model).map_err(RepoCreateError::StorageError)
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, RepoRetrieveError> {
        let model = order::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(retrieve_error)?
            .ok_or(RepoRetrieveError::NotFound)?;
        Self::model_to_order(model).map_err(RepoRetrieveError::StorageError)
    }

    async fn update_requirements(&self, order: &Order) -> Result<(), RepoUpdateError> {
        let requirements = &order.requirements;
        let res = order::Entity::update_many()
            .col_expr(order::Column::GameId, Expr::value(order.game_id.0))
            .col_expr(
                order::Column::GamingAccountId,
                Expr::value(requirements.gaming_account_id.clone()),
            )
            .col_expr(
                order::Column::GamingAccountPassword,
                Expr::value(requirements.gaming_account_password.clone()),
            )
            .col_expr(order::Column::Price, Expr::value(requirements.price as i32))
            .col_expr(
                order::Column::Description,
                Expr::value(requirements.description.clone()),
            )
            .col_expr(
                order::Column::DaysToComplete,
                Expr::value(requirements.days_to_complete as i32),
            )
            .filter(order::Column::Id.eq(order.id.0))
            .exec(&self.db)
            .await
            .map_err(update_error)?;
        if res.rows_affected == 0 {
            return Err(RepoUpdateError::NotFound);
        }
        Ok(())
    }

    async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, RepoUpdateError> {
        let res = order::Entity::update_many()
            .col_expr(order::Column::Status, Expr::value(to.code()))
            .filter(order::Column::Id.eq(id.0))
            .filter(order::Column::Status.eq(from.code()))
            .exec(&self.db)
            .await
            .map_err(update_error)?;
        if res.rows_affected > 0 {
            return Ok(true);
        }
        let exists = order::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(update_error)?
            .is_some();
        if exists {
            Ok(false)
        } else {
            Err(RepoUpdateError::NotFound)
        }
    }

    async fn delete_order(&self, id: OrderId) -> Result<(), RepoUpdateError> {
        let res = self
            .db
            .transaction::<_, (), RepoUpdateError>(|c| {
                Box::pin(async move {
                    review::Entity::delete_many()
                        .filter(review::Column::OrderId.eq(id.0))
                        .exec(c)
                        .await
                        .map_err(update_error)?;
                    let deleted = order::Entity::delete_by_id(id.0)
                        .exec(c)
                        .await
                        .map_err(update_error)?;
                    if deleted.rows_affected == 0 {
                        return Err(RepoUpdateError::NotFound);
                    }
                    Ok(())
                })
            })
            .await;
        match res {
            Ok(()) => Ok(()),
            Err(TransactionError::Transaction(e)) => Err(e),
            Err(TransactionError::Connection(e)) => Err(update_error(e)),
        }
    }

    async fn list_by_buyer(&self, buyer_id: BuyerId) -> Result<Vec<Order>, RepoError> {
        self.list_where(order::Column::BuyerId, buyer_id.0.into())
            .await
    }

    async fn list_by_seller(&self, seller_id: SellerId) -> Result<Vec<Order>, RepoError> {
        self.list_where(order::Column::SellerId, seller_id.0.into())
            .await
    }

    async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, RepoError> {
        self.list_where(order::Column::Status, status.code().into())
            .await
    }
}
