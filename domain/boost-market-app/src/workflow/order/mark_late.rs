use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{
    RepoError, RepoUpdateError,
    order::{OrderRepository, OrderStatus},
};

#[async_trait::async_trait]
pub trait MarkLateOrdersWorkflow {
    /// Moves every overdue active order to `Late`. Returns how many changed.
    async fn mark_late_orders(&self, now: DateTime<Utc>) -> Result<usize, MarkLateOrdersError>;
}

#[derive(Debug)]
pub enum MarkLateOrdersError {
    RepositoryError,
}

pub struct MarkLateOrdersWorkflowImpl<R: OrderRepository> {
    order_repository: Arc<R>,
}

impl<R: OrderRepository> MarkLateOrdersWorkflowImpl<R> {
    pub fn new(order_repository: Arc<R>) -> Self {
        Self { order_repository }
    }
}

#[async_trait::async_trait]
impl<R: OrderRepository + Send + Sync + 'static> MarkLateOrdersWorkflow
    for MarkLateOrdersWorkflowImpl<R>
{
    async fn mark_late_orders(&self, now: DateTime<Utc>) -> Result<usize, MarkLateOrdersError> {
        let active = match self.order_repository.list_by_status(OrderStatus::Active).await {
            Ok(orders) => orders,
            Err(RepoError::StorageError(e)) => {
                log::error!("Failed to list active orders: {}", e);
                return Err(MarkLateOrdersError::RepositoryError);
            }
        };

        let mut marked = 0;
        for order in active.into_iter().filter(|o| o.is_late(now)) {
            match self
                .order_repository
                .update_status(order.id, OrderStatus::Active, OrderStatus::Late)
                .await
            {
                Ok(true) => marked += 1,
                Ok(false) => log::debug!("Order {} left Active before it was marked late", order.id),
                Err(RepoUpdateError::NotFound) => {
                    log::debug!("Order {} was deleted before it was marked late", order.id)
                }
                Err(e) => log::error!("Failed to mark order {} as late: {}", order.id, e),
            }
        }
        if marked > 0 {
            log::info!("Marked {} orders as late", marked);
        }
        Ok(marked)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::testing::{InMemoryStore, InterleavedOrders};

    #[tokio::test]
    async fn test_marks_only_overdue_active_orders() {
        let store = Arc::new(InMemoryStore::new());
        let offer = store.seed_offer().await;
        let now = Utc::now();
        // sample requirements take three days
        let overdue = store.seed_order(&offer, now - TimeDelta::days(4)).await;
        let on_time = store.seed_order(&offer, now - TimeDelta::days(1)).await;
        let delivered = store.seed_order(&offer, now - TimeDelta::days(5)).await;
        store.set_status(delivered.id, OrderStatus::Delivered);

        let workflow = MarkLateOrdersWorkflowImpl::new(store.clone());
        assert_eq!(workflow.mark_late_orders(now).await.unwrap(), 1);

        assert_eq!(store.get_order(overdue.id).await.unwrap().status, OrderStatus::Late);
        assert_eq!(store.get_order(on_time.id).await.unwrap().status, OrderStatus::Active);
        assert_eq!(
            store.get_order(delivered.id).await.unwrap().status,
            OrderStatus::Delivered
        );

        assert_eq!(workflow.mark_late_orders(now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delivery_during_sweep_is_kept() {
        let store = Arc::new(InMemoryStore::new());
        let offer = store.seed_offer().await;
        let now = Utc::now();
        let overdue = store.seed_order(&offer, now - TimeDelta::days(4)).await;
        let orders = Arc::new(InterleavedOrders::new(store.clone()));
        orders.before_next_write(overdue.id, OrderStatus::Delivered);

        let workflow = MarkLateOrdersWorkflowImpl::new(orders);
        assert_eq!(workflow.mark_late_orders(now).await.unwrap(), 0);
        assert_eq!(
            store.get_order(overdue.id).await.unwrap().status,
            OrderStatus::Delivered
        );
    }

    #[tokio::test]
    async fn test_far_deadline_is_never_late() {
        let store = Arc::new(InMemoryStore::new());
        let offer = store.seed_offer().await;
        let now = Utc::now();
        let order = store.seed_order(&offer, now - TimeDelta::days(30)).await;
        let mut far = order.clone();
        far.requirements.days_to_complete = u32::MAX;
        store.update_requirements(&far).await.unwrap();

        let workflow = MarkLateOrdersWorkflowImpl::new(store.clone());
        assert_eq!(workflow.mark_late_orders(now).await.unwrap(), 0);
        assert_eq!(store.get_order(order.id).await.unwrap().status, OrderStatus::Active);
    }
}
