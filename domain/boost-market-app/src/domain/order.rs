use chrono::{DateTime, TimeDelta, Utc};
use validator::Validate;

use crate::domain::{
    BuyerId, GameId, OrderId, RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError,
    SellerId,
};

/// Longest deadline an order may ask for.
pub const MAX_DAYS_TO_COMPLETE: u32 = 3650;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    #[default]
    Active,
    Completed,
    Delivered,
    Canceled,
    Late,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Active,
        OrderStatus::Completed,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
        OrderStatus::Late,
    ];

    /// Two-letter code used in storage and on the wire.
    pub fn code(self) -> &'static str {
        match self {
            OrderStatus::Active => "at",
            OrderStatus::Completed => "cp",
            OrderStatus::Delivered => "dl",
            OrderStatus::Canceled => "cd",
            OrderStatus::Late => "lt",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Active => "Active",
            OrderStatus::Completed => "Completed",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Canceled => "Canceled",
            OrderStatus::Late => "Late",
        }
    }

    pub fn can_transition(self, to: OrderStatus, party: OrderParty) -> bool {
        use OrderStatus::*;
        match party {
            OrderParty::Seller => matches!(
                (self, to),
                (Active | Late, Delivered) | (Active | Late, Canceled)
            ),
            OrderParty::Buyer => matches!((self, to), (Delivered, Completed) | (Active, Canceled)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderParty {
    Buyer,
    Seller,
}

#[derive(Clone, Debug, PartialEq, Eq, Validate)]
pub struct OrderRequirements {
    #[validate(length(min = 1, max = 100, message = "Gaming account id must be 1 to 100 characters"))]
    pub gaming_account_id: String,
    #[validate(length(min = 1, max = 50, message = "Password must be 1 to 50 characters"))]
    pub gaming_account_password: String,
    pub price: u32,
    #[validate(length(max = 999, message = "Description cannot exceed 999 characters"))]
    pub description: String,
    #[validate(range(
        min = 1,
        max = MAX_DAYS_TO_COMPLETE,
        message = "An order takes between 1 and 3650 days"
    ))]
    pub days_to_complete: u32,
}

/// Partial update of an order's requirements; `None` leaves a field unchanged.
#[derive(Clone, Debug, Default)]
pub struct RequirementsUpdate {
    pub gaming_account_id: Option<String>,
    pub gaming_account_password: Option<String>,
    pub price: Option<u32>,
    pub game_id: Option<GameId>,
    pub description: Option<String>,
    pub days_to_complete: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: BuyerId,
    pub seller_id: SellerId,
    pub game_id: GameId,
    pub requirements: OrderRequirements,
    pub start_time: DateTime<Utc>,
    pub status: OrderStatus,
}

impl Order {
    /// Saturates at the latest representable instant.
    pub fn due_time(&self) -> DateTime<Utc> {
        TimeDelta::try_days(self.requirements.days_to_complete as i64)
            .and_then(|days| self.start_time.checked_add_signed(days))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Negative once the due date has passed.
    pub fn remaining_time(&self, now: DateTime<Utc>) -> TimeDelta {
        self.due_time() - now
    }

    pub fn is_late(&self, now: DateTime<Utc>) -> bool {
        self.remaining_time(now) < TimeDelta::zero()
    }

    pub fn requirements_editable_until(&self, window_hours: u32) -> DateTime<Utc> {
        TimeDelta::try_hours(window_hours as i64)
            .and_then(|window| self.start_time.checked_add_signed(window))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn can_change_requirements(&self, window_hours: u32, now: DateTime<Utc>) -> bool {
        now < self.requirements_editable_until(window_hours)
    }

    pub fn party(&self, buyer_id: Option<BuyerId>, seller_id: Option<SellerId>) -> Option<OrderParty> {
        if buyer_id == Some(self.buyer_id) {
            Some(OrderParty::Buyer)
        } else if seller_id == Some(self.seller_id) {
            Some(OrderParty::Seller)
        } else {
            None
        }
    }

    /// Applies the update and validates the result. The order is left
    /// untouched when validation fails.
    pub fn apply_update(&mut self, update: RequirementsUpdate) -> Result<(), String> {
        let mut requirements = self.requirements.clone();
        if let Some(v) = update.gaming_account_id {
            requirements.gaming_account_id = v;
        }
        if let Some(v) = update.gaming_account_password {
            requirements.gaming_account_password = v;
        }
        if let Some(v) = update.price {
            requirements.price = v;
        }
        if let Some(v) = update.description {
            requirements.description = v;
        }
        if let Some(v) = update.days_to_complete {
            requirements.days_to_complete = v;
        }
        requirements.validate().map_err(|e| e.to_string())?;
        self.requirements = requirements;
        if let Some(game_id) = update.game_id {
            self.game_id = game_id;
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct NewOrder {
    pub buyer_id: BuyerId,
    pub seller_id: SellerId,
    pub game_id: GameId,
    pub requirements: OrderRequirements,
    pub start_time: DateTime<Utc>,
}

impl NewOrder {
    pub fn into_order(self, id: OrderId) -> Order {
        Order {
            id,
            buyer_id: self.buyer_id,
            seller_id: self.seller_id,
            game_id: self.game_id,
            requirements: self.requirements,
            start_time: self.start_time,
            status: OrderStatus::Active,
        }
    }
}

#[async_trait::async_trait]
pub trait OrderRepository {
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepoCreateError>;
    async fn get_order(&self, id: OrderId) -> Result<Order, RepoRetrieveError>;
    /// Writes the game and requirements. The stored status is left alone.
    async fn update_requirements(&self, order: &Order) -> Result<(), RepoUpdateError>;
    /// Moves the order to `to` only while its stored status is still `from`.
    /// Returns whether the status changed.
    async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, RepoUpdateError>;
    /// Also removes the order's review.
    async fn delete_order(&self, id: OrderId) -> Result<(), RepoUpdateError>;
    async fn list_by_buyer(&self, buyer_id: BuyerId) -> Result<Vec<Order>, RepoError>;
    async fn list_by_seller(&self, seller_id: SellerId) -> Result<Vec<Order>, RepoError>;
    async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, RepoError>;
}

/// Distinct buyers of the given orders, most recent order first.
pub fn recent_buyers(orders: &[Order], limit: usize) -> Vec<BuyerId> {
    let mut sorted: Vec<&Order> = orders.iter().collect();
    sorted.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    let mut buyers = Vec::new();
    for order in sorted {
        if buyers.len() == limit {
            break;
        }
        if !buyers.contains(&order.buyer_id) {
            buyers.push(order.buyer_id);
        }
    }
    buyers
}
