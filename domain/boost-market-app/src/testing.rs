//! In-memory implementations of every repository, used by the workflow tests
//! here and by the HTTP API tests.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicI64, Ordering},
};

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::{
    domain::{
        BuyerId, CategoryId, GameId, OfferingId, OrderId, RepoCreateError, RepoError,
        RepoRetrieveError, RepoUpdateError, ReviewId, SellerId, UserId,
        buyer::{Buyer, BuyerRepository},
        click::ClickEvent,
        game::{Category, Game, GameRepository, NewGame},
        name_matches,
        offering::{NewOffering, Offering, OfferingRepository},
        order::{NewOrder, Order, OrderRepository, OrderRequirements, OrderStatus},
        review::{Review, ReviewRepository},
        seller::{BadgeRank, Seller, SellerRepository, SellerSummary},
        user::{NewUser, User, UserRepository},
    },
    ports::{click::ClickSignalPort, password::PasswordHasher},
};

pub struct InMemoryStore {
    next_id: AtomicI64,
    role_lock: Mutex<()>,
    users: DashMap<UserId, User>,
    sellers: DashMap<SellerId, Seller>,
    buyers: DashMap<BuyerId, Buyer>,
    categories: DashMap<CategoryId, Category>,
    games: DashMap<GameId, Game>,
    offerings: DashMap<OfferingId, Offering>,
    orders: DashMap<OrderId, Order>,
    reviews: DashMap<ReviewId, Review>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            role_lock: Mutex::new(()),
            users: DashMap::new(),
            sellers: DashMap::new(),
            buyers: DashMap::new(),
            categories: DashMap::new(),
            games: DashMap::new(),
            offerings: DashMap::new(),
            orders: DashMap::new(),
            reviews: DashMap::new(),
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn lock_roles(&self) -> Result<std::sync::MutexGuard<'_, ()>, RepoError> {
        self.role_lock
            .lock()
            .map_err(|_| RepoError::StorageError("role lock poisoned".to_string()))
    }

    fn order_ids_where(&self, predicate: impl Fn(&Order) -> bool) -> Vec<OrderId> {
        self.orders
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| *entry.key())
            .collect()
    }

    /// Creates an active user whose password is `password` under
    /// [`FakePasswordHasher`].
    pub async fn seed_user(&self, user_name: &str, password: &str, is_staff: bool) -> User {
        let user = NewUser {
            email: format!("{}@example.com", user_name),
            user_name: user_name.to_string(),
            password_hash: FakePasswordHasher.hash_password(password).unwrap_or_default(),
            joining_date: Utc::now(),
            is_staff,
            is_superuser: false,
        };
        match self.create_user(user).await {
            Ok(user) => user,
            Err(e) => panic!("seeding user {} failed: {}", user_name, e),
        }
    }

    /// A seller offering one game and a user about to buy it.
    pub async fn seed_offer(&self) -> SeededOffer {
        let seller_user = self.seed_user("booster", "pw-pw-pw-pw", false).await;
        let buyer_user = self.seed_user("gamer", "pw-pw-pw-pw", false).await;
        let seller = self.get_or_create_seller(seller_user.id).await;
        let game = self
            .create_game(NewGame {
                name: "Valorant".to_string(),
                description: "Tactical shooter".to_string(),
                image: None,
                category_ids: vec![],
            })
            .await;
        let (Ok(seller), Ok(game)) = (seller, game) else {
            panic!("seeding offer failed");
        };
        let offering = self
            .create_offering(NewOffering {
                seller_id: seller.id,
                game_id: game.id,
                price: Some(30),
                description: None,
            })
            .await;
        if offering.is_err() {
            panic!("seeding offering failed");
        }
        SeededOffer {
            seller_user,
            buyer_user,
            seller,
            game,
        }
    }

    /// Places an order for the seeded offer as if it started at `start_time`.
    pub async fn seed_order(&self, offer: &SeededOffer, start_time: DateTime<Utc>) -> Order {
        let Ok(buyer) = self.get_or_create_buyer(offer.buyer_user.id).await else {
            panic!("seeding buyer failed");
        };
        let order = NewOrder {
            buyer_id: buyer.id,
            seller_id: offer.seller.id,
            game_id: offer.game.id,
            requirements: sample_requirements(),
            start_time,
        };
        match self.create_order(order).await {
            Ok(order) => order,
            Err(e) => panic!("seeding order failed: {}", e),
        }
    }

    /// Overwrites an order's status regardless of the transition rules.
    pub fn set_status(&self, id: OrderId, status: OrderStatus) {
        match self.orders.get_mut(&id) {
            Some(mut order) => order.status = status,
            None => panic!("order {} is not seeded", id),
        }
    }

    fn ratings_for_orders(&self, order_ids: &[OrderId]) -> Vec<f64> {
        self.reviews
            .iter()
            .filter(|entry| order_ids.contains(&entry.value().order_id))
            .map(|entry| entry.value().rating)
            .collect()
    }
}

pub struct SeededOffer {
    pub seller_user: User,
    pub buyer_user: User,
    pub seller: Seller,
    pub game: Game,
}

pub fn sample_requirements() -> OrderRequirements {
    OrderRequirements {
        gaming_account_id: "gamer#EUW".to_string(),
        gaming_account_password: "hunter22".to_string(),
        price: 30,
        description: "Silver to Gold".to_string(),
        days_to_complete: 3,
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted_by_key<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(|item| key(item));
    items
}

#[async_trait::async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, RepoCreateError> {
        let taken = self
            .users
            .iter()
            .any(|u| u.email == user.email || u.user_name == user.user_name);
        if taken {
            return Err(RepoCreateError::Conflict);
        }
        let user = user.into_user(UserId(self.next_id()));
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<User, RepoRetrieveError> {
        self.users
            .get(&id)
            .map(|u| u.clone())
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, RepoRetrieveError> {
        self.users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.clone())
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn get_user_by_name(&self, user_name: &str) -> Result<User, RepoRetrieveError> {
        self.users
            .iter()
            .find(|u| u.user_name == user_name)
            .map(|u| u.clone())
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn update_user(&self, user: &User) -> Result<(), RepoUpdateError> {
        let Some(mut stored) = self.users.get_mut(&user.id) else {
            return Err(RepoUpdateError::NotFound);
        };
        *stored = user.clone();
        Ok(())
    }
}

#[async_trait::async_trait]
impl SellerRepository for InMemoryStore {
    async fn get_or_create_seller(&self, user_id: UserId) -> Result<Seller, RepoError> {
        let _guard = self.lock_roles()?;
        if let Some(seller) = self.sellers.iter().find(|s| s.user_id == user_id) {
            return Ok(seller.clone());
        }
        let seller = Seller::new(SellerId(self.next_id()), user_id);
        self.sellers.insert(seller.id, seller.clone());
        Ok(seller)
    }

    async fn get_seller(&self, id: SellerId) -> Result<Seller, RepoRetrieveError> {
        self.sellers
            .get(&id)
            .map(|s| s.clone())
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn get_seller_by_user(&self, user_id: UserId) -> Result<Seller, RepoRetrieveError> {
        self.sellers
            .iter()
            .find(|s| s.user_id == user_id)
            .map(|s| s.clone())
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn list_sellers(
        &self,
        name_filter: Option<&str>,
    ) -> Result<Vec<SellerSummary>, RepoError> {
        let sellers: Vec<Seller> = self.sellers.iter().map(|s| s.clone()).collect();
        let mut summaries = Vec::new();
        for seller in sellers {
            let Some(user_name) = self.users.get(&seller.user_id).map(|u| u.user_name.clone())
            else {
                continue;
            };
            if name_filter.is_some_and(|f| !name_matches(&user_name, f)) {
                continue;
            }
            summaries.push(SellerSummary { seller, user_name });
        }
        Ok(sorted_by_key(summaries, |s| s.seller.id))
    }

    async fn set_rating(&self, id: SellerId, rating: f64) -> Result<(), RepoUpdateError> {
        let mut seller = self.sellers.get_mut(&id).ok_or(RepoUpdateError::NotFound)?;
        seller.rating = rating;
        Ok(())
    }

    async fn set_number_of_games(&self, id: SellerId, count: u32) -> Result<(), RepoUpdateError> {
        let mut seller = self.sellers.get_mut(&id).ok_or(RepoUpdateError::NotFound)?;
        seller.number_of_games = count;
        Ok(())
    }

    async fn set_badge(&self, id: SellerId, badge: BadgeRank) -> Result<(), RepoUpdateError> {
        let mut seller = self.sellers.get_mut(&id).ok_or(RepoUpdateError::NotFound)?;
        seller.badge = badge;
        Ok(())
    }

    async fn increment_clicks(&self, id: SellerId) -> Result<(), RepoUpdateError> {
        let mut seller = self.sellers.get_mut(&id).ok_or(RepoUpdateError::NotFound)?;
        seller.clicks += 1;
        Ok(())
    }
}

#[async_trait::async_trait]
impl BuyerRepository for InMemoryStore {
    async fn get_or_create_buyer(&self, user_id: UserId) -> Result<Buyer, RepoError> {
        let _guard = self.lock_roles()?;
        if let Some(buyer) = self.buyers.iter().find(|b| b.user_id == user_id) {
            return Ok(buyer.clone());
        }
        let buyer = Buyer {
            id: BuyerId(self.next_id()),
            user_id,
        };
        self.buyers.insert(buyer.id, buyer.clone());
        Ok(buyer)
    }

    async fn get_buyer(&self, id: BuyerId) -> Result<Buyer, RepoRetrieveError> {
        self.buyers
            .get(&id)
            .map(|b| b.clone())
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn get_buyer_by_user(&self, user_id: UserId) -> Result<Buyer, RepoRetrieveError> {
        self.buyers
            .iter()
            .find(|b| b.user_id == user_id)
            .map(|b| b.clone())
            .ok_or(RepoRetrieveError::NotFound)
    }
}

#[async_trait::async_trait]
impl GameRepository for InMemoryStore {
    async fn create_category(&self, name: &str) -> Result<Category, RepoCreateError> {
        let category = Category {
            id: CategoryId(self.next_id()),
            name: name.to_string(),
        };
        self.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepoError> {
        let categories = self.categories.iter().map(|c| c.clone()).collect();
        Ok(sorted_by_key(categories, |c: &Category| c.id))
    }

    async fn create_game(&self, game: NewGame) -> Result<Game, RepoCreateError> {
        let mut categories = Vec::new();
        for id in &game.category_ids {
            let category = self
                .categories
                .get(id)
                .map(|c| c.clone())
                .ok_or(RepoCreateError::Conflict)?;
            categories.push(category);
        }
        let game = game.into_game(GameId(self.next_id()), categories);
        self.games.insert(game.id, game.clone());
        Ok(game)
    }

    async fn get_game(&self, id: GameId) -> Result<Game, RepoRetrieveError> {
        self.games
            .get(&id)
            .map(|g| g.clone())
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn list_games(&self, name_filter: Option<&str>) -> Result<Vec<Game>, RepoError> {
        let games = self
            .games
            .iter()
            .filter(|g| name_filter.is_none_or(|f| name_matches(&g.name, f)))
            .map(|g| g.clone())
            .collect();
        Ok(sorted_by_key(games, |g: &Game| g.id))
    }

    async fn set_rating(&self, id: GameId, rating: f64) -> Result<(), RepoUpdateError> {
        let mut game = self.games.get_mut(&id).ok_or(RepoUpdateError::NotFound)?;
        game.rating = rating;
        Ok(())
    }

    async fn increment_clicks(&self, id: GameId) -> Result<(), RepoUpdateError> {
        let mut game = self.games.get_mut(&id).ok_or(RepoUpdateError::NotFound)?;
        game.clicks += 1;
        Ok(())
    }
}

#[async_trait::async_trait]
impl OfferingRepository for InMemoryStore {
    async fn create_offering(&self, offering: NewOffering) -> Result<Offering, RepoCreateError> {
        let duplicate = self
            .offerings
            .iter()
            .any(|o| o.seller_id == offering.seller_id && o.game_id == offering.game_id);
        if duplicate {
            return Err(RepoCreateError::Conflict);
        }
        let offering = Offering {
            id: OfferingId(self.next_id()),
            seller_id: offering.seller_id,
            game_id: offering.game_id,
            price: offering.price,
            description: offering.description,
        };
        self.offerings.insert(offering.id, offering.clone());
        Ok(offering)
    }

    async fn get_offering(
        &self,
        seller_id: SellerId,
        game_id: GameId,
    ) -> Result<Offering, RepoRetrieveError> {
        self.offerings
            .iter()
            .find(|o| o.seller_id == seller_id && o.game_id == game_id)
            .map(|o| o.clone())
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn list_by_seller(&self, seller_id: SellerId) -> Result<Vec<Offering>, RepoError> {
        let offerings = self
            .offerings
            .iter()
            .filter(|o| o.seller_id == seller_id)
            .map(|o| o.clone())
            .collect();
        Ok(sorted_by_key(offerings, |o: &Offering| o.id))
    }

    async fn list_by_game(&self, game_id: GameId) -> Result<Vec<Offering>, RepoError> {
        let offerings = self
            .offerings
            .iter()
            .filter(|o| o.game_id == game_id)
            .map(|o| o.clone())
            .collect();
        Ok(sorted_by_key(offerings, |o: &Offering| o.id))
    }
}

#[async_trait::async_trait]
impl OrderRepository for InMemoryStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepoCreateError> {
        let order = order.into_order(OrderId(self.next_id()));
        self.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, RepoRetrieveError> {
        self.orders
            .get(&id)
            .map(|o| o.clone())
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn update_requirements(&self, order: &Order) -> Result<(), RepoUpdateError> {
        let mut stored = self
            .orders
            .get_mut(&order.id)
            .ok_or(RepoUpdateError::NotFound)?;
        stored.game_id = order.game_id;
        stored.requirements = order.requirements.clone();
        Ok(())
    }

    async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, RepoUpdateError> {
        let mut stored = self.orders.get_mut(&id).ok_or(RepoUpdateError::NotFound)?;
        if stored.status != from {
            return Ok(false);
        }
        stored.status = to;
        Ok(true)
    }

    async fn delete_order(&self, id: OrderId) -> Result<(), RepoUpdateError> {
        if self.orders.remove(&id).is_none() {
            return Err(RepoUpdateError::NotFound);
        }
        self.reviews.retain(|_, review| review.order_id != id);
        Ok(())
    }

    async fn list_by_buyer(&self, buyer_id: BuyerId) -> Result<Vec<Order>, RepoError> {
        let orders = self
            .orders
            .iter()
            .filter(|o| o.buyer_id == buyer_id)
            .map(|o| o.clone())
            .collect();
        Ok(sorted_by_key(orders, |o: &Order| o.id))
    }

    async fn list_by_seller(&self, seller_id: SellerId) -> Result<Vec<Order>, RepoError> {
        let orders = self
            .orders
            .iter()
            .filter(|o| o.seller_id == seller_id)
            .map(|o| o.clone())
            .collect();
        Ok(sorted_by_key(orders, |o: &Order| o.id))
    }

    async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, RepoError> {
        let orders = self
            .orders
            .iter()
            .filter(|o| o.status == status)
            .map(|o| o.clone())
            .collect();
        Ok(sorted_by_key(orders, |o: &Order| o.id))
    }
}

#[async_trait::async_trait]
impl ReviewRepository for InMemoryStore {
    async fn upsert_review(
        &self,
        order_id: OrderId,
        rating: f64,
        comment: &str,
    ) -> Result<Review, RepoError> {
        let existing = self
            .reviews
            .iter()
            .find(|r| r.order_id == order_id)
            .map(|r| r.id);
        let review = Review {
            id: existing.unwrap_or_else(|| ReviewId(self.next_id())),
            order_id,
            rating,
            comment: comment.to_string(),
        };
        self.reviews.insert(review.id, review.clone());
        Ok(review)
    }

    async fn get_review_by_order(&self, order_id: OrderId) -> Result<Review, RepoRetrieveError> {
        self.reviews
            .iter()
            .find(|r| r.order_id == order_id)
            .map(|r| r.clone())
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn list_reviews(&self) -> Result<Vec<Review>, RepoError> {
        let reviews = self.reviews.iter().map(|r| r.clone()).collect();
        Ok(sorted_by_key(reviews, |r: &Review| r.id))
    }

    async fn delete_review_by_order(&self, order_id: OrderId) -> Result<(), RepoUpdateError> {
        let before = self.reviews.len();
        self.reviews.retain(|_, review| review.order_id != order_id);
        if self.reviews.len() == before {
            return Err(RepoUpdateError::NotFound);
        }
        Ok(())
    }

    async fn ratings_for_seller(&self, seller_id: SellerId) -> Result<Vec<f64>, RepoError> {
        let order_ids = self.order_ids_where(|o| o.seller_id == seller_id);
        Ok(self.ratings_for_orders(&order_ids))
    }

    async fn ratings_for_game(&self, game_id: GameId) -> Result<Vec<f64>, RepoError> {
        let order_ids = self.order_ids_where(|o| o.game_id == game_id);
        Ok(self.ratings_for_orders(&order_ids))
    }
}

/// Stores passwords with a visible prefix instead of hashing them.
/// Order repository over an [`InMemoryStore`] that lets another writer move
/// an order to a new status right before the next write lands.
pub struct InterleavedOrders {
    store: Arc<InMemoryStore>,
    pending: Mutex<Option<(OrderId, OrderStatus)>>,
}

impl InterleavedOrders {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self {
            store,
            pending: Mutex::new(None),
        }
    }

    pub fn before_next_write(&self, id: OrderId, status: OrderStatus) {
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some((id, status));
        }
    }

    fn interleave(&self) {
        let pending = self.pending.lock().ok().and_then(|mut p| p.take());
        if let Some((id, status)) = pending {
            self.store.set_status(id, status);
        }
    }
}

#[async_trait::async_trait]
impl OrderRepository for InterleavedOrders {
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepoCreateError> {
        self.store.create_order(order).await
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, RepoRetrieveError> {
        self.store.get_order(id).await
    }

    async fn update_requirements(&self, order: &Order) -> Result<(), RepoUpdateError> {
        self.interleave();
        self.store.update_requirements(order).await
    }

    async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, RepoUpdateError> {
        self.interleave();
        self.store.update_status(id, from, to).await
    }

    async fn delete_order(&self, id: OrderId) -> Result<(), RepoUpdateError> {
        self.interleave();
        self.store.delete_order(id).await
    }

    async fn list_by_buyer(&self, buyer_id: BuyerId) -> Result<Vec<Order>, RepoError> {
        OrderRepository::list_by_buyer(self.store.as_ref(), buyer_id).await
    }

    async fn list_by_seller(&self, seller_id: SellerId) -> Result<Vec<Order>, RepoError> {
        OrderRepository::list_by_seller(self.store.as_ref(), seller_id).await
    }

    async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, RepoError> {
        self.store.list_by_status(status).await
    }
}

pub struct FakePasswordHasher;

impl PasswordHasher for FakePasswordHasher {
    fn hash_password(&self, password: &str) -> Result<String, String> {
        Ok(format!("plain:{}", password))
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        hash.strip_prefix("plain:") == Some(password)
    }
}

/// Collects emitted clicks so tests can assert on them.
#[derive(Default)]
pub struct RecordingClickSignal {
    events: Mutex<Vec<ClickEvent>>,
}

impl RecordingClickSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ClickEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ClickSignalPort for RecordingClickSignal {
    fn emit(&self, event: ClickEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
