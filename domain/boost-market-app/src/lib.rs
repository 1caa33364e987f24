use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{
    domain::{
        buyer::BuyerRepository,
        game::GameRepository,
        offering::OfferingRepository,
        order::OrderRepository,
        rating::AverageRatingService,
        review::{ReviewRepository, RustrictContentPolicy},
        seller::SellerRepository,
        user::UserRepository,
    },
    ports::password::PasswordHasher,
    processes::{
        click_counter::{ClickCounterJob, click_channel},
        late_orders::{LATE_ORDER_CHECK_INTERVAL, LateOrderJob},
    },
    workflow::{
        account::{
            become_seller::{BecomeSellerUseCase, BecomeSellerUseCaseImpl},
            get_profile::{GetOwnProfileUseCase, GetOwnProfileUseCaseImpl},
            login::{LoginUseCase, LoginUseCaseImpl},
            public_profile::{PublicProfileUseCase, PublicProfileUseCaseImpl},
            register::{RegisterUseCase, RegisterUseCaseImpl},
            sellers::{SellerDirectoryUseCase, SellerDirectoryUseCaseImpl},
            update_profile::{UpdateProfileUseCase, UpdateProfileUseCaseImpl},
        },
        catalog::{
            game_sellers::{GameSellersUseCase, GameSellersUseCaseImpl},
            list_games::{ListGamesUseCase, ListGamesUseCaseImpl},
            manage::{ManageCatalogUseCase, ManageCatalogUseCaseImpl},
            offerings::{OfferingsUseCase, OfferingsUseCaseImpl},
        },
        order::{
            list_mine::{MyOrdersUseCase, MyOrdersUseCaseImpl},
            mark_late::MarkLateOrdersWorkflowImpl,
            place::{PlaceOrderUseCase, PlaceOrderUseCaseImpl},
            requirements::{ChangeRequirementsUseCase, ChangeRequirementsUseCaseImpl},
            status::{UpdateStatusUseCase, UpdateStatusUseCaseImpl},
        },
        rating::query::{RatingQueryUseCase, RatingQueryUseCaseImpl},
        review::{
            edit::{EditReviewUseCase, EditReviewUseCaseImpl},
            query::{ReviewQueryUseCase, ReviewQueryUseCaseImpl},
            recompute::RecomputeRatingsWorkflowImpl,
        },
    },
};

pub mod domain;
pub mod ports;
pub mod processes;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod workflow;

pub struct Application {
    pub jobs: JoinHandle<()>,

    pub register_use_case: Box<dyn RegisterUseCase + Send + Sync + 'static>,
    pub login_use_case: Box<dyn LoginUseCase + Send + Sync + 'static>,
    pub get_own_profile_use_case: Box<dyn GetOwnProfileUseCase + Send + Sync + 'static>,
    pub update_profile_use_case: Box<dyn UpdateProfileUseCase + Send + Sync + 'static>,
    pub public_profile_use_case: Box<dyn PublicProfileUseCase + Send + Sync + 'static>,
    pub seller_directory_use_case: Box<dyn SellerDirectoryUseCase + Send + Sync + 'static>,
    pub become_seller_use_case: Box<dyn BecomeSellerUseCase + Send + Sync + 'static>,

    pub list_games_use_case: Box<dyn ListGamesUseCase + Send + Sync + 'static>,
    pub game_sellers_use_case: Box<dyn GameSellersUseCase + Send + Sync + 'static>,
    pub offerings_use_case: Box<dyn OfferingsUseCase + Send + Sync + 'static>,
    pub manage_catalog_use_case: Box<dyn ManageCatalogUseCase + Send + Sync + 'static>,

    pub place_order_use_case: Box<dyn PlaceOrderUseCase + Send + Sync + 'static>,
    pub my_orders_use_case: Box<dyn MyOrdersUseCase + Send + Sync + 'static>,
    pub change_requirements_use_case: Box<dyn ChangeRequirementsUseCase + Send + Sync + 'static>,
    pub update_status_use_case: Box<dyn UpdateStatusUseCase + Send + Sync + 'static>,

    pub review_query_use_case: Box<dyn ReviewQueryUseCase + Send + Sync + 'static>,
    pub edit_review_use_case: Box<dyn EditReviewUseCase + Send + Sync + 'static>,
    pub rating_query_use_case: Box<dyn RatingQueryUseCase + Send + Sync + 'static>,
}

pub async fn build_application<
    U: UserRepository + Send + Sync + 'static,
    S: SellerRepository + Send + Sync + 'static,
    B: BuyerRepository + Send + Sync + 'static,
    G: GameRepository + Send + Sync + 'static,
    O: OfferingRepository + Send + Sync + 'static,
    R: OrderRepository + Send + Sync + 'static,
    V: ReviewRepository + Send + Sync + 'static,
    P: PasswordHasher + Send + Sync + 'static,
>(
    user_repository: Arc<U>,
    seller_repository: Arc<S>,
    buyer_repository: Arc<B>,
    game_repository: Arc<G>,
    offering_repository: Arc<O>,
    order_repository: Arc<R>,
    review_repository: Arc<V>,
    password_hasher: Arc<P>,
) -> Application {
    let rating_service = Arc::new(AverageRatingService::new());
    let content_policy = Arc::new(RustrictContentPolicy::new());
    let (click_signal, click_receiver) = click_channel();
    let click_signal = Arc::new(click_signal);

    let recompute_workflow = Arc::new(RecomputeRatingsWorkflowImpl::new(
        seller_repository.clone(),
        game_repository.clone(),
        review_repository.clone(),
        rating_service.clone(),
    ));
    let mark_late_workflow = Arc::new(MarkLateOrdersWorkflowImpl::new(order_repository.clone()));

    let click_counter_job = ClickCounterJob::new(
        click_receiver,
        seller_repository.clone(),
        game_repository.clone(),
    );
    let late_order_job = LateOrderJob::new(mark_late_workflow.clone(), LATE_ORDER_CHECK_INTERVAL);

    let jobs = tokio::spawn(async move {
        futures::join!(click_counter_job.run(), late_order_job.run());
    });

    Application {
        jobs,

        register_use_case: Box::new(RegisterUseCaseImpl::new(
            user_repository.clone(),
            password_hasher.clone(),
        )),
        login_use_case: Box::new(LoginUseCaseImpl::new(
            user_repository.clone(),
            password_hasher.clone(),
        )),
        get_own_profile_use_case: Box::new(GetOwnProfileUseCaseImpl::new(user_repository.clone())),
        update_profile_use_case: Box::new(UpdateProfileUseCaseImpl::new(
            user_repository.clone(),
            password_hasher.clone(),
        )),
        public_profile_use_case: Box::new(PublicProfileUseCaseImpl::new(
            user_repository.clone(),
            seller_repository.clone(),
            buyer_repository.clone(),
            offering_repository.clone(),
            order_repository.clone(),
            click_signal.clone(),
        )),
        seller_directory_use_case: Box::new(SellerDirectoryUseCaseImpl::new(
            seller_repository.clone(),
            offering_repository.clone(),
            game_repository.clone(),
        )),
        become_seller_use_case: Box::new(BecomeSellerUseCaseImpl::new(
            user_repository.clone(),
            seller_repository.clone(),
        )),

        list_games_use_case: Box::new(ListGamesUseCaseImpl::new(game_repository.clone())),
        game_sellers_use_case: Box::new(GameSellersUseCaseImpl::new(
            game_repository.clone(),
            offering_repository.clone(),
            seller_repository.clone(),
            user_repository.clone(),
            click_signal.clone(),
        )),
        offerings_use_case: Box::new(OfferingsUseCaseImpl::new(
            seller_repository.clone(),
            offering_repository.clone(),
            game_repository.clone(),
        )),
        manage_catalog_use_case: Box::new(ManageCatalogUseCaseImpl::new(
            user_repository.clone(),
            game_repository.clone(),
            seller_repository.clone(),
        )),

        place_order_use_case: Box::new(PlaceOrderUseCaseImpl::new(
            buyer_repository.clone(),
            seller_repository.clone(),
            game_repository.clone(),
            offering_repository.clone(),
            order_repository.clone(),
        )),
        my_orders_use_case: Box::new(MyOrdersUseCaseImpl::new(
            buyer_repository.clone(),
            order_repository.clone(),
            game_repository.clone(),
        )),
        change_requirements_use_case: Box::new(ChangeRequirementsUseCaseImpl::new(
            buyer_repository.clone(),
            seller_repository.clone(),
            offering_repository.clone(),
            order_repository.clone(),
            review_repository.clone(),
            recompute_workflow.clone(),
        )),
        update_status_use_case: Box::new(UpdateStatusUseCaseImpl::new(
            buyer_repository.clone(),
            seller_repository.clone(),
            order_repository.clone(),
        )),

        review_query_use_case: Box::new(ReviewQueryUseCaseImpl::new(review_repository.clone())),
        edit_review_use_case: Box::new(EditReviewUseCaseImpl::new(
            buyer_repository.clone(),
            order_repository.clone(),
            review_repository.clone(),
            content_policy.clone(),
            recompute_workflow.clone(),
        )),
        rating_query_use_case: Box::new(RatingQueryUseCaseImpl::new(
            seller_repository.clone(),
            game_repository.clone(),
            offering_repository.clone(),
        )),
    }
}
