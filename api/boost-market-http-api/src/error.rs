use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use boost_market_app::workflow::{
    account::{
        become_seller::BecomeSellerError, get_profile::GetProfileError, login::LoginError,
        public_profile::PublicProfileError, register::RegisterError,
        sellers::SellerDirectoryError, update_profile::UpdateProfileError,
    },
    catalog::{
        game_sellers::GameSellersError, list_games::ListGamesError, manage::ManageCatalogError,
        offerings::OfferingsError,
    },
    order::{
        list_mine::MyOrdersError, place::PlaceOrderError, requirements::ChangeRequirementsError,
        status::UpdateStatusError,
    },
    rating::query::RatingQueryError,
    review::{edit::EditReviewError, query::ReviewQueryError},
};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    fn internal() -> Self {
        ServiceError::Internal("Internal server error".to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

impl From<RegisterError> for ServiceError {
    fn from(e: RegisterError) -> Self {
        match e {
            RegisterError::InvalidInput(_) => ServiceError::BadRequest(e.to_string()),
            RegisterError::EmailTaken | RegisterError::UserNameTaken => {
                ServiceError::Conflict(e.to_string())
            }
            RegisterError::RepositoryError => ServiceError::internal(),
        }
    }
}

impl From<LoginError> for ServiceError {
    fn from(e: LoginError) -> Self {
        match e {
            LoginError::InvalidCredentials => {
                ServiceError::Unauthorized("Wrong credentials".to_string())
            }
            LoginError::RepositoryError => ServiceError::internal(),
        }
    }
}

impl From<GetProfileError> for ServiceError {
    fn from(e: GetProfileError) -> Self {
        match e {
            GetProfileError::NotFound => ServiceError::NotFound("User not found".to_string()),
            GetProfileError::RepositoryError => ServiceError::internal(),
        }
    }
}

impl From<UpdateProfileError> for ServiceError {
    fn from(e: UpdateProfileError) -> Self {
        match e {
            UpdateProfileError::InvalidInput(_) | UpdateProfileError::IncorrectPassword => {
                ServiceError::BadRequest(e.to_string())
            }
            UpdateProfileError::NotFound => ServiceError::NotFound(e.to_string()),
            UpdateProfileError::RepositoryError => ServiceError::internal(),
        }
    }
}

impl From<PublicProfileError> for ServiceError {
    fn from(e: PublicProfileError) -> Self {
        match e {
            PublicProfileError::NotFound => ServiceError::NotFound("User not found".to_string()),
            PublicProfileError::RepositoryError => ServiceError::internal(),
        }
    }
}

impl From<SellerDirectoryError> for ServiceError {
    fn from(e: SellerDirectoryError) -> Self {
        match e {
            SellerDirectoryError::SellerNotFound => {
                ServiceError::NotFound("Seller not found".to_string())
            }
            SellerDirectoryError::RepositoryError => ServiceError::internal(),
        }
    }
}

impl From<BecomeSellerError> for ServiceError {
    fn from(e: BecomeSellerError) -> Self {
        match e {
            BecomeSellerError::UserNotFound => ServiceError::NotFound("User not found".to_string()),
            BecomeSellerError::RepositoryError => ServiceError::internal(),
        }
    }
}

impl From<ListGamesError> for ServiceError {
    fn from(e: ListGamesError) -> Self {
        match e {
            ListGamesError::RepositoryError => ServiceError::internal(),
        }
    }
}

impl From<GameSellersError> for ServiceError {
    fn from(e: GameSellersError) -> Self {
        match e {
            GameSellersError::GameNotFound => ServiceError::NotFound("Game not found".to_string()),
            GameSellersError::RepositoryError => ServiceError::internal(),
        }
    }
}

impl From<OfferingsError> for ServiceError {
    fn from(e: OfferingsError) -> Self {
        match e {
            OfferingsError::GameNotFound => ServiceError::NotFound(e.to_string()),
            OfferingsError::AlreadyOffered => ServiceError::Conflict(e.to_string()),
            OfferingsError::InvalidInput(_) => ServiceError::BadRequest(e.to_string()),
            OfferingsError::RepositoryError => ServiceError::internal(),
        }
    }
}

impl From<ManageCatalogError> for ServiceError {
    fn from(e: ManageCatalogError) -> Self {
        match e {
            ManageCatalogError::Forbidden => ServiceError::Forbidden(e.to_string()),
            ManageCatalogError::InvalidInput(_) | ManageCatalogError::UnknownCategory => {
                ServiceError::BadRequest(e.to_string())
            }
            ManageCatalogError::SellerNotFound => ServiceError::NotFound(e.to_string()),
            ManageCatalogError::RepositoryError => ServiceError::internal(),
        }
    }
}

impl From<PlaceOrderError> for ServiceError {
    fn from(e: PlaceOrderError) -> Self {
        match e {
            PlaceOrderError::SellerNotFound | PlaceOrderError::GameNotFound => {
                ServiceError::NotFound(e.to_string())
            }
            PlaceOrderError::NotOffered
            | PlaceOrderError::SelfOrder
            | PlaceOrderError::InvalidInput(_) => ServiceError::BadRequest(e.to_string()),
            PlaceOrderError::RepositoryError => ServiceError::internal(),
        }
    }
}

impl From<MyOrdersError> for ServiceError {
    fn from(e: MyOrdersError) -> Self {
        match e {
            MyOrdersError::RepositoryError => ServiceError::internal(),
        }
    }
}

impl From<ChangeRequirementsError> for ServiceError {
    fn from(e: ChangeRequirementsError) -> Self {
        match e {
            ChangeRequirementsError::NotFound => ServiceError::NotFound(e.to_string()),
            ChangeRequirementsError::Forbidden(_) => ServiceError::Forbidden(e.to_string()),
            ChangeRequirementsError::InvalidInput(_) => ServiceError::BadRequest(e.to_string()),
            ChangeRequirementsError::RepositoryError => ServiceError::internal(),
        }
    }
}

impl From<UpdateStatusError> for ServiceError {
    fn from(e: UpdateStatusError) -> Self {
        match e {
            UpdateStatusError::NotFound => ServiceError::NotFound(e.to_string()),
            UpdateStatusError::Forbidden => ServiceError::Forbidden(e.to_string()),
            UpdateStatusError::InvalidTransition { .. } => ServiceError::BadRequest(e.to_string()),
            UpdateStatusError::RepositoryError => ServiceError::internal(),
        }
    }
}

impl From<ReviewQueryError> for ServiceError {
    fn from(e: ReviewQueryError) -> Self {
        match e {
            ReviewQueryError::NotFound => ServiceError::NotFound("Not found".to_string()),
            ReviewQueryError::RepositoryError => ServiceError::internal(),
        }
    }
}

impl From<EditReviewError> for ServiceError {
    fn from(e: EditReviewError) -> Self {
        match e {
            EditReviewError::NotFound => ServiceError::NotFound(e.to_string()),
            EditReviewError::Forbidden(_) => ServiceError::Forbidden(e.to_string()),
            EditReviewError::InvalidInput(_) => ServiceError::BadRequest(e.to_string()),
            EditReviewError::RepositoryError => ServiceError::internal(),
        }
    }
}

impl From<RatingQueryError> for ServiceError {
    fn from(e: RatingQueryError) -> Self {
        match e {
            RatingQueryError::NotFound => ServiceError::NotFound("Not found".to_string()),
            RatingQueryError::RepositoryError => ServiceError::internal(),
        }
    }
}
