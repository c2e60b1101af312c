use axum::extract::{rejection::QueryRejection, Extension, Query, State};
use serde::Deserialize;

use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::LoggedInUser;
use crate::response::{ApiResponse, CollectionResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageParams {
    /// Page number and page size with defaults applied and the size capped.
    /// Zero values pass through untouched so the listing rejects them.
    pub fn resolve(&self, default_page_size: u32, max_page_size: u32) -> (u32, u32) {
        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(default_page_size).min(max_page_size);
        (page, page_size)
    }
}

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<CollectionResponse<User>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::InvalidPagination {
        message: "Invalid pagination parameters.".to_string(),
        detailed: Some(e.body_text()),
    })?;

    let listing = &state.config.listing;
    let (page, page_size) = params.resolve(listing.default_page_size, listing.max_page_size);

    let users = state.users.paginate_get_all(page, page_size).await?;
    Ok(CollectionResponse::from_listing(users).await?)
}

/// GET /api/users/me
pub async fn me(Extension(current): Extension<LoggedInUser>) -> ApiResponse<User> {
    ApiResponse::success(current.into_user())
}
