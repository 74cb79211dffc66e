//! Leave list filter extractor
//!
//! Reads the raw query pairs, keeping duplicates and original key casing, and
//! hands them to the domain filter parser.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use leave_core::LeaveFilter;

use crate::response::ApiError;

#[derive(Debug, Clone, Default)]
pub struct LeaveFilterQuery(pub LeaveFilter);

#[async_trait]
impl<S> FromRequestParts<S> for LeaveFilterQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_body(e.to_string()))?;

        Ok(Self(LeaveFilter::from_params(pairs)?))
    }
}
