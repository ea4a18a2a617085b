//! Defines the extractors used by the room endpoints.
//!
//! Rejections from axum are turned into `Error` so every failure shares one
//! response shape.

use crate::core::Error;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

// ========================// ValidQuery //======================== //

/// Extracts the Query data from request url and validates it.
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(data) = Query::<T>::from_request_parts(parts, state).await?;
        data.validate()?;
        Ok(ValidQuery(data))
    }
}

// ========================// ValidJson //======================== //

/// Extracts the Json data from request body and validates it.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidJson(data))
    }
}

// ========================// RoomId //======================== //

/// Extracts a positive room id from the path.
pub struct RoomId(pub i64);

impl TryFrom<i64> for RoomId {
    type Error = Error;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        if id > 0 {
            Ok(RoomId(id))
        } else {
            Err(Error::InvalidRoomId)
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RoomId
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state).await?;
        RoomId::try_from(id)
    }
}
