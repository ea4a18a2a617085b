//! Extensions for results coming out of the store

use super::error::Error;

pub trait ResultExt<T> {
    /// Treat a missing row as `Error::NotFound` instead of a database failure
    fn not_found(self) -> Result<T, Error>;
}

impl<T> ResultExt<T> for Result<T, sqlx::Error> {
    fn not_found(self) -> Result<T, Error> {
        match self {
            Ok(value) => Ok(value),
            Err(sqlx::Error::RowNotFound) => Err(Error::NotFound),
            Err(e) => Err(Error::Sqlx(e)),
        }
    }
}
