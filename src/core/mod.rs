//! Building blocks shared by every layer: errors, constants and validators

pub mod constant;
pub mod validator;

mod error;
pub use error::Error;

mod result;
pub use result::ResultExt;
