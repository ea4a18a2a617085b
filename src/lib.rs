mod api;
pub mod conn;
mod core;
pub mod service;
pub mod store;
mod util;

pub use crate::core::Error;
pub use api::make_app;
pub use util::config::Config;
