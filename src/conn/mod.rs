//! Management of connections for chat rooms

pub mod event;
mod room;
mod state;

mod client;
pub use client::{Client, ClientConfig, ClientHandle};

mod hub;
pub use hub::Hub;
pub use state::HubStatus;

#[cfg(test)]
mod tests;
