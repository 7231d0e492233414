pub mod api;

#[cfg(any(feature = "client", test))]
pub mod client;

pub mod leaderboard;

#[cfg(any(feature = "server", test))]
pub mod app_config;
#[cfg(any(feature = "server", test))]
mod handlers;
#[cfg(any(feature = "server", test))]
pub mod ratings_repository;
#[cfg(any(feature = "server", test))]
pub mod settings;
