//! Black-box test suite for the player management HTTP API.
//!
//! [`client::ApiClient`] wraps the five endpoints, [`suite`] drives them through
//! an ordered login / create / read / list / delete scenario and cleans up
//! after itself.

pub mod auth;
pub mod config;
pub mod error;
pub mod fake;
pub mod logging;
pub mod player;
pub mod schema;
pub mod soft;
pub mod util;

#[cfg(feature = "client")]
pub mod client;
#[cfg(feature = "client")]
pub mod suite;

pub use crate::{
    auth::{AuthToken, Credentials},
    config::{Config, SuiteSettings},
    error::{ConfigError, SuiteError},
    player::{Player, PlayerCreateRequest, PlayerId, PlayerLookupRequest},
    soft::SoftAssertions,
};

#[cfg(feature = "client")]
pub use crate::{
    client::{ApiClient, ApiResponse},
    suite::{SuiteContext, SuiteReport, run_suite},
};
