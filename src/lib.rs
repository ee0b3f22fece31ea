// src/lib.rs
//! Client core for a laboratory equipment inventory system.
//!
//! The crate has two halves. The session shell ([`session`], [`navigation`])
//! decides which screens a signed-in user may reach on each platform. The
//! report engine ([`reports`], [`polling`]) fetches collections from the
//! backend through [`api::LabApi`], aggregates them into chart-ready series
//! and renders exportable documents.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod polling;
pub mod reports;
pub mod session;

pub use api::{ApiClient, LabApi, Resource};
pub use config::{load_config, Config};
pub use error::{Alert, AlertKind, ClientError, ClientResult};
pub use navigation::{resolve_navigation, Navigation, Platform, Screen};
pub use polling::{PollOutcome, Poller};
pub use session::{Session, SessionState};
