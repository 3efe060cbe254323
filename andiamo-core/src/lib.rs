//! Core types for andiamo.
//!
//! This crate holds everything the client needs that does not touch the network:
//! - `event` and `user` records as the backend sends them
//! - `grouping`, `selection` and `feed` for the calendar views
//! - `session` for stored credentials and role checks
//! - `config` and `forms`

pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod forms;
pub mod grouping;
pub mod selection;
pub mod session;
pub mod user;

pub use error::{AndiamoError, AndiamoResult};
pub use event::{Category, Event, EventRecord, Lieu};
pub use user::{LoginResponse, Role, User};
