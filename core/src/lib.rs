//! Order state synchronizer for the pizza ordering widget.
//!
//! # Overview
//! Keeps a local view-model (the order snapshot, the topping checkboxes and
//! the pizza artwork state) consistent with the remote order API. User
//! actions become `HttpRequest` values; the host executes them and hands the
//! `HttpResponse` back (host-does-IO pattern), which keeps the core
//! deterministic and testable.
//!
//! # Design
//! - `OrderClient` is stateless: it builds requests and parses responses.
//! - `ViewState` is an immutable snapshot advanced by `state::reduce`.
//! - `OrderStateSynchronizer` issues sequence tickets so stale responses are
//!   discarded, and tracks pending topping changes so failures roll back.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod image;
pub mod projection;
pub mod state;
pub mod synchronizer;
pub mod types;

pub use client::OrderClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use image::PizzaImageState;
pub use projection::{AvailableTopping, Pending, ToppingProjection};
pub use state::{reduce, Action, ToppingChange, ViewState};
pub use synchronizer::{Applied, Dispatch, OrderStateSynchronizer};
pub use types::{Order, OrderId, Pizza, PizzaSize, PizzaSpec, Topping, ToppingAmount, ToppingRequest, ToppingType};
