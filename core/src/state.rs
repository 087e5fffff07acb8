//! Immutable view-model snapshot and the reducer that advances it.
//!
//! # Design
//! `ViewState` is never mutated in place. Every user intent, server answer
//! and transport failure becomes an `Action`, and `reduce` maps
//! `(current, action)` to the next snapshot. Server answers replace the order
//! wholesale; only the topping projection is folded.

use serde::Serialize;

use crate::image::{derive_image_state, image_state_for, PizzaImageState};
use crate::projection::ToppingProjection;
use crate::types::{Order, OrderId, PizzaSize, ToppingAmount, ToppingType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToppingChange {
    Upsert(ToppingAmount),
    Remove,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The user toggled a topping and the request carrying it got `ticket`.
    ToppingRequested {
        ticket: u64,
        topping: ToppingType,
        change: ToppingChange,
    },
    /// The server answered the request with `ticket`. `topping` is the
    /// topping that request changed, if it was a topping request.
    ServerResponse {
        ticket: u64,
        topping: Option<ToppingType>,
        order: Order,
    },
    /// The request with `ticket` failed before or at the server.
    RequestFailed { ticket: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    /// Last accepted server snapshot; `None` until the order is created.
    pub pizza_order: Option<Order>,
    pub available_toppings: ToppingProjection,
    pub image: PizzaImageState,
    /// Ticket of the response `pizza_order` came from.
    pub last_applied: Option<u64>,
}

impl Default for ViewState {
    fn default() -> Self {
        let available_toppings = ToppingProjection::default();
        let image = image_state_for(|t| available_toppings.is_selected(t));
        Self {
            pizza_order: None,
            available_toppings,
            image,
            last_applied: None,
        }
    }
}

impl ViewState {
    pub fn order_id(&self) -> Option<OrderId> {
        self.pizza_order.as_ref().map(|order| order.id)
    }

    pub fn pizza_size(&self) -> Option<PizzaSize> {
        self.pizza_order
            .as_ref()
            .and_then(|order| order.first_pizza())
            .and_then(|pizza| pizza.size)
    }

    pub fn total_cost(&self) -> Option<f64> {
        self.pizza_order.as_ref().and_then(|order| order.total_cost)
    }

    /// A response older than the one already applied must not win.
    pub fn is_stale(&self, ticket: u64) -> bool {
        self.last_applied.is_some_and(|last| ticket < last)
    }
}

pub fn reduce(state: &ViewState, action: Action) -> ViewState {
    match action {
        Action::ToppingRequested { ticket, topping, change } => {
            let available_toppings = match change {
                ToppingChange::Upsert(amount) => state.available_toppings.begin_upsert(topping, amount, ticket),
                ToppingChange::Remove => state.available_toppings.begin_remove(topping, ticket),
            };
            let image = derive_image_state(state.image, topping, &available_toppings);
            ViewState {
                available_toppings,
                image,
                ..state.clone()
            }
        }
        Action::ServerResponse { ticket, topping, order } => {
            let confirmed = state.available_toppings.confirm(ticket);
            if state.is_stale(ticket) {
                return ViewState {
                    available_toppings: confirmed,
                    ..state.clone()
                };
            }
            let reconciled = confirmed.reconcile(&order);
            let available_toppings = match topping {
                Some(topping) => reconciled.drop_unlisted(&order, topping),
                None => reconciled,
            };
            ViewState {
                pizza_order: Some(order),
                available_toppings,
                image: state.image,
                last_applied: Some(ticket),
            }
        }
        Action::RequestFailed { ticket } => {
            let (available_toppings, restored) = state.available_toppings.roll_back(ticket);
            let image = restored
                .into_iter()
                .fold(state.image, |image, topping| derive_image_state(image, topping, &available_toppings));
            ViewState {
                available_toppings,
                image,
                ..state.clone()
            }
        }
    }
}
