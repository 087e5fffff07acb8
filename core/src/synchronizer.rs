//! Keeps the widget's view-model in step with the remote order.
//!
//! # Design
//! The synchronizer never performs I/O itself. Each user action returns a
//! `Dispatch`: the `HttpRequest` to execute plus a sequence ticket. The host
//! executes it and reports back through `complete` (any HTTP response) or
//! `fail` (the exchange never finished). `run` does both for hosts that
//! provide a blocking `Transport`.
//!
//! Tickets increase monotonically. A response is applied only if no later
//! ticket's response has been applied already, so overlapping requests
//! resolve to the last one issued rather than the last one to arrive.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::client::OrderClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::state::{reduce, Action, ToppingChange, ViewState};
use crate::types::{OrderId, PizzaSize, PizzaSpec, ToppingAmount, ToppingRequest, ToppingType};

/// A request the host must execute, tagged with its sequence ticket.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub ticket: u64,
    pub request: HttpRequest,
}

/// What happened to a successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The response became the local snapshot.
    Current,
    /// A later request's response was already applied; this one only settled
    /// its own pending toppings.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    StartOrder,
    ChangeSize(PizzaSize),
    Topping(ToppingType),
    Refresh,
    Checkout,
}

#[derive(Debug)]
pub struct OrderStateSynchronizer {
    client: OrderClient,
    state: ViewState,
    next_ticket: u64,
    outstanding: HashMap<u64, RequestKind>,
}

impl OrderStateSynchronizer {
    pub fn new(client: OrderClient) -> Self {
        Self {
            client,
            state: ViewState::default(),
            next_ticket: 1,
            outstanding: HashMap::new(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn client(&self) -> &OrderClient {
        &self.client
    }

    /// Number of dispatched requests not yet completed or failed.
    pub fn in_flight(&self) -> usize {
        self.outstanding.len()
    }

    /// Create the remote order with one default pizza.
    pub fn start_order(&mut self) -> Result<Dispatch, ApiError> {
        let request = self.client.build_start_order(&[PizzaSpec::default()])?;
        Ok(self.dispatch(RequestKind::StartOrder, request))
    }

    pub fn change_size(&mut self, size: PizzaSize) -> Result<Dispatch, ApiError> {
        let id = self.require_order()?;
        let request = self.client.build_change_size(id, size);
        Ok(self.dispatch(RequestKind::ChangeSize(size), request))
    }

    /// `change_size` for free-form input such as a select box value.
    pub fn change_size_named(&mut self, size: &str) -> Result<Dispatch, ApiError> {
        self.change_size(size.parse()?)
    }

    /// Check or uncheck a topping.
    ///
    /// Selecting keeps a granular amount chosen earlier and falls back to
    /// `REGULAR`. Deselecting sends the removal with amount `REGULAR`; the
    /// local amount drops to `NONE` once the server confirms.
    pub fn set_topping(&mut self, topping: ToppingType, selected: bool) -> Result<Dispatch, ApiError> {
        if selected {
            let amount = match self.state.available_toppings.amount(topping) {
                ToppingAmount::None => ToppingAmount::Regular,
                amount => amount,
            };
            self.upsert_topping(topping, amount)
        } else {
            self.remove_topping(topping)
        }
    }

    /// Pick an explicit amount. `NONE` removes the topping.
    pub fn set_topping_amount(&mut self, topping: ToppingType, amount: ToppingAmount) -> Result<Dispatch, ApiError> {
        if amount.is_none() {
            self.remove_topping(topping)
        } else {
            self.upsert_topping(topping, amount)
        }
    }

    /// Re-read the order from the server.
    pub fn refresh(&mut self) -> Result<Dispatch, ApiError> {
        let id = self.require_order()?;
        let request = self.client.build_get_order(id);
        Ok(self.dispatch(RequestKind::Refresh, request))
    }

    /// Ask the server to total the order.
    pub fn checkout(&mut self) -> Result<Dispatch, ApiError> {
        let id = self.require_order()?;
        let request = self.client.build_checkout(id);
        Ok(self.dispatch(RequestKind::Checkout, request))
    }

    /// Feed back the response to a dispatched request.
    ///
    /// A response that fails to parse or carries an unexpected status rolls
    /// back whatever the request changed locally and is returned as the error.
    pub fn complete(&mut self, ticket: u64, response: HttpResponse) -> Result<Applied, ApiError> {
        let kind = self.outstanding.remove(&ticket).ok_or(ApiError::UnknownTicket(ticket))?;
        let parsed = match kind {
            RequestKind::StartOrder => self.client.parse_created_order(response),
            _ => self.client.parse_order(response),
        };
        let order = match parsed {
            Ok(order) => order,
            Err(err) => {
                warn!(ticket, ?kind, error = %err, "request rejected");
                self.state = reduce(&self.state, Action::RequestFailed { ticket });
                return Err(err);
            }
        };

        let topping = match kind {
            RequestKind::Topping(topping) => Some(topping),
            _ => None,
        };
        let stale = self.state.is_stale(ticket);
        if stale {
            warn!(ticket, ?kind, last_applied = ?self.state.last_applied, "discarding stale response");
        } else {
            info!(ticket, ?kind, order_id = %order.id, "applying order snapshot");
        }
        self.state = reduce(&self.state, Action::ServerResponse { ticket, topping, order });
        Ok(if stale { Applied::Stale } else { Applied::Current })
    }

    /// Report that a dispatched request never got a response.
    pub fn fail(&mut self, ticket: u64) -> Result<(), ApiError> {
        let kind = self.outstanding.remove(&ticket).ok_or(ApiError::UnknownTicket(ticket))?;
        warn!(ticket, ?kind, "request failed, rolling back");
        self.state = reduce(&self.state, Action::RequestFailed { ticket });
        Ok(())
    }

    /// Execute `dispatch` through `transport` and fold the outcome back in.
    pub fn run<T: Transport + ?Sized>(&mut self, transport: &mut T, dispatch: Dispatch) -> Result<Applied, ApiError> {
        match transport.execute(dispatch.request) {
            Ok(response) => self.complete(dispatch.ticket, response),
            Err(err) => {
                self.fail(dispatch.ticket)?;
                Err(err)
            }
        }
    }

    fn upsert_topping(&mut self, topping: ToppingType, amount: ToppingAmount) -> Result<Dispatch, ApiError> {
        let id = self.require_order()?;
        let payload = ToppingRequest {
            topping_type: topping,
            amount,
        };
        let request = self.client.build_upsert_topping(id, &payload)?;
        let dispatch = self.dispatch(RequestKind::Topping(topping), request);
        self.state = reduce(
            &self.state,
            Action::ToppingRequested {
                ticket: dispatch.ticket,
                topping,
                change: ToppingChange::Upsert(amount),
            },
        );
        Ok(dispatch)
    }

    fn remove_topping(&mut self, topping: ToppingType) -> Result<Dispatch, ApiError> {
        let id = self.require_order()?;
        // The removal endpoint expects a full topping body; REGULAR is the
        // amount it has always been sent with.
        let payload = ToppingRequest {
            topping_type: topping,
            amount: ToppingAmount::Regular,
        };
        let request = self.client.build_remove_topping(id, &payload)?;
        let dispatch = self.dispatch(RequestKind::Topping(topping), request);
        self.state = reduce(
            &self.state,
            Action::ToppingRequested {
                ticket: dispatch.ticket,
                topping,
                change: ToppingChange::Remove,
            },
        );
        Ok(dispatch)
    }

    fn require_order(&self) -> Result<OrderId, ApiError> {
        self.state
            .order_id()
            .ok_or_else(|| ApiError::Validation("no order has been started".to_string()))
    }

    fn dispatch(&mut self, kind: RequestKind, request: HttpRequest) -> Dispatch {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        debug!(ticket, ?kind, method = request.method.as_str(), path = %request.path, "dispatching request");
        self.outstanding.insert(ticket, kind);
        Dispatch { ticket, request }
    }
}
