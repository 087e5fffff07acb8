//! Client-side projection of the server's topping list.
//!
//! The projection always holds exactly one entry per `ToppingType`, in
//! display order. Server toppings update the matching entry; toppings the
//! server leaves out keep their last projected state, and names outside the
//! fixed set are dropped.

use serde::Serialize;
use tracing::warn;

use crate::types::{Order, ToppingAmount, ToppingType};

/// An in-flight change to one topping, tagged with the ticket of the request
/// that carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pending {
    /// An upsert was sent; `previous` is the amount to restore on failure.
    Upsert { ticket: u64, previous: ToppingAmount },
    /// A removal was sent; the amount drops to `NONE` only on confirmation.
    Remove { ticket: u64, previous: ToppingAmount },
}

impl Pending {
    pub fn ticket(&self) -> u64 {
        match self {
            Pending::Upsert { ticket, .. } | Pending::Remove { ticket, .. } => *ticket,
        }
    }

    pub fn previous(&self) -> ToppingAmount {
        match self {
            Pending::Upsert { previous, .. } | Pending::Remove { previous, .. } => *previous,
        }
    }

    fn with_previous(self, previous: ToppingAmount) -> Self {
        match self {
            Pending::Upsert { ticket, .. } => Pending::Upsert { ticket, previous },
            Pending::Remove { ticket, .. } => Pending::Remove { ticket, previous },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableTopping {
    #[serde(rename = "type")]
    pub topping_type: ToppingType,
    pub amount: ToppingAmount,
    /// Checkbox state. Equals `amount != NONE` whenever `pending` is empty.
    pub is_topping_selected: bool,
    pub pending: Option<Pending>,
}

impl AvailableTopping {
    fn new(topping_type: ToppingType) -> Self {
        Self {
            topping_type,
            amount: ToppingAmount::None,
            is_topping_selected: false,
            pending: None,
        }
    }

    fn set_amount(&mut self, amount: ToppingAmount) {
        self.amount = amount;
        self.is_topping_selected = !amount.is_none();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ToppingProjection {
    entries: Vec<AvailableTopping>,
}

impl Default for ToppingProjection {
    fn default() -> Self {
        Self {
            entries: ToppingType::ALL.into_iter().map(AvailableTopping::new).collect(),
        }
    }
}

impl ToppingProjection {
    pub fn entries(&self) -> &[AvailableTopping] {
        &self.entries
    }

    pub fn get(&self, topping: ToppingType) -> &AvailableTopping {
        // Every type has an entry from construction on.
        &self.entries[index_of(topping)]
    }

    fn get_mut(&mut self, topping: ToppingType) -> &mut AvailableTopping {
        &mut self.entries[index_of(topping)]
    }

    pub fn is_selected(&self, topping: ToppingType) -> bool {
        self.get(topping).is_topping_selected
    }

    pub fn amount(&self, topping: ToppingType) -> ToppingAmount {
        self.get(topping).amount
    }

    /// Fold the first pizza's toppings into a new projection.
    ///
    /// Entries still waiting on a request keep the state the user asked for;
    /// that request's own confirmation settles them. The server's amount
    /// becomes what they fall back to if that request fails.
    pub fn reconcile(&self, order: &Order) -> Self {
        let mut next = self.clone();
        let Some(pizza) = order.first_pizza() else {
            return next;
        };
        for topping in &pizza.toppings {
            let Some(topping_type) = topping.topping_type() else {
                warn!(order_id = %order.id, kind = %topping.kind, "ignoring unknown topping from server");
                continue;
            };
            let entry = next.get_mut(topping_type);
            match entry.pending {
                None => entry.set_amount(topping.amount),
                Some(pending) => entry.pending = Some(pending.with_previous(topping.amount)),
            }
        }
        next
    }

    /// `order` answered a request that changed `topping`. If the server no
    /// longer lists it, a later marker on that topping falls back to `NONE`.
    pub(crate) fn drop_unlisted(&self, order: &Order, topping: ToppingType) -> Self {
        let mut next = self.clone();
        let Some(pizza) = order.first_pizza() else {
            return next;
        };
        if pizza.toppings.iter().any(|t| t.topping_type() == Some(topping)) {
            return next;
        }
        let entry = next.get_mut(topping);
        if let Some(pending) = entry.pending {
            entry.pending = Some(pending.with_previous(ToppingAmount::None));
        }
        next
    }

    /// Record a requested upsert: the amount shows immediately.
    pub(crate) fn begin_upsert(&self, topping: ToppingType, amount: ToppingAmount, ticket: u64) -> Self {
        let mut next = self.clone();
        let entry = next.get_mut(topping);
        let previous = settled_amount(entry);
        entry.set_amount(amount);
        entry.pending = Some(Pending::Upsert { ticket, previous });
        next
    }

    /// Record a requested removal: the checkbox clears, the amount waits for
    /// the server.
    pub(crate) fn begin_remove(&self, topping: ToppingType, ticket: u64) -> Self {
        let mut next = self.clone();
        let entry = next.get_mut(topping);
        let previous = settled_amount(entry);
        entry.is_topping_selected = false;
        entry.pending = Some(Pending::Remove { ticket, previous });
        next
    }

    /// Settle every marker carried by `ticket` as accepted by the server.
    pub(crate) fn confirm(&self, ticket: u64) -> Self {
        let mut next = self.clone();
        for entry in next.entries.iter_mut() {
            match entry.pending {
                Some(Pending::Remove { ticket: t, .. }) if t == ticket => {
                    entry.pending = None;
                    entry.set_amount(ToppingAmount::None);
                }
                Some(Pending::Upsert { ticket: t, .. }) if t == ticket => {
                    entry.pending = None;
                }
                _ => {}
            }
        }
        next
    }

    /// Undo every marker carried by `ticket`. Returns the new projection and
    /// the toppings that were restored.
    pub(crate) fn roll_back(&self, ticket: u64) -> (Self, Vec<ToppingType>) {
        let mut next = self.clone();
        let mut restored = Vec::new();
        for entry in next.entries.iter_mut() {
            if let Some(pending) = entry.pending.filter(|p| p.ticket() == ticket) {
                entry.pending = None;
                entry.set_amount(pending.previous());
                restored.push(entry.topping_type);
            }
        }
        (next, restored)
    }
}

/// The amount the server last agreed to, looking through an unsettled marker.
fn settled_amount(entry: &AvailableTopping) -> ToppingAmount {
    entry.pending.map(|p| p.previous()).unwrap_or(entry.amount)
}

fn index_of(topping: ToppingType) -> usize {
    ToppingType::ALL
        .iter()
        .position(|t| *t == topping)
        .unwrap_or_default()
}
