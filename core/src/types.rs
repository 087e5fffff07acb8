//! Wire DTOs for the order API.
//!
//! # Design
//! These types mirror the order service's JSON but are defined independently
//! from the mock-server crate; integration tests catch schema drift.
//! Response toppings keep their `type` as a raw string so a type outside the
//! fixed set never fails the whole order; the projection decides what to do
//! with it. Request payloads are fully typed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

/// Server-assigned order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PizzaSize {
    Small,
    Medium,
    Large,
}

impl PizzaSize {
    pub const ALL: [PizzaSize; 3] = [PizzaSize::Small, PizzaSize::Medium, PizzaSize::Large];

    /// Wire name, also used verbatim as the size PATCH body.
    pub fn as_str(&self) -> &'static str {
        match self {
            PizzaSize::Small => "SMALL",
            PizzaSize::Medium => "MEDIUM",
            PizzaSize::Large => "LARGE",
        }
    }
}

impl FromStr for PizzaSize {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        PizzaSize::ALL
            .into_iter()
            .find(|size| size.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ApiError::Validation(format!("unsupported pizza size {s:?}")))
    }
}

impl fmt::Display for PizzaSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of toppings the widget offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToppingType {
    Cheese,
    Pepperoni,
    Sausage,
    Bacon,
    Ham,
    Mushrooms,
    Olives,
    Onions,
    Peppers,
    Pineapples,
}

impl ToppingType {
    /// Every topping, in the order the widget lists them.
    pub const ALL: [ToppingType; 10] = [
        ToppingType::Cheese,
        ToppingType::Pepperoni,
        ToppingType::Sausage,
        ToppingType::Bacon,
        ToppingType::Ham,
        ToppingType::Mushrooms,
        ToppingType::Olives,
        ToppingType::Onions,
        ToppingType::Peppers,
        ToppingType::Pineapples,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToppingType::Cheese => "CHEESE",
            ToppingType::Pepperoni => "PEPPERONI",
            ToppingType::Sausage => "SAUSAGE",
            ToppingType::Bacon => "BACON",
            ToppingType::Ham => "HAM",
            ToppingType::Mushrooms => "MUSHROOMS",
            ToppingType::Olives => "OLIVES",
            ToppingType::Onions => "ONIONS",
            ToppingType::Peppers => "PEPPERS",
            ToppingType::Pineapples => "PINEAPPLES",
        }
    }

    /// Label shown next to the checkbox.
    pub fn display_name(&self) -> &'static str {
        match self {
            ToppingType::Cheese => "Cheese",
            ToppingType::Pepperoni => "Pepperoni",
            ToppingType::Sausage => "Sausage",
            ToppingType::Bacon => "Bacon",
            ToppingType::Ham => "Ham",
            ToppingType::Mushrooms => "Mushrooms",
            ToppingType::Olives => "Olives",
            ToppingType::Onions => "Onions",
            ToppingType::Peppers => "Peppers",
            ToppingType::Pineapples => "Pineapples",
        }
    }

    /// Case-insensitive lookup; `None` for names outside the fixed set.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        ToppingType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
    }
}

impl FromStr for ToppingType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToppingType::from_name(s).ok_or_else(|| ApiError::Validation(format!("unsupported topping {s:?}")))
    }
}

impl fmt::Display for ToppingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How much of a topping goes on the pizza. `None` only exists client-side;
/// the server drops a topping instead of storing it at `NONE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToppingAmount {
    #[default]
    None,
    Light,
    Regular,
    Extra,
}

impl ToppingAmount {
    pub fn is_none(&self) -> bool {
        matches!(self, ToppingAmount::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToppingAmount::None => "NONE",
            ToppingAmount::Light => "LIGHT",
            ToppingAmount::Regular => "REGULAR",
            ToppingAmount::Extra => "EXTRA",
        }
    }
}

impl FromStr for ToppingAmount {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        [
            ToppingAmount::None,
            ToppingAmount::Light,
            ToppingAmount::Regular,
            ToppingAmount::Extra,
        ]
        .into_iter()
        .find(|a| a.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| ApiError::Validation(format!("unsupported topping amount {s:?}")))
    }
}

/// Body of the topping upsert and removal calls: `{"type":..,"amount":..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToppingRequest {
    #[serde(rename = "type")]
    pub topping_type: ToppingType,
    pub amount: ToppingAmount,
}

/// A topping as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topping {
    #[serde(rename = "type", alias = "toppingType")]
    pub kind: String,
    #[serde(alias = "toppingAmount")]
    pub amount: ToppingAmount,
}

impl Topping {
    pub fn topping_type(&self) -> Option<ToppingType> {
        ToppingType::from_name(&self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pizza {
    #[serde(default, alias = "pizzaSize")]
    pub size: Option<PizzaSize>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub toppings: Vec<Topping>,
}

/// One entry of the create-order body. The default serializes as `{}` and
/// leaves the server to pick size and toppings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PizzaSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<PizzaSize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub toppings: Vec<ToppingRequest>,
}

/// Full order representation returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pizzas: Vec<Pizza>,
    #[serde(rename = "totalCost", default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
}

impl Order {
    /// The pizza the widget edits.
    pub fn first_pizza(&self) -> Option<&Pizza> {
        self.pizzas.first()
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
