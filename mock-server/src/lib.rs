use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

pub mod config;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PizzaSize {
    Small,
    Medium,
    Large,
}

impl PizzaSize {
    /// Accepts the bare name (`LARGE`) or a JSON string (`"LARGE"`).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().trim_matches('"') {
            "SMALL" => Some(PizzaSize::Small),
            "MEDIUM" => Some(PizzaSize::Medium),
            "LARGE" => Some(PizzaSize::Large),
            _ => None,
        }
    }

    fn base_price(&self) -> f64 {
        match self {
            PizzaSize::Small => 4.0,
            PizzaSize::Medium => 9.0,
            PizzaSize::Large => 14.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToppingType {
    Cheese,
    Pepperoni,
    Ham,
    Sausage,
    Bacon,
    Mushrooms,
    Olives,
    Onions,
    Peppers,
    Pineapples,
}

impl ToppingType {
    fn price(&self) -> f64 {
        match self {
            ToppingType::Cheese
            | ToppingType::Pepperoni
            | ToppingType::Ham
            | ToppingType::Sausage
            | ToppingType::Bacon => 1.0,
            _ => 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToppingAmount {
    None,
    Light,
    Regular,
    Extra,
}

impl ToppingAmount {
    fn multiplier(&self) -> f64 {
        match self {
            ToppingAmount::None => 0.0,
            ToppingAmount::Light => 0.5,
            ToppingAmount::Regular => 1.0,
            ToppingAmount::Extra => 1.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Topping {
    #[serde(rename = "type")]
    pub topping_type: ToppingType,
    pub amount: ToppingAmount,
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Pizza {
    #[serde(default)]
    pub size: Option<PizzaSize>,
    #[serde(default)]
    pub toppings: Vec<Topping>,
}

impl Pizza {
    pub fn price(&self) -> f64 {
        let base = self.size.map(|s| s.base_price()).unwrap_or(0.0);
        base + self
            .toppings
            .iter()
            .map(|t| t.topping_type.price() * t.amount.multiplier())
            .sum::<f64>()
    }

    /// At most one entry per type: an existing entry takes the new amount.
    fn upsert(&mut self, topping: Topping) {
        match self.toppings.iter_mut().find(|t| t.topping_type == topping.topping_type) {
            Some(existing) => existing.amount = topping.amount,
            None => self.toppings.push(topping),
        }
    }

    /// Removal matches on type only; the amount in the body is ignored.
    fn remove(&mut self, topping_type: ToppingType) {
        self.toppings.retain(|t| t.topping_type != topping_type);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub pizzas: Vec<Pizza>,
    #[serde(rename = "totalCost")]
    pub total_cost: f64,
}

impl Order {
    fn recompute_total(&mut self) {
        self.total_cost = self.pizzas.iter().map(Pizza::price).sum();
    }
}

#[derive(Debug, Default)]
pub struct Store {
    last_id: u64,
    orders: HashMap<u64, Order>,
}

impl Store {
    /// The order, if it exists and has a pizza at `index`.
    fn order_with_pizza(&mut self, id: u64, index: usize) -> Result<&mut Order, StatusCode> {
        match self.orders.get_mut(&id) {
            Some(order) if index < order.pizzas.len() => Ok(order),
            _ => Err(StatusCode::NOT_FOUND),
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/v1/app/orders", post(create_order))
        .route("/v1/app/orders/{id}", get(get_order))
        .route("/v1/app/orders/{id}/checkout", post(checkout_order))
        .route("/v1/app/orders/{id}/pizzas/{index}", patch(update_pizza_size))
        .route(
            "/v1/app/orders/{id}/pizzas/{index}/toppings",
            post(add_topping).delete(remove_topping),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn create_order(State(db): State<Db>, Json(pizzas): Json<Vec<Pizza>>) -> (StatusCode, Json<Order>) {
    let mut store = db.write().await;
    store.last_id += 1;
    let mut order = Order {
        id: store.last_id,
        pizzas,
        total_cost: 0.0,
    };
    order.recompute_total();
    store.orders.insert(order.id, order.clone());
    info!(order_id = order.id, pizzas = order.pizzas.len(), "order created");
    (StatusCode::CREATED, Json(order))
}

async fn get_order(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Order>, StatusCode> {
    let store = db.read().await;
    store.orders.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn checkout_order(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Order>, StatusCode> {
    let mut store = db.write().await;
    let order = store.orders.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    order.recompute_total();
    info!(order_id = id, total = order.total_cost, "order checked out");
    Ok(Json(order.clone()))
}

async fn update_pizza_size(
    State(db): State<Db>,
    Path((id, index)): Path<(u64, usize)>,
    body: String,
) -> Result<Json<Order>, StatusCode> {
    let mut store = db.write().await;
    let order = store.order_with_pizza(id, index)?;
    let size = PizzaSize::parse(&body).ok_or(StatusCode::BAD_REQUEST)?;
    order.pizzas[index].size = Some(size);
    order.recompute_total();
    debug!(order_id = id, ?size, "pizza resized");
    Ok(Json(order.clone()))
}

async fn add_topping(
    State(db): State<Db>,
    Path((id, index)): Path<(u64, usize)>,
    Json(topping): Json<Topping>,
) -> Result<Json<Order>, StatusCode> {
    let mut store = db.write().await;
    let order = store.order_with_pizza(id, index)?;
    order.pizzas[index].upsert(topping);
    order.recompute_total();
    debug!(order_id = id, topping = ?topping.topping_type, amount = ?topping.amount, "topping set");
    Ok(Json(order.clone()))
}

async fn remove_topping(
    State(db): State<Db>,
    Path((id, index)): Path<(u64, usize)>,
    Json(topping): Json<Topping>,
) -> Result<Json<Order>, StatusCode> {
    let mut store = db.write().await;
    let order = store.order_with_pizza(id, index)?;
    order.pizzas[index].remove(topping.topping_type);
    order.recompute_total();
    debug!(order_id = id, topping = ?topping.topping_type, "topping removed");
    Ok(Json(order.clone()))
}
