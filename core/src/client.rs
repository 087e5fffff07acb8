//! Stateless HTTP request builder and response parser for the order API.
//!
//! # Design
//! `OrderClient` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Every mutating endpoint answers with the full order, so there is one
//! parser per expected status rather than one per endpoint.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Order, OrderId, PizzaSize, PizzaSpec, ToppingRequest};

/// Collection path of the order resource.
pub const ORDERS_PATH: &str = "/v1/app/orders";

/// The widget only ever edits the first pizza of an order.
pub const PIZZA_INDEX: usize = 0;

const JSON: &str = "application/json";
// Topping removal goes out as a body-bearing DELETE with an explicit charset.
const JSON_UTF8: &str = "application/json;charset=utf-8";
const TEXT: &str = "text/plain";

#[derive(Debug, Clone)]
pub struct OrderClient {
    base_url: String,
}

impl OrderClient {
    /// `base_url` is scheme and authority, e.g. `http://localhost:8080`. An
    /// empty string yields host-relative paths.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn orders_url(&self) -> String {
        format!("{}{ORDERS_PATH}", self.base_url)
    }

    fn order_url(&self, id: OrderId) -> String {
        format!("{}/{id}", self.orders_url())
    }

    fn pizza_url(&self, id: OrderId) -> String {
        format!("{}/pizzas/{PIZZA_INDEX}", self.order_url(id))
    }

    pub fn build_start_order(&self, pizzas: &[PizzaSpec]) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(pizzas).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.orders_url(),
            headers: vec![("content-type".to_string(), JSON.to_string())],
            body: Some(body),
        })
    }

    pub fn build_get_order(&self, id: OrderId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.order_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    /// The size travels as a bare string body such as `LARGE`, not JSON.
    pub fn build_change_size(&self, id: OrderId, size: PizzaSize) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Patch,
            path: self.pizza_url(id),
            headers: vec![("content-type".to_string(), TEXT.to_string())],
            body: Some(size.as_str().to_string()),
        }
    }

    pub fn build_upsert_topping(&self, id: OrderId, topping: &ToppingRequest) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(topping).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/toppings", self.pizza_url(id)),
            headers: vec![("content-type".to_string(), JSON.to_string())],
            body: Some(body),
        })
    }

    pub fn build_remove_topping(&self, id: OrderId, topping: &ToppingRequest) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(topping).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/toppings", self.pizza_url(id)),
            headers: vec![("content-type".to_string(), JSON_UTF8.to_string())],
            body: Some(body),
        })
    }

    pub fn build_checkout(&self, id: OrderId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/checkout", self.order_url(id)),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Parse the answer to `build_start_order` (201 Created).
    pub fn parse_created_order(&self, response: HttpResponse) -> Result<Order, ApiError> {
        check_status(&response, 201)?;
        parse_body(&response)
    }

    /// Parse the answer to every other endpoint (200 OK).
    pub fn parse_order(&self, response: HttpResponse) -> Result<Order, ApiError> {
        check_status(&response, 200)?;
        parse_body(&response)
    }
}

fn parse_body(response: &HttpResponse) -> Result<Order, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map unexpected status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::Server {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ToppingAmount, ToppingType};

    fn client() -> OrderClient {
        OrderClient::new("http://localhost:8080")
    }

    fn cheese() -> ToppingRequest {
        ToppingRequest {
            topping_type: ToppingType::Cheese,
            amount: ToppingAmount::Regular,
        }
    }

    #[test]
    fn build_start_order_posts_one_empty_pizza() {
        let req = client().build_start_order(&[PizzaSpec::default()]).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8080/v1/app/orders");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some("[{}]"));
    }

    #[test]
    fn build_change_size_sends_bare_size() {
        let req = client().build_change_size(OrderId(5), PizzaSize::Large);
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.path, "http://localhost:8080/v1/app/orders/5/pizzas/0");
        assert_eq!(req.body.as_deref(), Some("LARGE"));
        assert_eq!(req.header("content-type"), Some("text/plain"));
    }

    #[test]
    fn build_upsert_topping_posts_json() {
        let req = client().build_upsert_topping(OrderId(1), &cheese()).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8080/v1/app/orders/1/pizzas/0/toppings");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["type"], "CHEESE");
        assert_eq!(body["amount"], "REGULAR");
    }

    #[test]
    fn build_remove_topping_is_delete_with_body() {
        let req = client().build_remove_topping(OrderId(1), &cheese()).unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:8080/v1/app/orders/1/pizzas/0/toppings");
        assert_eq!(req.header("content-type"), Some("application/json;charset=utf-8"));
        assert!(req.body.is_some());
    }

    #[test]
    fn build_get_and_checkout() {
        let get = client().build_get_order(OrderId(9));
        assert_eq!(get.method, HttpMethod::Get);
        assert_eq!(get.path, "http://localhost:8080/v1/app/orders/9");
        assert!(get.body.is_none());

        let checkout = client().build_checkout(OrderId(9));
        assert_eq!(checkout.method, HttpMethod::Post);
        assert_eq!(checkout.path, "http://localhost:8080/v1/app/orders/9/checkout");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = OrderClient::new("http://localhost:8080/");
        let req = client.build_get_order(OrderId(1));
        assert_eq!(req.path, "http://localhost:8080/v1/app/orders/1");
    }

    #[test]
    fn empty_base_url_gives_relative_paths() {
        let req = OrderClient::new("").build_get_order(OrderId(1));
        assert_eq!(req.path, "/v1/app/orders/1");
    }

    #[test]
    fn parse_created_order_success() {
        let response = HttpResponse::new(201, r#"{"id":1,"pizzas":[{"size":null,"toppings":[]}]}"#);
        let order = client().parse_created_order(response).unwrap();
        assert_eq!(order.id, OrderId(1));
        assert_eq!(order.pizzas.len(), 1);
    }

    #[test]
    fn parse_created_order_wrong_status() {
        let response = HttpResponse::new(500, "internal error");
        let err = client().parse_created_order(response).unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 500, .. }));
    }

    #[test]
    fn parse_order_not_found() {
        let err = client().parse_order(HttpResponse::new(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_order_bad_json() {
        let err = client().parse_order(HttpResponse::new(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
