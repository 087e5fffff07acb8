//! Full widget session against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives an
//! `OrderStateSynchronizer` through a ureq-backed `Transport`. Validates that
//! request building, response parsing and reconciliation agree with the
//! actual server end to end.

use pizza_core::{
    ApiError, Applied, HttpMethod, HttpRequest, HttpResponse, OrderClient, OrderId, OrderStateSynchronizer,
    PizzaImageState, PizzaSize, ToppingAmount, ToppingType, Transport,
};

/// Executes requests with ureq, returning 4xx/5xx responses as data so the
/// core handles status interpretation.
struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&mut self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let content_type = req.header("content-type").unwrap_or("application/json").to_string();
        let agent = &self.agent;
        let result = match (req.method, req.body) {
            (HttpMethod::Get, _) => agent.get(&req.path).call(),
            (HttpMethod::Post, Some(body)) => agent
                .post(&req.path)
                .header("content-type", content_type.as_str())
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
            (HttpMethod::Patch, Some(body)) => agent
                .patch(&req.path)
                .header("content-type", content_type.as_str())
                .send(body.as_bytes()),
            (HttpMethod::Patch, None) => agent.patch(&req.path).send_empty(),
            (HttpMethod::Delete, Some(body)) => agent
                .delete(&req.path)
                .force_send_body()
                .header("content-type", content_type.as_str())
                .send(body.as_bytes()),
            (HttpMethod::Delete, None) => agent.delete(&req.path).call(),
        };
        let mut response = result.map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(HttpResponse::new(status, body))
    }
}

fn start_mock_server() -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

#[test]
fn widget_session() {
    let addr = start_mock_server();
    let mut transport = UreqTransport::new();
    let mut sync = OrderStateSynchronizer::new(OrderClient::new(&format!("http://{addr}")));

    // Step 1: start the order, nothing selected.
    let dispatch = sync.start_order().unwrap();
    assert_eq!(sync.run(&mut transport, dispatch).unwrap(), Applied::Current);
    let id = sync.state().order_id().expect("order id");
    assert!(sync.state().pizza_size().is_none());
    assert!(sync
        .state()
        .available_toppings
        .entries()
        .iter()
        .all(|t| t.amount == ToppingAmount::None && !t.is_topping_selected));
    assert_eq!(sync.state().image, PizzaImageState::Base);

    // Step 2: cheese.
    let dispatch = sync.set_topping(ToppingType::Cheese, true).unwrap();
    sync.run(&mut transport, dispatch).unwrap();
    let cheese = sync.state().available_toppings.get(ToppingType::Cheese);
    assert_eq!(cheese.amount, ToppingAmount::Regular);
    assert!(cheese.is_topping_selected);
    assert_eq!(sync.state().image, PizzaImageState::CheeseOnly);

    // Step 3: pepperoni.
    let dispatch = sync.set_topping(ToppingType::Pepperoni, true).unwrap();
    sync.run(&mut transport, dispatch).unwrap();
    assert_eq!(sync.state().image, PizzaImageState::PepperoniWithCheese);

    // Step 4: drop the cheese.
    let dispatch = sync.set_topping(ToppingType::Cheese, false).unwrap();
    assert_eq!(sync.state().image, PizzaImageState::PepperoniNoCheese);
    sync.run(&mut transport, dispatch).unwrap();
    let cheese = sync.state().available_toppings.get(ToppingType::Cheese);
    assert_eq!(cheese.amount, ToppingAmount::None);
    assert!(!cheese.is_topping_selected);
    let order = sync.state().pizza_order.as_ref().unwrap();
    assert_eq!(order.pizzas[0].toppings.len(), 1);

    // Step 5: resize.
    let dispatch = sync.change_size(PizzaSize::Large).unwrap();
    sync.run(&mut transport, dispatch).unwrap();
    assert_eq!(sync.state().pizza_size(), Some(PizzaSize::Large));
    assert_eq!(sync.state().total_cost(), Some(15.0));

    // Step 6: extra olives.
    let dispatch = sync
        .set_topping_amount(ToppingType::Olives, ToppingAmount::Extra)
        .unwrap();
    sync.run(&mut transport, dispatch).unwrap();
    assert_eq!(
        sync.state().available_toppings.amount(ToppingType::Olives),
        ToppingAmount::Extra
    );
    assert_eq!(sync.state().total_cost(), Some(15.75));

    // Step 7: refresh and checkout agree with the local snapshot.
    let before = sync.state().pizza_order.clone();
    let dispatch = sync.refresh().unwrap();
    sync.run(&mut transport, dispatch).unwrap();
    assert_eq!(sync.state().pizza_order, before);

    let dispatch = sync.checkout().unwrap();
    sync.run(&mut transport, dispatch).unwrap();
    assert_eq!(sync.state().order_id(), Some(id));
    assert_eq!(sync.state().total_cost(), Some(15.75));
    assert_eq!(sync.in_flight(), 0);
}

#[test]
fn missing_order_is_not_found() {
    let addr = start_mock_server();
    let mut transport = UreqTransport::new();
    let client = OrderClient::new(&format!("http://{addr}"));

    let response = transport.execute(client.build_get_order(OrderId(999))).unwrap();
    let err = client.parse_order(response).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}

#[test]
fn unreachable_server_is_a_network_error() {
    // Bind and drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let mut transport = UreqTransport::new();
    let mut sync = OrderStateSynchronizer::new(OrderClient::new(&format!("http://{addr}")));

    let dispatch = sync.start_order().unwrap();
    let err = sync.run(&mut transport, dispatch).unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert!(sync.state().pizza_order.is_none());
    assert_eq!(sync.in_flight(), 0);
}

#[test]
fn truncated_body_is_a_network_error() {
    use std::io::{Read, Write};

    // Announces more body than it sends, then hangs up.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        stream
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{\"id\":1")
            .unwrap();
    });

    let mut transport = UreqTransport::new();
    let client = OrderClient::new(&format!("http://{addr}"));
    let err = transport.execute(client.build_get_order(OrderId(1))).unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "{err:?}");
}
