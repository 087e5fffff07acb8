use anyhow::{bail, Context};
use clap::Parser;
use pizza_core::{
    ApiError, HttpMethod, HttpRequest, HttpResponse, OrderClient, OrderStateSynchronizer, PizzaSize, ToppingAmount,
    ToppingType, Transport,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Configure one pizza against the order API and print the resulting view state.
#[derive(Parser, Debug)]
#[command(name = "pizza", version, long_about = None)]
struct Cli {
    #[arg(long, env = "PIZZA_API_URL", default_value = "http://127.0.0.1:8080")]
    base_url: String,
    #[arg(long, help = "SMALL, MEDIUM or LARGE", value_name = "SIZE")]
    size: Option<String>,
    #[arg(long = "add", help = "Topping to select, repeatable.", value_name = "TOPPING")]
    add: Vec<String>,
    #[arg(long = "remove", help = "Topping to deselect, repeatable.", value_name = "TOPPING")]
    remove: Vec<String>,
    #[arg(long = "amount", help = "Explicit amount, e.g. olives=extra.", value_name = "TOPPING=AMOUNT")]
    amounts: Vec<String>,
    #[arg(long, help = "Total the order when done.")]
    checkout: bool,
}

struct UreqTransport {
    agent: ureq::Agent,
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

fn parse_amount(raw: &str) -> anyhow::Result<(ToppingType, ToppingAmount)> {
    let Some((topping, amount)) = raw.split_once('=') else {
        bail!("expected TOPPING=AMOUNT, got {raw:?}");
    };
    Ok((topping.parse()?, amount.parse()?))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    // Validate everything before the order exists on the server.
    let size = cli.size.as_deref().map(str::parse::<PizzaSize>).transpose()?;
    let add = cli.add.iter().map(|t| t.parse()).collect::<Result<Vec<ToppingType>, _>>()?;
    let remove = cli.remove.iter().map(|t| t.parse()).collect::<Result<Vec<ToppingType>, _>>()?;
    let amounts = cli
        .amounts
        .iter()
        .map(|a| parse_amount(a))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();
    let mut transport = UreqTransport { agent };
    let mut sync = OrderStateSynchronizer::new(OrderClient::new(&cli.base_url));

    let dispatch = sync.start_order()?;
    sync.run(&mut transport, dispatch)
        .with_context(|| format!("could not start an order at {}", cli.base_url))?;
    info!(order_id = ?sync.state().order_id(), "order started");

    if let Some(size) = size {
        let dispatch = sync.change_size(size)?;
        sync.run(&mut transport, dispatch)?;
    }
    for topping in add {
        let dispatch = sync.set_topping(topping, true)?;
        sync.run(&mut transport, dispatch)?;
    }
    for (topping, amount) in amounts {
        let dispatch = sync.set_topping_amount(topping, amount)?;
        sync.run(&mut transport, dispatch)?;
    }
    for topping in remove {
        let dispatch = sync.set_topping(topping, false)?;
        sync.run(&mut transport, dispatch)?;
    }
    if cli.checkout {
        let dispatch = sync.checkout()?;
        sync.run(&mut transport, dispatch)?;
    }

    println!("{}", serde_json::to_string_pretty(sync.state())?);
    Ok(())
}
