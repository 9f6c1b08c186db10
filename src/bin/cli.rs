//! Homcha CLI
//!
//! Command-line client for a running Homcha server:
//! - Sign in as a customer or as staff
//! - Browse and edit the menu
//! - Fill a cart and pay
//! - Move orders along and watch the queue
//! - Ask the menu assistant

use clap::{Parser, Subcommand};
use reqwest::Method;
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "homcha")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Ordering and queue tickets for a tea house")]
#[command(long_about = "Homcha is a restaurant ordering kiosk.\nOrder from the menu, pay by QR, and follow your queue number.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8090", global = true)]
    pub api_url: String,

    /// Session id sent as x-kiosk-session (default: the kiosk's own session)
    #[arg(short, long, global = true)]
    pub session: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show server health and the current session
    Status,

    /// Enter as a customer
    Enter,

    /// Log in as staff
    Login {
        /// Staff password
        password: String,
    },

    /// Back to guest
    Logout,

    /// Switch view (customer, merchant, queue-status)
    View { view: String },

    /// List the menu
    Menu {
        /// Only this category (drink, food, dessert)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Create a menu item, or replace one with --id
    MenuSave {
        #[arg(long)]
        id: Option<String>,
        name: String,
        price: i64,
        category: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value = "")]
        image: String,
    },

    /// Delete a menu item
    MenuDelete { id: String },

    /// Add a menu item to the cart
    Add {
        item_id: String,
        #[arg(short, long, default_value = "1")]
        quantity: u32,
    },

    /// Show the cart
    Cart,

    /// Change the quantity of a cart line by a delta (e.g. 2 or -1)
    Qty {
        item_id: String,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },

    /// Set kitchen notes for a cart line
    Note { item_id: String, notes: String },

    /// Remove a cart line
    Remove { item_id: String },

    /// Name printed on the ticket
    Name { name: String },

    /// Pay for the cart and get a queue number
    Checkout,

    /// List active orders (staff)
    Orders,

    /// Show one order
    Order { id: String },

    /// Move an order to its next status (staff)
    Advance { id: String },

    /// Set an order's status (staff)
    SetStatus { id: String, status: String },

    /// Cancel a pending order (staff)
    Cancel { id: String },

    /// Clear all orders and restart queue numbers (staff)
    Reset,

    /// Show the queue board
    Queue,

    /// Show revenue and order counts (staff)
    Stats,

    /// Show active notifications
    Notifications,

    /// Ask the menu assistant
    Ask {
        /// Question text
        message: Vec<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Thin wrapper that adds the session header and exits on API errors
struct Api {
    client: reqwest::Client,
    base: String,
    session: Option<String>,
}

impl Api {
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, Box<dyn std::error::Error>> {
        let mut request = self
            .client
            .request(method, format!("{}/api/v1{}", self.base, path));
        if let Some(session) = &self.session {
            request = request.header("x-kiosk-session", session);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                eprintln!("Cannot connect to Homcha API at {}", self.base);
                eprintln!("Error: {}", e);
                eprintln!();
                eprintln!("Make sure the server is running:");
                eprintln!("  cargo run --bin homcha");
                std::process::exit(1);
            }
        };

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or(text);
            eprintln!("Failed ({}): {}", status, message);
            std::process::exit(1);
        }

        if text.is_empty() {
            Ok(Value::Null)
        } else {
            Ok(serde_json::from_str(&text)?)
        }
    }

    async fn get(&self, path: &str) -> Result<Value, Box<dyn std::error::Error>> {
        self.call(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, Box<dyn std::error::Error>> {
        self.call(Method::POST, path, body).await
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let api = Api {
        client: reqwest::Client::new(),
        base: cli.api_url.trim_end_matches('/').to_string(),
        session: cli.session.clone(),
    };
    let as_json = cli.format == "json";

    match cli.command {
        Commands::Status => {
            let health = match api.client.get(format!("{}/health", api.base)).send().await {
                Ok(resp) if resp.status().is_success() => resp.json::<Value>().await?,
                Ok(resp) => {
                    eprintln!("API returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to Homcha API at {}", api.base);
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            let session = api.get("/session").await?;

            if as_json {
                println!("{}", serde_json::to_string_pretty(&json!({ "health": health, "session": session }))?);
            } else {
                println!("Homcha v{}", env!("CARGO_PKG_VERSION"));
                println!();
                println!("API Status: {}", text(&health["status"]));
                println!("Assistant:  {}", text(&health["assistant"]));
                if let Some(uptime) = health["uptime_seconds"].as_u64() {
                    println!("Uptime:     {}", format_duration(uptime));
                }
                println!();
                print_session(&session);
            }
        }

        Commands::Enter => output(as_json, &api.post("/session/customer", None).await?, print_session)?,

        Commands::Login { password } => {
            let session = api
                .post("/session/merchant", Some(json!({ "password": password })))
                .await?;
            output(as_json, &session, print_session)?;
        }

        Commands::Logout => output(as_json, &api.post("/session/logout", None).await?, print_session)?,

        Commands::View { view } => {
            let session = api
                .call(Method::PUT, "/session/view", Some(json!({ "view": view })))
                .await?;
            output(as_json, &session, print_session)?;
        }

        Commands::Menu { category } => {
            let path = match category {
                Some(c) => format!("/menu?category={}", c),
                None => "/menu".to_string(),
            };
            output(as_json, &api.get(&path).await?, print_menu)?;
        }

        Commands::MenuSave {
            id,
            name,
            price,
            category,
            description,
            image,
        } => {
            let body = json!({
                "name": name,
                "price": price,
                "category": category,
                "description": description,
                "image": image,
            });
            let item = match id {
                Some(id) => api.call(Method::PUT, &format!("/menu/{}", id), Some(body)).await?,
                None => api.post("/menu", Some(body)).await?,
            };
            if as_json {
                println!("{}", serde_json::to_string_pretty(&item)?);
            } else {
                println!("Saved {} ({}): {} baht", text(&item["name"]), text(&item["id"]), item["price"]);
            }
        }

        Commands::MenuDelete { id } => {
            api.call(Method::DELETE, &format!("/menu/{}", id), None).await?;
            println!("Deleted menu item {}", id);
        }

        Commands::Add { item_id, quantity } => {
            let mut cart = api
                .post("/cart/items", Some(json!({ "item_id": item_id })))
                .await?;
            if quantity > 1 {
                cart = api
                    .call(
                        Method::PATCH,
                        &format!("/cart/items/{}", item_id),
                        Some(json!({ "delta": i64::from(quantity) - 1 })),
                    )
                    .await?;
            }
            output(as_json, &cart, print_cart)?;
        }

        Commands::Cart => output(as_json, &api.get("/cart").await?, print_cart)?,

        Commands::Qty { item_id, delta } => {
            let cart = api
                .call(
                    Method::PATCH,
                    &format!("/cart/items/{}", item_id),
                    Some(json!({ "delta": delta })),
                )
                .await?;
            output(as_json, &cart, print_cart)?;
        }

        Commands::Note { item_id, notes } => {
            let cart = api
                .call(
                    Method::PATCH,
                    &format!("/cart/items/{}", item_id),
                    Some(json!({ "notes": notes })),
                )
                .await?;
            output(as_json, &cart, print_cart)?;
        }

        Commands::Remove { item_id } => {
            let cart = api
                .call(Method::DELETE, &format!("/cart/items/{}", item_id), None)
                .await?;
            output(as_json, &cart, print_cart)?;
        }

        Commands::Name { name } => {
            let cart = api
                .call(Method::PUT, "/cart/customer", Some(json!({ "name": name })))
                .await?;
            output(as_json, &cart, print_cart)?;
        }

        Commands::Checkout => {
            let cart = api.post("/checkout", None).await?;
            if !as_json {
                println!("Scan to pay {} baht...", cart["total"]);
            }
            let order = api.post("/checkout/confirm", None).await?;
            output(as_json, &order, |order| {
                println!("Paid. Your queue number is {}", text(&order["queue_number"]));
                println!("Order id: {}", text(&order["id"]));
            })?;
        }

        Commands::Orders => output(as_json, &api.get("/orders").await?, print_orders)?,

        Commands::Order { id } => {
            let order = api.get(&format!("/orders/{}", id)).await?;
            output(as_json, &order, print_order_detail)?;
        }

        Commands::Advance { id } => {
            let order = api.post(&format!("/orders/{}/advance", id), None).await?;
            output(as_json, &order, print_status_change)?;
        }

        Commands::SetStatus { id, status } => {
            let order = api
                .post(
                    &format!("/orders/{}/status", id),
                    Some(json!({ "status": status.to_uppercase() })),
                )
                .await?;
            output(as_json, &order, print_status_change)?;
        }

        Commands::Cancel { id } => {
            let order = api
                .post(&format!("/orders/{}/status", id), Some(json!({ "status": "CANCELLED" })))
                .await?;
            output(as_json, &order, print_status_change)?;
        }

        Commands::Reset => {
            let result = api.call(Method::DELETE, "/orders", None).await?;
            println!("Cleared {} orders; queue numbers restart at 1", result["removed"]);
        }

        Commands::Queue => output(as_json, &api.get("/queue").await?, print_queue)?,

        Commands::Stats => output(as_json, &api.get("/stats").await?, |stats| {
            println!("Revenue (completed): {} baht", stats["completed_revenue"]);
            println!("Completed orders:    {}", stats["completed_orders"]);
            println!("Cancelled orders:    {}", stats["cancelled_orders"]);
            println!("Active orders:       {}", stats["active_orders"]);
            println!("Next queue number:   {}", text(&stats["next_queue_number"]));
        })?,

        Commands::Notifications => output(as_json, &api.get("/notifications").await?, |body| {
            match body["notifications"].as_array() {
                Some(list) if !list.is_empty() => {
                    for n in list {
                        println!("* {}", text(&n["message"]));
                    }
                }
                _ => println!("No notifications"),
            }
        })?,

        Commands::Ask { message } => {
            let answer = api
                .post("/assistant", Some(json!({ "message": message.join(" ") })))
                .await?;
            output(as_json, &answer, |answer| match answer["status"].as_str() {
                Some("answered") => println!("{}", text(&answer["reply"]["text"])),
                Some("busy") => println!("The assistant is still answering another question"),
                _ => println!("Nothing to ask"),
            })?;
        }

        Commands::Config { output } => {
            let config = homcha::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn output(as_json: bool, value: &Value, table: impl Fn(&Value)) -> Result<(), Box<dyn std::error::Error>> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        table(value);
    }
    Ok(())
}

fn text(value: &Value) -> &str {
    value.as_str().unwrap_or("-")
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

fn format_time(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.with_timezone(&chrono::Local).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

fn print_session(session: &Value) {
    println!("Session: {}", text(&session["session_id"]));
    println!("Role:    {}", text(&session["role"]));
    println!("View:    {}", text(&session["view"]));
    if let Some(order) = session["tracked_order"].as_object() {
        println!(
            "Waiting: queue {} ({})",
            order.get("queue_number").and_then(Value::as_str).unwrap_or("-"),
            order.get("status").and_then(Value::as_str).unwrap_or("-")
        );
    }
}

fn print_menu(body: &Value) {
    let items = body["items"].as_array().cloned().unwrap_or_default();
    if items.is_empty() {
        println!("The menu is empty.");
        return;
    }

    println!("{:<16} {:<10} {:>7}  {}", "ID", "Category", "Price", "Name");
    println!("{}", "-".repeat(60));
    for item in items {
        println!(
            "{:<16} {:<10} {:>7}  {}",
            text(&item["id"]),
            text(&item["category"]),
            item["price"],
            text(&item["name"])
        );
    }
}

fn print_cart(cart: &Value) {
    let items = cart["items"].as_array().cloned().unwrap_or_default();
    if items.is_empty() {
        println!("The cart is empty.");
        return;
    }

    println!("{:<8} {:>4} {:>8}  {}", "ID", "Qty", "Subtotal", "Name");
    println!("{}", "-".repeat(50));
    for item in items {
        let subtotal = item["price"].as_i64().unwrap_or(0) * item["quantity"].as_i64().unwrap_or(0);
        println!(
            "{:<8} {:>4} {:>8}  {}",
            text(&item["id"]),
            item["quantity"],
            subtotal,
            text(&item["name"])
        );
        if let Some(notes) = item["notes"].as_str().filter(|n| !n.is_empty()) {
            println!("{:>24}  note: {}", "", notes);
        }
    }
    println!("{}", "-".repeat(50));
    println!("Total: {} baht", cart["total"]);
    if let Some(name) = cart["customer_name"].as_str().filter(|n| !n.is_empty()) {
        println!("Customer: {}", name);
    }
}

fn print_orders(body: &Value) {
    let orders = body["orders"].as_array().cloned().unwrap_or_default();
    if orders.is_empty() {
        println!("No active orders.");
        return;
    }

    println!("{:<6} {:<10} {:<11} {:>7}  {:<6} {}", "Queue", "ID", "Status", "Total", "Time", "Customer");
    println!("{}", "-".repeat(70));
    for order in orders {
        println!(
            "{:<6} {:<10} {:<11} {:>7}  {:<6} {}",
            text(&order["queue_number"]),
            text(&order["id"]),
            text(&order["status"]),
            order["total_price"],
            format_time(order["created_at"].as_i64().unwrap_or(0)),
            text(&order["customer_name"])
        );
    }
}

fn print_order_detail(order: &Value) {
    println!(
        "Queue {} - {} - {}",
        text(&order["queue_number"]),
        text(&order["status"]),
        text(&order["customer_name"])
    );
    for item in order["items"].as_array().cloned().unwrap_or_default() {
        println!("  {} x {}", item["quantity"], text(&item["name"]));
    }
    println!("Total: {} baht", order["total_price"]);
}

fn print_status_change(order: &Value) {
    println!("Queue {} is now {}", text(&order["queue_number"]), text(&order["status"]));
}

fn print_queue(board: &Value) {
    let numbers = |key: &str| -> String {
        let list: Vec<String> = board[key]
            .as_array()
            .map(|tickets| {
                tickets
                    .iter()
                    .map(|t| text(&t["queue_number"]).to_string())
                    .collect()
            })
            .unwrap_or_default();
        if list.is_empty() {
            "-".to_string()
        } else {
            list.join("  ")
        }
    };

    println!("Ready:   {}", numbers("ready"));
    println!("Waiting: {}", numbers("waiting"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(125), "2m 5s");
        assert_eq!(format_duration(7260), "2h 1m");
        assert_eq!(format_duration(90_000), "1d 1h");
    }

    #[test]
    fn test_negative_delta_parses() {
        let cli = Cli::try_parse_from(["homcha", "qty", "d1", "-1"]).unwrap();
        match cli.command {
            Commands::Qty { item_id, delta } => {
                assert_eq!(item_id, "d1");
                assert_eq!(delta, -1);
            }
            _ => panic!("Expected qty command"),
        }
    }

    #[test]
    fn test_global_session_flag() {
        let cli = Cli::try_parse_from(["homcha", "cart", "--session", "table-4"]).unwrap();
        assert_eq!(cli.session.as_deref(), Some("table-4"));
        assert_eq!(cli.api_url, "http://localhost:8090");
    }
}
