use std::net::SocketAddr;

use bus_server::dataset::Dataset;
use bus_server::register::TransitRegister;
use bus_server::web::{AppState, create_router};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .expect("usage: bus-server <network.json>");

    // Load and validate everything before binding; a bad dataset should
    // fail the process, not the first query.
    println!("Loading network from {path}...");
    let dataset = Dataset::load(&path).expect("Failed to load network dataset");
    let (stops, buses, config) = dataset.into_network();
    println!("Loaded {} stops and {} buses", stops.len(), buses.len());

    println!("Building routing tables...");
    let register = TransitRegister::new(stops, buses, config).expect("Invalid network dataset");

    let state = AppState::new(register);
    let app = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    println!("Bus network server listening on http://{addr}");
    println!();
    println!("API Endpoints:");
    println!("  GET  /health              - Health check");
    println!("  GET  /stops/:name         - Buses serving a stop");
    println!("  GET  /buses/:name         - Bus line summary");
    println!("  GET  /route?from=A&to=B   - Fastest itinerary between stops");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
