use clap::Parser;
use tracing_subscriber::EnvFilter;

use falsedb::server::{Args, Server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let server = Server::bind(args.bind_addr()).await?;
    println!(
        "falsedb server is running on port: {}\nyou can run this on an alternate port with the -p or --port flags",
        server.local_addr().port()
    );
    server.run().await?;
    Ok(())
}
