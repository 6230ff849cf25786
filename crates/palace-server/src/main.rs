use palace_server::PalaceServerBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Deployment platforms inject PORT; default to 8080 locally.
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = format!("0.0.0.0:{port}");

    let server = PalaceServerBuilder::new().bind(&addr).build().await?;
    tracing::info!(%addr, "Palace card server started");
    server.run().await?;
    Ok(())
}
