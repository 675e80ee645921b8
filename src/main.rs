mod cli;
use log::error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // YTM_COOKIE may live in a local .env file
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Failures are reported, not turned into an exit status
    if let Err(e) = cli::run().await {
        error!("{e}");
    }

    Ok(())
}
