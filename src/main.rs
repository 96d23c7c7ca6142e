use gastos_bot::bot::dispatcher::run;
use log::{error, info};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    pretty_env_logger::init();
    info!("Bot starting...");

    match run().await {
        Ok(_) => info!("Bot stopped"),
        Err(e) => {
            error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
