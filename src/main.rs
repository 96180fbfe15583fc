#[tokio::main]
async fn main() -> std::io::Result<()> {
    coin_server::run_with_config().await
}
