use wander::bootstrapper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bootstrapper::run_dashboard().await
}
