#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = quizman_rust::run().await {
        eprintln!("quizman-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
