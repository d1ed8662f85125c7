#[tokio::main]
async fn main() {
    if let Err(err) = recruit_ai_api::run().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}
