#[tokio::main]
async fn main() {
    if let Err(e) = feedback_collector_lib::run().await {
        log::error!("{e}");
        eprintln!("feedback-collector: {e}");
        std::process::exit(1);
    }
}
