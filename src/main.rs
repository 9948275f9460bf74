use card_ledger::cli::run_with_args;
use card_ledger::logging::init;

#[tokio::main]
async fn main() {
    init();

    let args: Vec<String> = std::env::args().collect();
    let code = run_with_args(&args).await;

    std::process::exit(code);
}
