use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    bidpilot_cli::run().await
}
