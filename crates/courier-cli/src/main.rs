use courier_cli::run_cli;
use tracing::error;

#[tokio::main]
async fn main() {
    // Run CLI and handle errors
    if let Err(e) = run_cli().await {
        error!("courier error: {}", e);

        // Exit with appropriate code based on error type
        let exit_code = match e {
            courier_cli::CliError::InvalidArgument { .. } => 1,
            courier_cli::CliError::UnsupportedTransport { .. } => 2,
            courier_cli::CliError::Client(_) => 3,
            courier_cli::CliError::Task { .. } => 4,
        };

        std::process::exit(exit_code);
    }
}
