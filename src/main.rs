//! RAX Chat Server - Entry Point
//!
//! A multi-client TCP chat server: every line one client sends is relayed to
//! every other connected client.

use log::info;

use rax_chat_server::cli::parse_port;
use rax_chat_server::error::ChatServerError;
use rax_chat_server::error::handlers::{exit_code, handle_error};
use rax_chat_server::utils::logging::setup_logging;
use rax_chat_server::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    // RUST_LOG overrides the default filter
    setup_logging("info");

    if let Err(e) = run().await {
        handle_error(&e);
        std::process::exit(exit_code(&e));
    }
}

async fn run() -> Result<(), ChatServerError> {
    let port = parse_port(std::env::args())?;
    let config = ServerConfig::load(port)?;

    info!("Launching chat server...");
    let server = Server::bind(&config)?;

    tokio::select! {
        _ = server.run() => Ok(()),
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(ChatServerError::Signal)?;
            info!("Shutting down");
            Ok(())
        }
    }
}
