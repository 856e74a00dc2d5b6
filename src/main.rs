//! Postcall CLI - serve demo functions to a browser
//!
//! Commands:
//!   postcall serve  - serve `add` and `echo` plus a page that calls them

mod logging;

use std::convert::Infallible;
use std::net::SocketAddr;

use anyhow::Context as _;
use axum::response::Html;
use axum::routing::get;
use clap::{Parser, Subcommand};
use postcall::{Endpoint, Registry};

/// Page that calls the bound functions on button press.
const INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
  <title>postcall</title>
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <body>
    <script>
      function call(func, ...args) {
        return fetch('{prefix}/' + func, {
          method: 'POST',
          body: JSON.stringify(args),
        }).then(function(response) {
          return response.text().then(function(text) {
            if (response.ok) {
              return text.length ? JSON.parse(text) : null;
            }
            throw text;
          });
        });
      }

      function add_example() {
        call('add', 1, 5, 10).then(function(result) {
          alert("Add Result: " + result);
        }, function(err) {
          alert("Error: " + err);
        });
      }

      function echo_example() {
        call('echo', 'double me').then(function(result) {
          alert("Echo Result: " + result);
        }, function(err) {
          alert("Error: " + err);
        });
      }
    </script>

    <button onClick="add_example()">1 + 5 + 10</button>
    <button onClick="echo_example()">Hello</button>
  </body>
</html>
"#;

#[derive(Parser)]
#[command(name = "postcall")]
#[command(about = "Serve typed Rust functions as JSON-over-POST endpoints", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the demo functions and an index page that calls them
    Serve {
        /// Address to listen on
        #[arg(long, env = "POSTCALL_ADDR", default_value = "127.0.0.1:8765")]
        addr: SocketAddr,

        /// Path prefix the functions are mounted under
        #[arg(long, default_value = "/rpc")]
        prefix: String,

        /// Log filter used when RUST_LOG is unset
        #[arg(long, default_value = "info")]
        log: String,
    },
}

fn add(a: isize, b: f64, c: u8) -> Result<f64, Infallible> {
    Ok(a as f64 + b + c as f64)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { addr, prefix, log } => {
            logging::set_up_logging(&log);
            serve_command(addr, &prefix).await
        }
    }
}

async fn serve_command(addr: SocketAddr, prefix: &str) -> anyhow::Result<()> {
    let prefix = prefix.trim_end_matches('/');

    let mut registry = Registry::new()
        .bind("add", add)
        .context("failed to bind add")?;
    registry.insert(Endpoint::must_bind("echo", |s: String| -> Result<String, Infallible> {
        Ok(s.repeat(2))
    }));

    let index = INDEX.replace("{prefix}", prefix);
    let router = registry
        .into_router(prefix)
        .route("/", get(move || async move { Html(index) }));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to listen on {}", addr))?;
    tracing::info!(%addr, %prefix, "serving");

    axum::serve(listener, router).await.context("server failed")?;
    Ok(())
}
