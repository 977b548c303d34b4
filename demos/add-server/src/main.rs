//! Demo server exposing `add` and `log` over HTTP.
//!
//! ```text
//! curl -s -d '{"jsonrpc":"2.0","method":"add","params":{"a":1,"b":3},"id":1}' http://127.0.0.1:8000/
//! {"jsonrpc":"2.0","result":{"v":4},"id":1}
//! ```

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use wirerpc_http::JsonRpcHttpServer;
use wirerpc_json_rpc::context::META_REMOTE_ADDR;
use wirerpc_json_rpc::{
    EndpointHandler, HandlerError, JsonRpcErrorObject, RequestContext, ToJsonRpcError,
};

#[derive(Parser)]
#[command(name = "wirerpc-add-server")]
#[command(about = "JSON-RPC 2.0 demo server with an add method")]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    bind: String,

    /// Path of the JSON-RPC endpoint
    #[arg(short, long, default_value = "/")]
    path: String,

    /// Largest accepted request body in bytes
    #[arg(long, default_value_t = 1024 * 1024)]
    max_body_size: usize,
}

#[derive(Debug, Deserialize)]
struct AddRequest {
    a: i64,
    b: i64,
}

#[derive(Debug, Serialize)]
struct AddResponse {
    v: i64,
}

#[derive(Debug, thiserror::Error)]
#[error("{a} + {b} overflows")]
struct Overflow {
    a: i64,
    b: i64,
}

impl ToJsonRpcError for Overflow {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        JsonRpcErrorObject::with_message(-32000i64, self.to_string())
    }
}

async fn add(_ctx: RequestContext, req: AddRequest) -> Result<AddResponse, HandlerError> {
    let v = req
        .a
        .checked_add(req.b)
        .ok_or(Overflow { a: req.a, b: req.b })?;
    Ok(AddResponse { v })
}

/// Notification sink: call it without an id and it only logs.
async fn log(ctx: RequestContext, event: Value) -> Result<(), HandlerError> {
    info!(
        remote = ctx.metadata_str(META_REMOTE_ADDR).unwrap_or("unknown"),
        "event: {}", event
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let bind_address: SocketAddr = args
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {:?}", args.bind))?;

    info!("Starting wirerpc add server on {}", bind_address);

    let server = JsonRpcHttpServer::builder()
        .bind_address(bind_address)
        .rpc_path(args.path)
        .max_body_size(args.max_body_size)
        .register("add", EndpointHandler::new(add))
        .register("log", EndpointHandler::new(log))
        .build();

    server.run().await.context("server failed")?;
    Ok(())
}
