//! Shared utilities for integration testing.

use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Deterministic anvil key #0 (address 0xf39F…2266).
pub const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

/// Start a JSON-RPC node stand-in on an ephemeral port.
///
/// `handler` gets the method name and params; `Some(result)` is returned as
/// the JSON-RPC result, `None` as a `-32000` error.
pub async fn start_mock_node<F>(handler: F) -> SocketAddr
where
    F: Fn(&str, &Value) -> Option<Value> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move { serve(socket, handler).await });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn serve<F>(mut socket: TcpStream, handler: Arc<F>)
where
    F: Fn(&str, &Value) -> Option<Value>,
{
    let Some(body) = read_body(&mut socket).await else {
        return;
    };
    let request: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(_) => return,
    };

    let method = request["method"].as_str().unwrap_or_default();
    let params = &request["params"];
    let response = match handler(method, params) {
        Some(result) => json!({"jsonrpc": "2.0", "id": request["id"], "result": result}),
        None => json!({
            "jsonrpc": "2.0",
            "id": request["id"],
            "error": {"code": -32000, "message": format!("{} unavailable", method)}
        }),
    };

    let payload = response.to_string();
    let http = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        payload.len(),
        payload
    );
    let _ = socket.write_all(http.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn read_body(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let body_start = header_end + 4;
        if buf.len() >= body_start + content_length {
            let body = &buf[body_start..body_start + content_length];
            return Some(String::from_utf8_lossy(body).into_owned());
        }
    }
}

/// `0x`-prefixed quantity.
pub fn quantity(value: u64) -> Value {
    json!(format!("{:#x}", value))
}

/// ABI-encoded `bool` as returned by `eth_call`.
pub fn abi_bool(value: bool) -> Value {
    json!(format!("0x{:064x}", value as u8))
}

/// A successful EIP-1559 receipt for `tx_hash` from the test wallet.
pub fn success_receipt(tx_hash: &str, to: &str, gas_used: u64, block_number: u64) -> Value {
    json!({
        "transactionHash": tx_hash,
        "transactionIndex": "0x0",
        "blockHash": format!("0x{}", "11".repeat(32)),
        "blockNumber": format!("{:#x}", block_number),
        "from": TEST_ADDRESS,
        "to": to,
        "cumulativeGasUsed": format!("{:#x}", gas_used),
        "gasUsed": format!("{:#x}", gas_used),
        "effectiveGasPrice": "0xf4240",
        "contractAddress": null,
        "logs": [],
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "type": "0x2",
        "status": "0x1"
    })
}
