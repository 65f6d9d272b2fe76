use std::collections::HashMap;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{info, warn};

use jobfs_core::config::MAX_FRAME_BYTES;
use jobfs_protocol::frames::InboundFrame;
use jobfs_tree::Node;

use crate::app::AppState;
use crate::dispatch;

/// Fid table: this connection's handles into the tree.
pub type FidTable = HashMap<u32, Arc<Node>>;

/// Per-connection event loop — one task per accepted socket, alive for
/// the whole session. Fids die with the connection.
pub async fn run_connection(stream: TcpStream, app: Arc<AppState>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    info!(conn_id = %conn_id, "new connection");

    let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(MAX_FRAME_BYTES));
    let mut fids: FidTable = HashMap::new();

    while let Some(next) = framed.next().await {
        let text = match next {
            Ok(t) => t,
            Err(e) => {
                // Oversized or broken frame: the stream state is
                // unrecoverable, drop the session.
                warn!(conn_id = %conn_id, error = %e, "framing error");
                break;
            }
        };

        let frame: InboundFrame = match serde_json::from_str(&text) {
            Ok(f) => f,
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "malformed frame");
                continue;
            }
        };
        let Some(req) = frame.as_req() else {
            continue;
        };

        let res = dispatch::route(&req, &mut fids, &app).await;
        let json = match serde_json::to_string(&res) {
            Ok(j) => j,
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "response serialisation failed");
                continue;
            }
        };
        if framed.send(json).await.is_err() {
            break;
        }
    }

    info!(conn_id = %conn_id, fids = fids.len(), "connection closed");
}
