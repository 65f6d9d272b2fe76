use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use jobfs_core::JobfsError;
use jobfs_protocol::frames::{ReqFrame, ResFrame};
use jobfs_protocol::messages::{
    AttachParams, FidParams, OpenMode, OpenParams, ReadOk, ReadParams, StatPayload, WalkParams,
    WriteOk, WriteParams,
};
use jobfs_protocol::methods;
use jobfs_tree::{self as tree, read_slice, Node};

use crate::app::AppState;
use crate::conn::FidTable;

/// Route one request frame to the matching tree operation.
pub async fn route(req: &ReqFrame, fids: &mut FidTable, app: &Arc<AppState>) -> ResFrame {
    match req.method.as_str() {
        methods::ATTACH => attach(req, fids, app),
        methods::WALK => walk(req, fids, app),
        methods::OPEN => open(req, fids, app),
        methods::READ => read(req, fids, app).await,
        methods::WRITE => write(req, fids, app).await,
        methods::STAT => stat(req, fids, app).await,
        methods::WSTAT => wstat(req, fids, app),
        methods::CLUNK => clunk(req, fids),
        other => ResFrame::err(
            &req.id,
            "protocol-error",
            &format!("unknown method: {other}"),
        ),
    }
}

// --- handlers --------------------------------------------------------------

fn attach(req: &ReqFrame, fids: &mut FidTable, app: &Arc<AppState>) -> ResFrame {
    let params: AttachParams = match parse_params(req) {
        Ok(p) => p,
        Err(res) => return res,
    };
    debug!(uname = params.uname.as_deref().unwrap_or("-"), "attach");
    fids.insert(params.fid, app.tree.attach());
    ResFrame::ok(&req.id, json!({}))
}

fn walk(req: &ReqFrame, fids: &mut FidTable, app: &Arc<AppState>) -> ResFrame {
    let params: WalkParams = match parse_params(req) {
        Ok(p) => p,
        Err(res) => return res,
    };
    let from = match fid_node(req, fids, params.fid) {
        Ok(n) => n,
        Err(res) => return res,
    };
    match app.tree.walk(&from, &params.names) {
        Ok(node) => {
            fids.insert(params.newfid, node);
            ResFrame::ok(&req.id, json!({}))
        }
        Err(e) => err_frame(&req.id, &e),
    }
}

fn open(req: &ReqFrame, fids: &mut FidTable, app: &Arc<AppState>) -> ResFrame {
    let params: OpenParams = match parse_params(req) {
        Ok(p) => p,
        Err(res) => return res,
    };
    let node = match fid_node(req, fids, params.fid) {
        Ok(n) => n,
        Err(res) => return res,
    };
    let mode = match params.mode {
        OpenMode::Read => tree::OpenMode::Read,
        OpenMode::Write => tree::OpenMode::Write,
        OpenMode::Rdwr => tree::OpenMode::ReadWrite,
    };
    match app.tree.open(&node, mode) {
        Ok(()) => ResFrame::ok(&req.id, json!({})),
        Err(e) => err_frame(&req.id, &e),
    }
}

async fn read(req: &ReqFrame, fids: &mut FidTable, app: &Arc<AppState>) -> ResFrame {
    let params: ReadParams = match parse_params(req) {
        Ok(p) => p,
        Err(res) => return res,
    };
    let node = match fid_node(req, fids, params.fid) {
        Ok(n) => n,
        Err(res) => return res,
    };
    let data = if node.is_dir() {
        // Directory listings are materialised here, from the children.
        read_slice(&render_listing(&node), params.offset, params.count)
    } else {
        app.tree.read(&node, params.offset, params.count).await
    };
    ResFrame::ok(
        &req.id,
        ReadOk {
            data: String::from_utf8_lossy(&data).into_owned(),
        },
    )
}

async fn write(req: &ReqFrame, fids: &mut FidTable, app: &Arc<AppState>) -> ResFrame {
    let params: WriteParams = match parse_params(req) {
        Ok(p) => p,
        Err(res) => return res,
    };
    let node = match fid_node(req, fids, params.fid) {
        Ok(n) => n,
        Err(res) => return res,
    };
    // Writes are message-oriented; the offset is ignored.
    match app.tree.write(&node, params.data.as_bytes()).await {
        Ok(count) => ResFrame::ok(&req.id, WriteOk { count }),
        Err(e) => err_frame(&req.id, &e),
    }
}

async fn stat(req: &ReqFrame, fids: &mut FidTable, app: &Arc<AppState>) -> ResFrame {
    let params: FidParams = match parse_params(req) {
        Ok(p) => p,
        Err(res) => return res,
    };
    let node = match fid_node(req, fids, params.fid) {
        Ok(n) => n,
        Err(res) => return res,
    };
    let stat = app.tree.stat(&node).await;
    ResFrame::ok(
        &req.id,
        StatPayload {
            name: stat.name,
            mode: stat.mode,
            owner: stat.owner,
            length: stat.length,
        },
    )
}

fn wstat(req: &ReqFrame, fids: &mut FidTable, app: &Arc<AppState>) -> ResFrame {
    let params: FidParams = match parse_params(req) {
        Ok(p) => p,
        Err(res) => return res,
    };
    let node = match fid_node(req, fids, params.fid) {
        Ok(n) => n,
        Err(res) => return res,
    };
    // Accept-and-ignore; some clients insist on updating stats.
    app.tree.wstat(&node);
    ResFrame::ok(&req.id, json!({}))
}

fn clunk(req: &ReqFrame, fids: &mut FidTable) -> ResFrame {
    let params: FidParams = match parse_params(req) {
        Ok(p) => p,
        Err(res) => return res,
    };
    match fids.remove(&params.fid) {
        Some(_) => ResFrame::ok(&req.id, json!({})),
        None => ResFrame::err(
            &req.id,
            "not-found",
            &format!("unknown fid {}", params.fid),
        ),
    }
}

// --- helpers ---------------------------------------------------------------

fn parse_params<T: DeserializeOwned>(req: &ReqFrame) -> Result<T, ResFrame> {
    req.params
        .clone()
        .and_then(|p| serde_json::from_value(p).ok())
        .ok_or_else(|| ResFrame::err(&req.id, "protocol-error", "invalid params"))
}

fn fid_node(req: &ReqFrame, fids: &FidTable, fid: u32) -> Result<Arc<Node>, ResFrame> {
    fids.get(&fid).cloned().ok_or_else(|| {
        ResFrame::err(&req.id, "not-found", &format!("unknown fid {fid}"))
    })
}

fn err_frame(id: &str, e: &JobfsError) -> ResFrame {
    ResFrame::err(id, e.code(), &e.to_string())
}

fn render_listing(node: &Node) -> Vec<u8> {
    let names = node.child_names();
    if names.is_empty() {
        return Vec::new();
    }
    let mut listing = names.join("\n");
    listing.push('\n');
    listing.into_bytes()
}
