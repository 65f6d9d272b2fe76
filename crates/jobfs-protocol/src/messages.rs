use serde::{Deserialize, Serialize};

/// Per-connection handle into the served tree.
pub type Fid = u32;

/// `attach` — bind `fid` to the root of the tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachParams {
    pub fid: Fid,
    /// Client user name; recorded in logs only.
    #[serde(default)]
    pub uname: Option<String>,
}

/// `walk` — resolve `names` child-by-child from `fid`, binding the result
/// to `newfid`. An empty `names` duplicates the fid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkParams {
    pub fid: Fid,
    pub newfid: Fid,
    #[serde(default)]
    pub names: Vec<String>,
}

/// `open` — check the requested access mode against the node's permissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenParams {
    pub fid: Fid,
    pub mode: OpenMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenMode {
    Read,
    Write,
    Rdwr,
}

/// `read` — copy up to `count` bytes starting at `offset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadParams {
    pub fid: Fid,
    #[serde(default)]
    pub offset: u64,
    pub count: u32,
}

/// `write` — pass `data` to the node's writer. Writes are
/// message-oriented; `offset` is carried for protocol symmetry but ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteParams {
    pub fid: Fid,
    #[serde(default)]
    pub offset: u64,
    pub data: String,
}

/// `stat`, `wstat`, and `clunk` address a fid and nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FidParams {
    pub fid: Fid,
}

/// Payload of a successful `read`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadOk {
    pub data: String,
}

/// Payload of a successful `write`: bytes consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteOk {
    pub count: usize,
}

/// Payload of a successful `stat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatPayload {
    pub name: String,
    /// Permission bits, with the directory flag in the high bit.
    pub mode: u32,
    pub owner: String,
    pub length: u64,
}
