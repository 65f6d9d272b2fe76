// Well-known method names — the semantic operations of the file protocol.

pub const ATTACH: &str = "attach";
pub const WALK: &str = "walk";
pub const OPEN: &str = "open";
pub const READ: &str = "read";
pub const WRITE: &str = "write";
pub const STAT: &str = "stat";
pub const WSTAT: &str = "wstat";
pub const CLUNK: &str = "clunk";
