// Verify the wire format stays stable for existing clients.

use jobfs_protocol::frames::{InboundFrame, ReqFrame, ResFrame};
use jobfs_protocol::messages::{OpenMode, OpenParams, ReadParams, StatPayload, WalkParams};

#[test]
fn req_frame_round_trip() {
    let json = r#"{"type":"req","id":"abc-123","method":"walk","params":{"fid":0,"newfid":1,"names":["jobs","hello"]}}"#;
    let frame: InboundFrame = serde_json::from_str(json).unwrap();
    assert_eq!(frame.frame_type, "req");

    let req = frame.as_req().unwrap();
    assert_eq!(req.method, "walk");
    assert_eq!(req.id, "abc-123");

    let params: WalkParams = serde_json::from_value(req.params.unwrap()).unwrap();
    assert_eq!(params.fid, 0);
    assert_eq!(params.newfid, 1);
    assert_eq!(params.names, vec!["jobs".to_string(), "hello".to_string()]);
}

#[test]
fn res_ok_serialization() {
    let res = ResFrame::ok("req-1", serde_json::json!({ "count": 5 }));
    let json = serde_json::to_string(&res).unwrap();

    assert!(json.contains(r#""type":"res""#));
    assert!(json.contains(r#""ok":true"#));
    assert!(json.contains(r#""count":5"#));
    // error field must be absent on success
    assert!(!json.contains(r#""error""#));
}

#[test]
fn res_err_serialization() {
    let res = ResFrame::err("req-2", "permission-denied", "write on read-only file");
    let json = serde_json::to_string(&res).unwrap();

    assert!(json.contains(r#""ok":false"#));
    assert!(json.contains(r#""permission-denied""#));
    // payload must be absent on error
    assert!(!json.contains(r#""payload""#));
}

#[test]
fn open_mode_is_lowercase_on_the_wire() {
    let params = OpenParams {
        fid: 3,
        mode: OpenMode::Read,
    };
    let json = serde_json::to_string(&params).unwrap();
    assert!(json.contains(r#""mode":"read""#));

    let back: OpenParams = serde_json::from_str(r#"{"fid":3,"mode":"rdwr"}"#).unwrap();
    assert_eq!(back.mode, OpenMode::Rdwr);
}

#[test]
fn read_params_offset_defaults_to_zero() {
    let params: ReadParams = serde_json::from_str(r#"{"fid":1,"count":128}"#).unwrap();
    assert_eq!(params.offset, 0);
    assert_eq!(params.count, 128);
}

#[test]
fn stat_payload_shape() {
    let stat = StatPayload {
        name: "ctl".into(),
        mode: 0o666,
        owner: "jobfs".into(),
        length: 7,
    };
    let json = serde_json::to_string(&stat).unwrap();
    assert!(json.contains(r#""name":"ctl""#));
    assert!(json.contains(r#""length":7"#));
}

#[test]
fn req_frame_constructor_sets_type() {
    let req = ReqFrame::new("r1", "attach", serde_json::json!({ "fid": 0 }));
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains(r#""type":"req""#));
    assert!(json.contains(r#""method":"attach""#));
}

#[test]
fn inbound_frame_rejects_non_req() {
    let json = r#"{"type":"res","id":"x","ok":true}"#;
    let frame: InboundFrame = serde_json::from_str(json).unwrap();
    assert!(frame.as_req().is_none(), "res frame must not parse as req");
}
