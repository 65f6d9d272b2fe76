// End-to-end scenarios driven through the dispatch layer, the same code
// path a framed TCP session exercises.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use jobfs_core::config::JobfsConfig;
use jobfs_protocol::frames::{ReqFrame, ResFrame};
use jobfs_protocol::messages::{ReadOk, StatPayload, WriteOk};
use jobfs_protocol::methods;
use jobfs_server::app::AppState;
use jobfs_server::conn::FidTable;
use jobfs_server::defs::{self, DefinitionsLog};
use jobfs_server::dispatch;

/// One simulated protocol session: its own fid table, shared daemon state.
struct Client {
    state: Arc<AppState>,
    fids: FidTable,
    seq: u32,
}

impl Client {
    async fn attach(state: &Arc<AppState>) -> Self {
        let mut client = Self {
            state: Arc::clone(state),
            fids: FidTable::new(),
            seq: 0,
        };
        let res = client
            .call(methods::ATTACH, json!({ "fid": 0, "uname": "test" }))
            .await;
        assert!(res.ok, "attach failed: {res:?}");
        client
    }

    async fn call(&mut self, method: &str, params: serde_json::Value) -> ResFrame {
        self.seq += 1;
        let req = ReqFrame::new(self.seq.to_string(), method, params);
        dispatch::route(&req, &mut self.fids, &self.state).await
    }

    async fn walk(&mut self, newfid: u32, path: &[&str]) -> ResFrame {
        self.call(
            methods::WALK,
            json!({ "fid": 0, "newfid": newfid, "names": path }),
        )
        .await
    }

    /// Walk to `path` and read its full contents.
    async fn read_path(&mut self, path: &[&str]) -> Result<String, String> {
        let res = self.walk(99, path).await;
        if !res.ok {
            return Err(error_code(&res));
        }
        let res = self
            .call(methods::READ, json!({ "fid": 99, "offset": 0, "count": 65536 }))
            .await;
        if !res.ok {
            return Err(error_code(&res));
        }
        let payload: ReadOk = serde_json::from_value(res.payload.unwrap()).unwrap();
        Ok(payload.data)
    }

    /// Walk to `path` and write `data` through it.
    async fn write_path(&mut self, path: &[&str], data: &str) -> Result<usize, String> {
        let res = self.walk(98, path).await;
        if !res.ok {
            return Err(error_code(&res));
        }
        let res = self
            .call(methods::WRITE, json!({ "fid": 98, "data": data }))
            .await;
        if !res.ok {
            return Err(error_code(&res));
        }
        let payload: WriteOk = serde_json::from_value(res.payload.unwrap()).unwrap();
        Ok(payload.count)
    }
}

fn error_code(res: &ResFrame) -> String {
    res.error.as_ref().expect("error frame without error").code.clone()
}

async fn new_state(dir: &TempDir) -> Arc<AppState> {
    let log = DefinitionsLog::open(dir.path().join("definitions"))
        .await
        .unwrap();
    let state = Arc::new(AppState::new(JobfsConfig::default(), log).unwrap());
    defs::replay(&state.registry, &state.definitions)
        .await
        .unwrap();
    state
}

#[tokio::test]
async fn create_and_inspect() {
    let dir = TempDir::new().unwrap();
    let state = new_state(&dir).await;
    let mut client = Client::attach(&state).await;

    let n = client
        .write_path(&["clone"], "hello:* * * * *:echo hi")
        .await
        .unwrap();
    assert_eq!(n, "hello:* * * * *:echo hi".len());

    assert_eq!(
        client.read_path(&["jobs", "hello", "cmd"]).await.unwrap(),
        "echo hi"
    );
    assert_eq!(
        client.read_path(&["jobs", "hello", "ctl"]).await.unwrap(),
        "stopped"
    );
    assert_eq!(
        client
            .read_path(&["jobs", "hello", "schedule"])
            .await
            .unwrap(),
        "* * * * *"
    );
    assert_eq!(client.read_path(&["jobs", "hello", "log"]).await.unwrap(), "");
}

#[tokio::test]
async fn duplicate_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    let state = new_state(&dir).await;
    let mut client = Client::attach(&state).await;

    client
        .write_path(&["clone"], "hello:* * * * *:echo hi")
        .await
        .unwrap();
    let err = client
        .write_path(&["clone"], "hello:* * * * *:echo hi")
        .await
        .unwrap_err();
    assert_eq!(err, "duplicate-name");
    assert_eq!(state.registry.len(), 1);
}

#[tokio::test]
async fn start_fire_stop() {
    let dir = TempDir::new().unwrap();
    let state = new_state(&dir).await;
    let mut client = Client::attach(&state).await;

    // Second-granularity schedule so two fires arrive quickly.
    client
        .write_path(&["clone"], "hello:* * * * * *:echo hi")
        .await
        .unwrap();
    client
        .write_path(&["jobs", "hello", "ctl"], "start")
        .await
        .unwrap();
    assert_eq!(
        client.read_path(&["jobs", "hello", "ctl"]).await.unwrap(),
        "started"
    );

    tokio::time::sleep(Duration::from_millis(3200)).await;

    client
        .write_path(&["jobs", "hello", "ctl"], "stop")
        .await
        .unwrap();
    assert_eq!(
        client.read_path(&["jobs", "hello", "ctl"]).await.unwrap(),
        "stopped"
    );

    let log = client.read_path(&["jobs", "hello", "log"]).await.unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert!(lines.first().unwrap().ends_with(":started"));
    assert!(lines.last().unwrap().ends_with(":completed"));
    let fires = lines.iter().filter(|l| l.ends_with(":hi")).count();
    assert!(fires >= 2, "expected at least two fires, log was:\n{log}");
}

#[tokio::test]
async fn schedule_shows_next_fire_while_started() {
    let dir = TempDir::new().unwrap();
    let state = new_state(&dir).await;
    let mut client = Client::attach(&state).await;

    client
        .write_path(&["clone"], "tick:* * * * *:true")
        .await
        .unwrap();
    client
        .write_path(&["jobs", "tick", "ctl"], "start")
        .await
        .unwrap();

    let schedule = client
        .read_path(&["jobs", "tick", "schedule"])
        .await
        .unwrap();
    assert!(
        schedule.starts_with("* * * * *:"),
        "expected expr:next, got {schedule:?}"
    );
    assert!(schedule.len() > "* * * * *:".len());

    client
        .write_path(&["jobs", "tick", "ctl"], "stop")
        .await
        .unwrap();
    assert_eq!(
        client.read_path(&["jobs", "tick", "schedule"]).await.unwrap(),
        "* * * * *"
    );
}

#[tokio::test]
async fn invalid_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    let state = new_state(&dir).await;
    let mut client = Client::attach(&state).await;

    let err = client
        .write_path(&["clone"], "bad name:* * * * *:true")
        .await
        .unwrap_err();
    assert_eq!(err, "invalid-definition");

    let err = client.read_path(&["jobs", "bad name"]).await.unwrap_err();
    assert_eq!(err, "not-found");
    assert!(state.registry.is_empty());
}

#[tokio::test]
async fn invalid_schedule_is_rejected() {
    let dir = TempDir::new().unwrap();
    let state = new_state(&dir).await;
    let mut client = Client::attach(&state).await;

    let err = client
        .write_path(&["clone"], "ok:not-a-cron:true")
        .await
        .unwrap_err();
    assert_eq!(err, "invalid-definition");
    assert!(state.registry.is_empty());
}

#[tokio::test]
async fn malformed_definition_is_rejected() {
    let dir = TempDir::new().unwrap();
    let state = new_state(&dir).await;
    let mut client = Client::attach(&state).await;

    let err = client.write_path(&["clone"], "only-one-field").await.unwrap_err();
    assert_eq!(err, "invalid-definition");
}

#[tokio::test]
async fn read_only_files_reject_writes() {
    let dir = TempDir::new().unwrap();
    let state = new_state(&dir).await;
    let mut client = Client::attach(&state).await;

    client
        .write_path(&["clone"], "hello:* * * * *:echo hi")
        .await
        .unwrap();

    for file in ["schedule", "cmd", "log"] {
        let err = client
            .write_path(&["jobs", "hello", file], "tamper")
            .await
            .unwrap_err();
        assert_eq!(err, "permission-denied", "file {file}");
    }

    // Nothing was perturbed.
    assert_eq!(
        client.read_path(&["jobs", "hello", "cmd"]).await.unwrap(),
        "echo hi"
    );
    assert_eq!(
        client.read_path(&["jobs", "hello", "ctl"]).await.unwrap(),
        "stopped"
    );
}

#[tokio::test]
async fn open_enforces_permission_bits() {
    let dir = TempDir::new().unwrap();
    let state = new_state(&dir).await;
    let mut client = Client::attach(&state).await;

    client
        .write_path(&["clone"], "hello:* * * * *:true")
        .await
        .unwrap();

    let res = client.walk(5, &["jobs", "hello", "cmd"]).await;
    assert!(res.ok);
    let res = client
        .call(methods::OPEN, json!({ "fid": 5, "mode": "read" }))
        .await;
    assert!(res.ok);
    let res = client
        .call(methods::OPEN, json!({ "fid": 5, "mode": "write" }))
        .await;
    assert_eq!(error_code(&res), "permission-denied");
}

#[tokio::test]
async fn unknown_ctl_command_leaves_state_unchanged() {
    let dir = TempDir::new().unwrap();
    let state = new_state(&dir).await;
    let mut client = Client::attach(&state).await;

    client
        .write_path(&["clone"], "hello:* * * * *:true")
        .await
        .unwrap();
    let err = client
        .write_path(&["jobs", "hello", "ctl"], "bounce")
        .await
        .unwrap_err();
    assert_eq!(err, "unknown-command");
    assert_eq!(
        client.read_path(&["jobs", "hello", "ctl"]).await.unwrap(),
        "stopped"
    );
}

#[tokio::test]
async fn concurrent_start_spawns_one_task() {
    let dir = TempDir::new().unwrap();
    let state = new_state(&dir).await;
    let mut setup = Client::attach(&state).await;
    setup
        .write_path(&["clone"], "hello:* * * * *:true")
        .await
        .unwrap();

    let mut first = Client::attach(&state).await;
    let mut second = Client::attach(&state).await;
    let (a, b) = tokio::join!(
        first.write_path(&["jobs", "hello", "ctl"], "start"),
        second.write_path(&["jobs", "hello", "ctl"], "start"),
    );
    a.unwrap();
    b.unwrap();

    setup
        .write_path(&["jobs", "hello", "ctl"], "stop")
        .await
        .unwrap();
    let log = setup.read_path(&["jobs", "hello", "log"]).await.unwrap();
    let started = log.lines().filter(|l| l.ends_with(":started")).count();
    assert_eq!(started, 1, "log was:\n{log}");
}

#[tokio::test]
async fn directory_listings_come_from_children() {
    let dir = TempDir::new().unwrap();
    let state = new_state(&dir).await;
    let mut client = Client::attach(&state).await;

    // Root children in insertion order: the registry dir, then clone.
    assert_eq!(client.read_path(&[]).await.unwrap(), "jobs\nclone\n");
    assert_eq!(client.read_path(&["jobs"]).await.unwrap(), "");

    client
        .write_path(&["clone"], "hello:* * * * *:true")
        .await
        .unwrap();
    assert_eq!(client.read_path(&["jobs"]).await.unwrap(), "hello\n");
    assert_eq!(
        client.read_path(&["jobs", "hello"]).await.unwrap(),
        "ctl\nschedule\ncmd\nlog\n"
    );
}

#[tokio::test]
async fn stat_reflects_modes_and_lengths() {
    let dir = TempDir::new().unwrap();
    let state = new_state(&dir).await;
    let mut client = Client::attach(&state).await;

    client
        .write_path(&["clone"], "hello:* * * * *:echo hi")
        .await
        .unwrap();

    let res = client.walk(7, &["jobs", "hello"]).await;
    assert!(res.ok);
    let res = client.call(methods::STAT, json!({ "fid": 7 })).await;
    let stat: StatPayload = serde_json::from_value(res.payload.unwrap()).unwrap();
    assert_eq!(stat.name, "hello");
    assert_ne!(stat.mode & jobfs_tree::DMDIR, 0);
    assert_eq!(stat.mode & 0o777, 0o555);

    let res = client.walk(8, &["jobs", "hello", "cmd"]).await;
    assert!(res.ok);
    let res = client.call(methods::STAT, json!({ "fid": 8 })).await;
    let stat: StatPayload = serde_json::from_value(res.payload.unwrap()).unwrap();
    assert_eq!(stat.mode, 0o444);
    assert_eq!(stat.length, "echo hi".len() as u64);
}

#[tokio::test]
async fn wstat_is_accepted_and_ignored() {
    let dir = TempDir::new().unwrap();
    let state = new_state(&dir).await;
    let mut client = Client::attach(&state).await;

    let res = client.call(methods::WSTAT, json!({ "fid": 0 })).await;
    assert!(res.ok);
}

#[tokio::test]
async fn clunk_releases_the_fid() {
    let dir = TempDir::new().unwrap();
    let state = new_state(&dir).await;
    let mut client = Client::attach(&state).await;

    let res = client.call(methods::CLUNK, json!({ "fid": 0 })).await;
    assert!(res.ok);
    let res = client.call(methods::STAT, json!({ "fid": 0 })).await;
    assert_eq!(error_code(&res), "not-found");
}

#[tokio::test]
async fn definitions_file_records_every_created_job() {
    let dir = TempDir::new().unwrap();
    let state = new_state(&dir).await;
    let mut client = Client::attach(&state).await;

    for line in ["a:* * * * *:true", "b:* * * * *:true"] {
        client.write_path(&["clone"], line).await.unwrap();
    }

    let persisted = state.definitions.lines().await.unwrap();
    assert_eq!(persisted, vec!["a:* * * * *:true", "b:* * * * *:true"]);
}

#[tokio::test]
async fn rejected_definitions_are_not_persisted() {
    let dir = TempDir::new().unwrap();
    let state = new_state(&dir).await;
    let mut client = Client::attach(&state).await;

    client
        .write_path(&["clone"], "a:* * * * *:true")
        .await
        .unwrap();
    client
        .write_path(&["clone"], "bad name:* * * * *:true")
        .await
        .unwrap_err();
    client
        .write_path(&["clone"], "a:* * * * *:true")
        .await
        .unwrap_err();

    let persisted = state.definitions.lines().await.unwrap();
    assert_eq!(persisted, vec!["a:* * * * *:true"]);
}

#[tokio::test]
async fn replay_restores_jobs_stopped() {
    let dir = TempDir::new().unwrap();

    {
        let state = new_state(&dir).await;
        let mut client = Client::attach(&state).await;
        for line in [
            "a:* * * * *:echo a",
            "b:* * * * *:echo b",
            "c:* * * * *:echo c",
        ] {
            client.write_path(&["clone"], line).await.unwrap();
        }
    }

    // "Restart": fresh state over the same definitions file.
    let state = new_state(&dir).await;
    let mut client = Client::attach(&state).await;
    assert_eq!(state.registry.len(), 3);
    for name in ["a", "b", "c"] {
        assert_eq!(
            client.read_path(&["jobs", name, "ctl"]).await.unwrap(),
            "stopped"
        );
        let job = state.registry.get(name).unwrap();
        assert_eq!(job.state(), jobfs_scheduler::JobState::Stopped);
    }
    assert_eq!(
        client.read_path(&["jobs", "a", "cmd"]).await.unwrap(),
        "echo a"
    );

    // Replay is idempotent: a third startup sees the same registry.
    let state_again = new_state(&dir).await;
    assert_eq!(state_again.registry.len(), 3);
    let persisted = state_again.definitions.lines().await.unwrap();
    assert_eq!(persisted.len(), 3);
}

#[tokio::test]
async fn replay_skips_invalid_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("definitions");
    tokio::fs::write(
        &path,
        "good:* * * * *:true\nbroken line\nalso_good:* * * * *:true\n",
    )
    .await
    .unwrap();

    let log = DefinitionsLog::open(&path).await.unwrap();
    let state = Arc::new(AppState::new(JobfsConfig::default(), log).unwrap());
    let restored = defs::replay(&state.registry, &state.definitions)
        .await
        .unwrap();
    assert_eq!(restored, 2);
    assert!(state.registry.contains("good"));
    assert!(state.registry.contains("also_good"));
}

#[tokio::test]
async fn clone_reads_empty() {
    let dir = TempDir::new().unwrap();
    let state = new_state(&dir).await;
    let mut client = Client::attach(&state).await;
    assert_eq!(client.read_path(&["clone"]).await.unwrap(), "");
}
