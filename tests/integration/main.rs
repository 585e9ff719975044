//! Integration tests for rotest-board

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn board() -> Command {
        let mut cmd = cargo_bin_cmd!("rotest-board");
        cmd.env_remove("ROTEST_BOARD_CONFIG");
        cmd
    }

    /// Config file with auditing off so tests never touch the real state dir
    fn config_file(dir: &TempDir, extra: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, format!("[general]\naudit_log = false\n\n{extra}")).unwrap();
        path
    }

    #[test]
    fn help_displays() {
        board()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("live dashboard for rotest resources"));
    }

    #[test]
    fn version_displays() {
        board()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("rotest-board"));
    }

    #[test]
    fn config_path_follows_flag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        board()
            .args(["config", "path", "-c"])
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::contains("custom.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let dir = TempDir::new().unwrap();
        board()
            .args(["config", "show", "-c"])
            .arg(dir.path().join("missing.toml"))
            .assert()
            .success()
            .stdout(predicate::str::contains("[feed]"))
            .stdout(predicate::str::contains("port = 9000"));
    }

    #[test]
    fn config_set_then_show() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        board()
            .args(["config", "set", "feed.host", "rotest.lab", "-c"])
            .arg(&path)
            .assert()
            .success();

        board()
            .args(["config", "show", "-c"])
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::contains("host = \"rotest.lab\""));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let dir = TempDir::new().unwrap();
        board()
            .args(["config", "set", "feed.nope", "1", "-c"])
            .arg(dir.path().join("config.toml"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn invalid_config_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = config_file(&dir, "[feed]\nport = \"nine\"\n");
        board()
            .args(["config", "show", "-c"])
            .arg(&path)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn snapshot_times_out_without_server() {
        let dir = TempDir::new().unwrap();
        let path = config_file(&dir, "");
        board()
            .args(["snapshot", "--timeout-secs", "1", "--host", "127.0.0.1", "--port", "1", "-c"])
            .arg(&path)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Timed out"));
    }

    #[test]
    fn watch_reports_feed_giving_up() {
        let dir = TempDir::new().unwrap();
        let path = config_file(
            &dir,
            "[feed.reconnect]\ninitial_delay_ms = 10\nmax_attempts = 1\n",
        );
        board()
            .args(["watch", "-v", "--host", "127.0.0.1", "--port", "1", "-c"])
            .arg(&path)
            .timeout(std::time::Duration::from_secs(20))
            .assert()
            .failure()
            .stderr(predicate::str::contains("unreachable after 1 attempt"))
            .stderr(predicate::str::contains("Interrupted").not());
    }

    #[test]
    fn lock_unreachable_server_fails() {
        let dir = TempDir::new().unwrap();
        let path = config_file(
            &dir,
            "[control]\nbase_url = \"http://127.0.0.1:1\"\ntimeout_secs = 2\n",
        );
        board()
            .args(["lock", "m1", "-c"])
            .arg(&path)
            .assert()
            .failure()
            .stderr(predicate::str::contains("lock_resource m1 failed"));
    }

    #[test]
    fn release_without_confirmation_is_cancelled() {
        let dir = TempDir::new().unwrap();
        let path = config_file(
            &dir,
            "[control]\nbase_url = \"http://127.0.0.1:1\"\ntimeout_secs = 2\n",
        );
        board()
            .args(["release", "m1", "-c"])
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::contains("Release cancelled"));
    }
}

mod feed_tests {
    use assert_cmd::cargo::cargo_bin_cmd;
    use async_tungstenite::tungstenite::Message;
    use futures_util::{SinkExt, StreamExt};
    use predicates::prelude::*;
    use serde_json::json;
    use std::io::{Read, Write};
    use tempfile::TempDir;

    /// Serve one feed connection from a background runtime
    fn spawn_feed_server(frames: Vec<serde_json::Value>) -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        listener.set_nonblocking(true).unwrap();

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                let (stream, _) = listener.accept().await.unwrap();
                let mut ws = async_tungstenite::tokio::accept_async(stream).await.unwrap();
                for frame in frames {
                    SinkExt::send(&mut ws, Message::text(frame.to_string()))
                        .await
                        .unwrap();
                }
                while let Some(Ok(_)) = ws.next().await {}
            });
        });

        port
    }

    fn initial_frames() -> Vec<serde_json::Value> {
        vec![
            json!({"event_type": "initialize-display-list",
                   "content": {"TestClassData": ["name", "group", "ip"]}}),
            json!({"event_type": "initialize-cache",
                   "content": {"TestClassData": {
                       "2": {"id": 2, "name": "m2", "owner": "alice", "group": "g",
                             "ip": "10.0.0.2"},
                       "1": {"id": 1, "name": "m1", "owner": "", "reserved": "", "ip": "10.0.0.1"}
                   }}}),
        ]
    }

    #[test]
    fn snapshot_prints_plain_records() {
        let port = spawn_feed_server(initial_frames());
        let dir = TempDir::new().unwrap();

        cargo_bin_cmd!("rotest-board")
            .env_remove("ROTEST_BOARD_CONFIG")
            .args(["snapshot", "--format", "plain", "--timeout-secs", "10", "--host", "127.0.0.1"])
            .arg("--port")
            .arg(port.to_string())
            .arg("-c")
            .arg(dir.path().join("config.toml"))
            .assert()
            .success()
            .stdout(predicate::eq(
                "1\tm1\tfree\tUser=\tname=m1\tip=10.0.0.1\n\
                 2\tm2\tlocked\tUser=alice\tname=m2\tip=10.0.0.2\n",
            ));
    }

    #[test]
    fn snapshot_prints_json_for_a_type() {
        let port = spawn_feed_server(initial_frames());
        let dir = TempDir::new().unwrap();

        let output = cargo_bin_cmd!("rotest-board")
            .env_remove("ROTEST_BOARD_CONFIG")
            .args(["snapshot", "-f", "json", "-t", "TestClassData", "--host", "127.0.0.1"])
            .arg("--port")
            .arg(port.to_string())
            .arg("-c")
            .arg(dir.path().join("config.toml"))
            .output()
            .unwrap();

        assert!(output.status.success());
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["fields"], json!(["name", "group", "ip"]));
        assert_eq!(value["records"]["2"]["owner"], "alice");
    }

    #[test]
    fn lock_reports_server_answer() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let body = r#"{"effected_resources": ["m1", "m1-psu"], "user": "alice"}"#;
            let reply = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(reply.as_bytes()).unwrap();
        });

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            format!("[general]\naudit_log = false\n\n[control]\nbase_url = \"{base}\"\n"),
        )
        .unwrap();

        cargo_bin_cmd!("rotest-board")
            .env_remove("ROTEST_BOARD_CONFIG")
            .args(["lock", "m1", "-c"])
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::contains("alice"))
            .stdout(predicate::str::contains("m1, m1-psu"));
    }
}
