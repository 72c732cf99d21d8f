#![cfg(unix)]

mod common;

use std::fs;
use std::time::Instant;

use common::{config_for, fixture, options, write_script};
use ledger_test_framework::error::ErrorDetail;
use ledger_test_framework::prelude::*;
use serial_test::serial;

#[test]
#[serial]
fn check_finds_lines_from_both_streams() {
    let fx = fixture();
    let node = write_script(
        fx.dir.path(),
        "node",
        r#"echo "Node received in {test}"
echo "Adding block. Block hash 0xabc" >&2
exec sleep 30"#,
    );

    let runner = NodeRunner::start_with_options(
        &node,
        &config_for(NodeId::random()),
        "node",
        &fx.log,
        options(Duration::from_secs(5)),
    )
    .unwrap();

    assert!(runner.check(|line| line.contains("Node received in {test}")));
    assert!(runner.check(|line| line.contains("Adding block. Block hash")));
}

#[test]
#[serial]
fn check_times_out_while_node_is_silent() {
    let fx = fixture();
    let node = write_script(fx.dir.path(), "node", "exec sleep 30");

    let runner = NodeRunner::start_with_options(
        &node,
        &config_for(NodeId::random()),
        "node",
        &fx.log,
        options(Duration::from_millis(300)),
    )
    .unwrap();

    let started = Instant::now();

    assert!(!runner.check(|line| line.contains("never")));
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[test]
#[serial]
fn check_ends_early_once_node_has_exited() {
    let fx = fixture();
    let node = write_script(fx.dir.path(), "node", "echo hello");

    let runner = NodeRunner::start_with_options(
        &node,
        &config_for(NodeId::random()),
        "node",
        &fx.log,
        options(Duration::from_secs(20)),
    )
    .unwrap();

    let started = Instant::now();

    assert!(!runner.check(|line| line.contains("Adding block")));
    assert!(started.elapsed() < Duration::from_secs(10));

    // lines captured before the exit are still visible
    assert!(runner.check(|line| line == "hello"));
    assert!(!runner.is_running().unwrap());
}

#[test]
#[serial]
fn check_ends_early_when_forked_child_keeps_output_open() {
    let fx = fixture();
    let node = write_script(fx.dir.path(), "node", "sleep 30 &\necho hello\nexit 1");

    let runner = NodeRunner::start_with_options(
        &node,
        &config_for(NodeId::random()),
        "node",
        &fx.log,
        options(Duration::from_secs(5)),
    )
    .unwrap();

    let started = Instant::now();

    assert!(!runner.check(|line| line.contains("Adding block")));
    assert!(started.elapsed() < Duration::from_secs(3));

    assert!(runner.check(|line| line == "hello"));
    assert!(!runner.is_running().unwrap());
}

#[test]
#[serial]
fn try_check_propagates_predicate_errors() {
    let fx = fixture();
    let node = write_script(fx.dir.path(), "node", "echo garbage\nexec sleep 30");

    let runner = NodeRunner::start_with_options(
        &node,
        &config_for(NodeId::random()),
        "node",
        &fx.log,
        options(Duration::from_secs(5)),
    )
    .unwrap();

    let err = runner
        .try_check(|line| {
            if line == "garbage" {
                Err(Error::assertion("unparsable line".to_string()))
            } else {
                Ok(false)
            }
        })
        .unwrap_err();

    assert!(err.is_assertion());
}

#[test]
#[serial]
fn config_is_written_and_passed_to_the_node() {
    let fx = fixture();
    let node = write_script(
        fx.dir.path(),
        "node",
        r#"[ "$1" = "--config" ] || exit 2
cat "$2"
exec sleep 30"#,
    );

    let node_id = NodeId::random();

    let runner = NodeRunner::start_with_options(
        &node,
        &config_for(node_id),
        "node",
        &fx.log,
        options(Duration::from_secs(5)),
    )
    .unwrap();

    let rpc_address = node_id.listen_rpc_address();
    assert!(runner.check(|line| line.contains(&rpc_address)));

    let config_path = runner.work_dir().join("config.json");
    assert_eq!(runner.config_path(), config_path);
    assert!(fs::read_to_string(&config_path)
        .unwrap()
        .contains(&rpc_address));

    let env = fs::read_to_string(fx.log.dir().join("node.env")).unwrap();
    assert!(env.contains(&format!("NODE_RPC_ADDR={}", node_id.connect_rpc_address())));

    drop(runner);

    let stdout = fs::read_to_string(fx.log.dir().join("node").join("stdout.log")).unwrap();
    assert!(stdout.contains(&rpc_address));
}

#[test]
#[serial]
fn start_fails_when_node_exits_during_startup() {
    let fx = fixture();
    let node = write_script(fx.dir.path(), "node", "exit 3");

    let err = NodeRunner::start_with_options(
        &node,
        &config_for(NodeId::random()),
        "node",
        &fx.log,
        NodeRunnerOptions {
            startup_timeout: Duration::from_secs(5),
            ..options(Duration::from_secs(1))
        },
    )
    .err()
    .unwrap();

    match err.detail() {
        ErrorDetail::UnexpectedExit(e) => assert_eq!(e.code, Some(3)),
        e => panic!("expected unexpected exit, got {e:?}"),
    }
}

#[test]
#[serial]
fn start_continues_when_rpc_port_stays_closed() {
    let fx = fixture();
    let node = write_script(fx.dir.path(), "node", "exec sleep 30");

    let started = Instant::now();

    let runner = NodeRunner::start_with_options(
        &node,
        &config_for(NodeId::random()),
        "node",
        &fx.log,
        NodeRunnerOptions {
            startup_timeout: Duration::from_millis(300),
            ..options(Duration::from_secs(1))
        },
    )
    .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(300));
    assert!(runner.is_running().unwrap());
}

#[test]
#[serial]
fn missing_executable_is_a_launch_failure() {
    let fx = fixture();
    let missing = fx.dir.path().join("no-such-node").display().to_string();

    let err = NodeRunner::start_with_options(
        &missing,
        &config_for(NodeId::random()),
        "node",
        &fx.log,
        options(Duration::from_secs(1)),
    )
    .err()
    .unwrap();

    assert!(err.is_launch_failure());
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn node_is_killed_when_runner_is_dropped() {
    let fx = fixture();
    let node = write_script(fx.dir.path(), "node", "exec sleep 30");

    let pid = {
        let runner = NodeRunner::start_with_options(
            &node,
            &config_for(NodeId::random()),
            "node",
            &fx.log,
            options(Duration::from_secs(1)),
        )
        .unwrap();

        runner.pid()
    };

    assert!(!std::path::Path::new(&format!("/proc/{pid}")).exists());
}

#[test]
#[serial]
fn node_is_killed_when_test_check_fails() {
    let fx = fixture();
    let node = write_script(fx.dir.path(), "node", "exec sleep 30");

    let mut pid = None;

    let scenario = |pid: &mut Option<u32>| -> Result<(), Error> {
        let runner = NodeRunner::start_with_options(
            &node,
            &config_for(NodeId::random()),
            "node",
            &fx.log,
            options(Duration::from_millis(50)),
        )?;

        *pid = Some(runner.pid());

        test_check!(runner.check(|line| line.contains("Adding block")));

        Ok(())
    };

    let err = scenario(&mut pid).unwrap_err();

    assert!(err.is_assertion());
    assert!(err.to_string().contains("Adding block"));

    #[cfg(target_os = "linux")]
    assert!(!std::path::Path::new(&format!("/proc/{}", pid.unwrap())).exists());
}
