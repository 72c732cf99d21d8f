#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use ledger_test_framework::prelude::*;
use tempfile::TempDir;

pub struct Fixture {
    pub dir: TempDir,
    pub log: TestLog,
}

pub fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let log = TestLog::create(dir.path().join("case"), "case_log").unwrap();

    Fixture { dir, log }
}

/**
   Write an executable `/bin/sh` script named `name` into `dir` and return
   its path.
*/
pub fn write_script(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);

    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

    path.display().to_string()
}

pub fn options(check_timeout: Duration) -> NodeRunnerOptions {
    NodeRunnerOptions {
        check_policy: CheckPolicy {
            timeout: check_timeout,
            interval: Duration::from_millis(20),
        },
        startup_timeout: Duration::ZERO,
    }
}

pub fn config_for(node_id: NodeId) -> ConfigBlob {
    generate_config(&node_id, &ConfigOverrides::default()).unwrap()
}
