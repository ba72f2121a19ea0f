//! 命令行端到端测试

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cli() -> Command {
    Command::cargo_bin("pose-tracking-cli").unwrap()
}

/// 在临时目录中写入默认配置，返回 (目录, 配置路径)
fn init_config() -> (TempDir, String) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tracker.toml");
    let path = path.to_str().unwrap().to_string();

    cli().args(["config", "init", &path]).assert().success();
    (dir, path)
}

#[test]
fn test_config_default_prints_toml() {
    cli()
        .args(["config", "default"])
        .assert()
        .success()
        .stdout(predicate::str::contains("planning_frame = \"base_link\""))
        .stdout(predicate::str::contains("[angular]"));
}

#[test]
fn test_config_init_and_check() {
    let (_dir, path) = init_config();

    cli()
        .args(["config", "check", &path])
        .assert()
        .success()
        .stdout(predicate::str::contains("base_link"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let (_dir, path) = init_config();

    cli().args(["config", "init", &path]).assert().failure();
    cli().args(["config", "init", &path, "--force"]).assert().success();
}

#[test]
fn test_config_check_rejects_invalid() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "publish_period = -1.0\n").unwrap();

    cli()
        .args(["config", "check", path.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn test_track_already_at_target() {
    let (_dir, path) = init_config();

    cli()
        .args([
            "track",
            "--config",
            &path,
            "--target",
            "0.1,0,0.2",
            "--start",
            "0.1,0,0.2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Success"));
}

#[test]
fn test_track_converges() {
    let (_dir, path) = init_config();

    cli()
        .args([
            "track",
            "--config",
            &path,
            "--target",
            "0.02,-0.01,0,0,0,0.05",
            "--max-duration",
            "20",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("code 0"));
}

#[test]
fn test_track_stops_at_max_duration() {
    let (_dir, path) = init_config();

    cli()
        .args([
            "track",
            "--config",
            &path,
            "--target",
            "10,0,0",
            "--max-duration",
            "0.3",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Stop requested"));
}

#[test]
fn test_track_rejects_bad_target() {
    cli().args(["track", "--target", "1,2"]).assert().failure();
}

#[test]
fn test_track_rejects_republish_rate_too_high() {
    let (_dir, path) = init_config();

    // 周期舍入为 0ns
    cli()
        .args([
            "track",
            "--config",
            &path,
            "--target",
            "0.1,0,0",
            "--republish-hz",
            "1e12",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("republish-hz"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn test_track_rejects_republish_rate_too_low() {
    let (_dir, path) = init_config();

    // 周期超出 Duration 范围
    cli()
        .args([
            "track",
            "--config",
            &path,
            "--target",
            "0.1,0,0",
            "--republish-hz",
            "1e-300",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("republish-hz"))
        .stderr(predicate::str::contains("panicked").not());
}
