use std::path::Path;
use std::process::Command;

fn write_text(path: &Path, txt: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, txt).expect("write text");
}

fn mirrorkit() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mirrorkit"))
}

#[test]
fn mirrors_tree_and_prints_summary() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    write_text(&src.join("a/b.txt"), "b");
    write_text(&dst.join("stale.txt"), "old");

    let output = mirrorkit().arg(&src).arg(&dst).output().expect("run mirrorkit");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("[SYNC]"));
    assert!(stdout.contains("copied=1"));
    assert!(stdout.contains("deleted=1"));
    assert_eq!(std::fs::read_to_string(dst.join("a/b.txt")).expect("read"), "b");
    assert!(!dst.join("stale.txt").exists());
}

#[test]
fn config_file_supplies_roots_and_dry_run() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    write_text(&src.join("a.txt"), "a");
    let path_config = tmp.path().join("sync.toml");
    std::fs::write(
        &path_config,
        format!(
            "source_root = {:?}\ndestination_root = {:?}\ndry_run = true\n",
            src.display().to_string(),
            dst.display().to_string()
        ),
    )
    .expect("write config");

    let output = mirrorkit()
        .arg("--config")
        .arg(&path_config)
        .output()
        .expect("run mirrorkit");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("[DRY-RUN]"));
    assert!(!dst.exists());
}

#[test]
fn missing_source_exits_with_configuration_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let output = mirrorkit()
        .arg(tmp.path().join("missing"))
        .arg(tmp.path().join("dst"))
        .output()
        .expect("run mirrorkit");
    assert_eq!(output.status.code(), Some(2));
    assert!(!tmp.path().join("dst").exists());
}

#[test]
fn zero_threads_is_rejected() {
    let tmp = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(tmp.path().join("src")).expect("mkdir");
    let output = mirrorkit()
        .args(["--threads-per-worker", "0"])
        .arg(tmp.path().join("src"))
        .arg(tmp.path().join("dst"))
        .output()
        .expect("run mirrorkit");
    assert_eq!(output.status.code(), Some(2));
}
