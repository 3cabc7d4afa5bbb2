use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn lkb_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("lkb");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    // Input files covering the main upload kinds
    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();
    fs::write(
        files_dir.join("mod1.bas"),
        "Public Sub SavePrice()\n    sql = \"UPDATE items SET price = 100 WHERE plu = '123'\" \nEnd Sub\n\nPrivate Function GetItem()\n    q = \"SELECT plu, price FROM items\" \nEnd Function\n",
    )
    .unwrap();
    fs::write(
        files_dir.join("schema.sql"),
        "CREATE TABLE items (plu TEXT, price INT);\nSELECT plu FROM items;\n",
    )
    .unwrap();
    fs::write(
        files_dir.join("batch.log"),
        "mulai proses harian\nselect harga from items\nharga tidak sesuai pada plu 123\nselesai\n",
    )
    .unwrap();
    fs::write(
        files_dir.join("backup.sop"),
        "Backup Procedure\ncategory: ops\n1. Stop the service\n2. Copy the data directory\n",
    )
    .unwrap();

    let config_content = format!(
        r#"[store]
path = "{}/data/kb.json"
"#,
        root.display()
    );
    let config_path = config_dir.join("lkb.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_lkb(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = lkb_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run lkb binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn file_arg(config_path: &Path, name: &str) -> String {
    config_path
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("files")
        .join(name)
        .to_str()
        .unwrap()
        .to_string()
}

#[test]
fn test_init_creates_store() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_lkb(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/kb.json").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_lkb(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_lkb(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_ingest_code_reports_counts() {
    let (_tmp, config_path) = setup_test_env();
    run_lkb(&config_path, &["init"]);

    let file = file_arg(&config_path, "mod1.bas");
    let (stdout, stderr, success) =
        run_lkb(&config_path, &["ingest", "--kind", "code", &file]);
    assert!(success, "ingest failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Extracted: 2 functions, 2 SQL queries"));
    assert!(stdout.contains("ok"));
}

#[test]
fn test_ingest_log_writes_error_log_and_flow() {
    let (_tmp, config_path) = setup_test_env();
    run_lkb(&config_path, &["init"]);

    let file = file_arg(&config_path, "batch.log");
    let (stdout, _, success) = run_lkb(&config_path, &["ingest", "--kind", "log", &file]);
    assert!(success);
    assert!(stdout.contains("Detected: 1 error patterns"));
    assert!(stdout.contains("records written: 2"));

    let (stdout, _, success) = run_lkb(&config_path, &["list", "error_logs"]);
    assert!(success);
    assert!(stdout.contains("error_logs (1 records)"));

    let (stdout, _, success) = run_lkb(&config_path, &["list", "flows"]);
    assert!(success);
    assert!(stdout.contains("flows (1 records)"));
    assert!(stdout.contains("Flow from batch.log"));
}

#[test]
fn test_ingest_sql_populates_query_library() {
    let (_tmp, config_path) = setup_test_env();
    run_lkb(&config_path, &["init"]);

    let file = file_arg(&config_path, "schema.sql");
    let (stdout, _, success) = run_lkb(&config_path, &["ingest", "--kind", "sql", &file]);
    assert!(success);
    assert!(stdout.contains("Extracted: 2 SQL queries"));

    let (stdout, _, _) = run_lkb(&config_path, &["list", "query_library"]);
    assert!(stdout.contains("query_library (2 records)"));
}

#[test]
fn test_ingest_sop_parses_steps() {
    let (_tmp, config_path) = setup_test_env();
    run_lkb(&config_path, &["init"]);

    let file = file_arg(&config_path, "backup.sop");
    let (stdout, _, success) = run_lkb(&config_path, &["ingest", "--kind", "sop", &file]);
    assert!(success);
    assert!(stdout.contains("Parsed: 2 procedure steps"));
}

#[test]
fn test_search_finds_ingested_content() {
    let (_tmp, config_path) = setup_test_env();
    run_lkb(&config_path, &["init"]);
    let file = file_arg(&config_path, "schema.sql");
    run_lkb(&config_path, &["ingest", "--kind", "sql", &file]);

    let (stdout, _, success) = run_lkb(&config_path, &["search", "items"]);
    assert!(success);
    assert!(stdout.contains("results"));
    assert!(stdout.contains("[query_library]"));

    let (stdout, _, success) = run_lkb(&config_path, &["search", "no-such-keyword"]);
    assert!(success);
    assert!(stdout.contains("No results"));
}

#[test]
fn test_export_import_round_trip() {
    let (tmp, config_path) = setup_test_env();
    run_lkb(&config_path, &["init"]);
    let file = file_arg(&config_path, "batch.log");
    run_lkb(&config_path, &["ingest", "--kind", "log", &file]);

    let backup = tmp.path().join("backup.json");
    let (_, _, success) = run_lkb(
        &config_path,
        &["export", "--output", backup.to_str().unwrap()],
    );
    assert!(success);
    assert!(backup.exists());

    let (_, _, success) = run_lkb(&config_path, &["clear"]);
    assert!(success);
    let (stdout, _, _) = run_lkb(&config_path, &["list", "error_logs"]);
    assert!(stdout.contains("(0 records)"));

    let (stdout, _, success) = run_lkb(&config_path, &["import", backup.to_str().unwrap()]);
    assert!(success, "import failed: {}", stdout);
    let (stdout, _, _) = run_lkb(&config_path, &["list", "error_logs"]);
    assert!(stdout.contains("(1 records)"));
}

#[test]
fn test_merge_reports_added_count() {
    let (tmp, config_path) = setup_test_env();
    run_lkb(&config_path, &["init"]);

    let extra = tmp.path().join("extra.json");
    fs::write(
        &extra,
        r#"{"flows": [{"id": "f-1", "title": "imported flow", "source": "x", "diagram_text": "sequenceDiagram"}]}"#,
    )
    .unwrap();

    let (stdout, _, success) = run_lkb(&config_path, &["merge", extra.to_str().unwrap()]);
    assert!(success);
    assert!(stdout.contains("records added: 1"));

    // Merging the same snapshot again adds nothing
    let (stdout, _, _) = run_lkb(&config_path, &["merge", extra.to_str().unwrap()]);
    assert!(stdout.contains("records added: 0"));
}

#[test]
fn test_stats_lists_every_collection() {
    let (_tmp, config_path) = setup_test_env();
    run_lkb(&config_path, &["init"]);
    let file = file_arg(&config_path, "schema.sql");
    run_lkb(&config_path, &["ingest", "--kind", "sql", &file]);

    let (stdout, _, success) = run_lkb(&config_path, &["stats"]);
    assert!(success);
    assert!(stdout.contains("query_library"));
    assert!(stdout.contains("other_files"));
    assert!(stdout.contains("total"));
    assert!(stdout.contains("store size"));
}

#[test]
fn test_validate_reports_ok_on_fresh_store() {
    let (_tmp, config_path) = setup_test_env();
    run_lkb(&config_path, &["init"]);

    let (stdout, _, success) = run_lkb(&config_path, &["validate"]);
    assert!(success);
    assert!(stdout.contains("ok"));
}

#[test]
fn test_unknown_collection_fails() {
    let (_tmp, config_path) = setup_test_env();
    run_lkb(&config_path, &["init"]);

    let (_, stderr, success) = run_lkb(&config_path, &["list", "nonsense"]);
    assert!(!success);
    assert!(stderr.contains("unknown collection"));
}

#[test]
fn test_unknown_kind_fails() {
    let (_tmp, config_path) = setup_test_env();
    run_lkb(&config_path, &["init"]);

    let file = file_arg(&config_path, "schema.sql");
    let (_, stderr, success) = run_lkb(&config_path, &["ingest", "--kind", "wat", &file]);
    assert!(!success);
    assert!(stderr.contains("unknown upload kind"));
}

#[test]
fn test_get_update_delete_lifecycle() {
    let (_tmp, config_path) = setup_test_env();
    run_lkb(&config_path, &["init"]);
    let file = file_arg(&config_path, "backup.sop");
    run_lkb(&config_path, &["ingest", "--kind", "sop", &file]);

    // Extract the id from the list output
    let (stdout, _, _) = run_lkb(&config_path, &["list", "sop_library"]);
    let id = stdout
        .lines()
        .find_map(|l| l.trim().strip_prefix("id: "))
        .map(|rest| rest.split_whitespace().next().unwrap().to_string())
        .expect("no record id in list output");

    let (stdout, _, success) = run_lkb(&config_path, &["get", "sop_library", &id]);
    assert!(success);
    assert!(stdout.contains("\"category\": \"ops\""));

    let (stdout, _, success) = run_lkb(
        &config_path,
        &["update", "sop_library", &id, r#"{"category": "maintenance"}"#],
    );
    assert!(success);
    assert!(stdout.contains("\"category\": \"maintenance\""));

    let (stdout, _, success) = run_lkb(&config_path, &["delete", "sop_library", &id]);
    assert!(success);
    assert!(stdout.contains("deleted"));

    let (_, stderr, success) = run_lkb(&config_path, &["get", "sop_library", &id]);
    assert!(!success);
    assert!(stderr.contains("not found"));
}
