use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_foodmap")
}

fn unique_temp_path(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("foodmap-cli-{name}-{stamp}.json"))
}

fn run(data: &Path, args: &[&str]) -> Output {
    Command::new(bin())
        .arg("--data")
        .arg(data)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("foodmap should run")
}

fn seed(path: &Path) {
    fs::write(
        path,
        r#"[
  {"name": "Old Jesse", "address": "41 Tianping Rd", "dishes": "Scallion Fish Head, Red-braised Pork", "cuisine": "Shanghainese", "recommendation": "book ahead", "latitude": 31.2, "longitude": 121.44, "updated": "2024-03-01 08:00:00"},
  {"name": "Lost Heaven", "address": "17 Yan'an Rd", "dishes": "Mushroom Hotpot", "cuisine": "Yunnan", "recommendation": "rooftop", "latitude": 31.23, "longitude": 121.49, "updated": "2024-03-02 08:00:00"}
]"#,
    )
    .expect("fixture should be written");
}

fn stored(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).expect("data file should exist"))
        .expect("data file should be json")
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    let output = Command::new(bin())
        .env("RUST_LOG", "off")
        .output()
        .expect("foodmap should run");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn list_prints_rows_with_full_list_positions() {
    let path = unique_temp_path("list");
    seed(&path);

    let output = run(&path, &["list", "--search", "YUNNAN"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("#\tname\tcuisine\tdishes\tupdated\n"));
    assert!(stdout.contains("1\tLost Heaven\tYunnan"));
    assert!(!stdout.contains("Old Jesse"));

    let none = run(&path, &["list", "-s", "pizza"]);
    assert_eq!(none.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&none.stdout).contains("no shops match 'pizza'"));

    let _ = fs::remove_file(path);
}

#[test]
fn show_renders_details_and_rejects_unknown_index() {
    let path = unique_temp_path("show");
    seed(&path);

    let output = run(&path, &["show", "0"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("  Scallion Fish Head\n  Red-braised Pork\n"));
    assert!(stdout.contains("31.2000, 121.4400"));

    let missing = run(&path, &["show", "7"]);
    assert_eq!(missing.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&missing.stderr).contains("no shop at index 7"));

    let _ = fs::remove_file(path);
}

#[test]
fn add_appends_and_creates_missing_file() {
    let path = unique_temp_path("add");

    let output = run(
        &path,
        &[
            "add", "--name", "Jia Jia Tang Bao", "--dishes", "Crab Soup Dumplings",
            "--cuisine", "Shanghainese", "--latitude", "31.24", "--longitude", "121.47",
        ],
    );
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("added shop #0: Jia Jia Tang Bao"));

    let data = stored(&path);
    assert_eq!(data.as_array().map(Vec::len), Some(1));
    assert_eq!(data[0]["cuisine"], "Shanghainese");
    assert_eq!(data[0]["latitude"], 31.24);

    let _ = fs::remove_file(path);
}

#[test]
fn invalid_add_leaves_file_unchanged() {
    let path = unique_temp_path("invalid-add");
    seed(&path);
    // The first load rewrites the seed in canonical form.
    assert_eq!(run(&path, &["list"]).status.code(), Some(0));
    let before = fs::read_to_string(&path).expect("read");

    let output = run(
        &path,
        &["add", "--name", "Far North", "--latitude", "91", "--longitude", "0"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("latitude must be between -90 and 90"));

    let blank = run(&path, &["add", "--name", "  ", "--latitude", "1", "--longitude", "2"]);
    assert_eq!(blank.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&blank.stderr).contains("shop name must not be empty"));

    assert_eq!(fs::read_to_string(&path).expect("read"), before);

    let _ = fs::remove_file(path);
}

#[test]
fn edit_overlays_given_fields_only() {
    let path = unique_temp_path("edit");
    seed(&path);

    let output = run(
        &path,
        &["edit", "1", "--recommendation", "try the rose cake", "--longitude", "-121.49"],
    );
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("updated shop #1: Lost Heaven"));

    let data = stored(&path);
    assert_eq!(data[1]["recommendation"], "try the rose cake");
    assert_eq!(data[1]["longitude"], -121.49);
    assert_eq!(data[1]["dishes"], "Mushroom Hotpot");
    assert_ne!(data[1]["updated"], "2024-03-02 08:00:00");
    assert_eq!(data[0]["updated"], "2024-03-01 08:00:00");

    let _ = fs::remove_file(path);
}

#[test]
fn delete_asks_for_confirmation() {
    let path = unique_temp_path("delete");
    seed(&path);

    let mut child = Command::new(bin())
        .arg("--data")
        .arg(&path)
        .args(["delete", "0"])
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("foodmap should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(b"n\n")
        .expect("answer should be written");
    let declined = child.wait_with_output().expect("foodmap should finish");
    assert_eq!(declined.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&declined.stderr).contains("Delete 'Old Jesse' permanently?"));
    assert!(String::from_utf8_lossy(&declined.stdout).contains("delete cancelled"));
    assert_eq!(stored(&path).as_array().map(Vec::len), Some(2));

    let confirmed = run(&path, &["delete", "0", "--yes"]);
    assert_eq!(confirmed.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&confirmed.stdout).contains("deleted shop #0: Old Jesse"));
    let data = stored(&path);
    assert_eq!(data.as_array().map(Vec::len), Some(1));
    assert_eq!(data[0]["name"], "Lost Heaven");

    let _ = fs::remove_file(path);
}

#[test]
fn migrate_rewrites_legacy_records() {
    let path = unique_temp_path("migrate");
    fs::write(
        &path,
        r#"[{"name": "Noodle Bar", "location": [1.23, 4.56], "description": "📍 123 Main St<br>Noodles, Dumplings"}]"#,
    )
    .expect("fixture should be written");

    let output = run(&path, &["migrate"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("migration complete: records=1, migrated=1, created=false"));

    let data = stored(&path);
    assert_eq!(data[0]["address"], "123 Main St");
    assert_eq!(data[0]["dishes"], "Noodles, Dumplings");
    assert_eq!(data[0]["latitude"], 1.23);
    assert!(data[0].get("location").is_none());

    let _ = fs::remove_file(path);
}

#[test]
fn unreadable_data_fails_without_rewriting() {
    let path = unique_temp_path("corrupt");
    fs::write(&path, "{\"not\": \"a list\"}").expect("fixture should be written");

    let output = run(&path, &["list"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("load failed"));
    assert_eq!(
        fs::read_to_string(&path).expect("read"),
        "{\"not\": \"a list\"}"
    );

    let _ = fs::remove_file(path);
}
