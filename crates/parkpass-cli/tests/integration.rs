#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn parkpass(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("parkpass").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("PARKPASS_CONFIG", dir.path().join("config.yaml"))
        .env("PARKPASS_DB", dir.path().join("parkpass.db"))
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &TempDir, yaml: &str) {
    std::fs::write(dir.path().join("config.yaml"), yaml).unwrap();
}

/// A localhost port with nothing listening on it.
fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

// ---------------------------------------------------------------------------
// parkpass vehicle
// ---------------------------------------------------------------------------

#[test]
fn default_fleet_is_seeded() {
    let dir = TempDir::new().unwrap();
    parkpass(&dir)
        .args(["vehicle", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("секвойя"))
        .stdout(predicate::str::contains("А606ВО 797"))
        .stdout(predicate::str::contains("паджеро"));
}

#[test]
fn vehicle_add_normalises_and_rejects_duplicates() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "fleet: []\n");

    parkpass(&dir)
        .args(["vehicle", "add", "Пример", "а123вс777", "Тест"])
        .assert()
        .success()
        .stdout(predicate::str::contains("added vehicle 'пример'"));

    parkpass(&dir)
        .args(["vehicle", "add", "ПРИМЕР", "В456ОР99", "Другая"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("vehicle already exists: пример"));

    let out = parkpass(&dir)
        .args(["--json", "vehicle", "list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let list: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["name"], "пример");
    assert_eq!(list[0]["plate"], "А123ВС777");
    assert_eq!(list[0]["model"], "Тест");
}

#[test]
fn vehicle_remove_by_name_and_missing() {
    let dir = TempDir::new().unwrap();
    parkpass(&dir)
        .args(["vehicle", "remove", "Панама"])
        .assert()
        .success();
    parkpass(&dir)
        .args(["vehicle", "remove", "панама"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("vehicle not found"));
    parkpass(&dir)
        .args(["vehicle", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("панама").not());
}

fn vehicle_names(dir: &TempDir) -> Vec<String> {
    let out = parkpass(dir)
        .args(["--json", "vehicle", "list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let list: serde_json::Value = serde_json::from_slice(&out).unwrap();
    list.as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn vehicle_with_numeric_name_is_removed_by_name() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "fleet: []\n");

    let out = parkpass(&dir)
        .args(["--json", "vehicle", "add", "панама", "У657НУ797", "Порше"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let panama: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let panama_id = panama["id"].as_i64().unwrap().to_string();
    parkpass(&dir)
        .args(["vehicle", "add", "300", "К860НК150", "Митсубиси"])
        .assert()
        .success();

    parkpass(&dir)
        .args(["vehicle", "remove", "300"])
        .assert()
        .success();
    assert_eq!(vehicle_names(&dir), vec!["панама".to_string()]);

    parkpass(&dir)
        .args(["vehicle", "remove", "--id", "панама"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--id expects a numeric id"));

    parkpass(&dir)
        .args(["vehicle", "remove", "--id", &panama_id])
        .assert()
        .success();
    assert!(vehicle_names(&dir).is_empty());
}

#[test]
fn vehicle_remove_falls_back_to_id() {
    let dir = TempDir::new().unwrap();
    assert_eq!(vehicle_names(&dir).len(), 3);
    parkpass(&dir)
        .args(["vehicle", "remove", "1"])
        .assert()
        .success();
    assert_eq!(vehicle_names(&dir).len(), 2);
}

// ---------------------------------------------------------------------------
// parkpass parse
// ---------------------------------------------------------------------------

#[test]
fn parse_resolves_vehicle_and_time() {
    let dir = TempDir::new().unwrap();
    parkpass(&dir)
        .args(["parse", "Секвойя", "завтра", "15.30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vehicle:    секвойя"))
        .stdout(predicate::str::contains("15:30"));
}

#[test]
fn parse_out_of_range_time_fails() {
    let dir = TempDir::new().unwrap();
    parkpass(&dir)
        .args(["parse", "25:61"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("(not recognised)"));
}

// ---------------------------------------------------------------------------
// parkpass request / orders
// ---------------------------------------------------------------------------

#[test]
fn failed_request_is_recorded() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        &format!(
            "site_url: http://127.0.0.1:{}/\nrequest_timeout_secs: 2\n",
            closed_port()
        ),
    );

    parkpass(&dir)
        .args(["request", "панама", "завтра", "10:00"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Ошибка сети"))
        .stderr(predicate::str::contains("recorded as order #1"));

    parkpass(&dir)
        .args(["orders", "recent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("панама"))
        .stdout(predicate::str::contains("У657НУ 797"));

    parkpass(&dir)
        .args(["orders", "active"])
        .assert()
        .success()
        .stdout(predicate::str::contains("панама"));
}

#[test]
fn request_without_time_is_not_submitted() {
    let dir = TempDir::new().unwrap();
    parkpass(&dir)
        .args(["request", "секвойя", "когда-нибудь"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not recognise an entry time"));

    parkpass(&dir)
        .args(["orders", "recent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no orders yet"));
}

#[test]
fn request_without_vehicle_or_default_fails() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "default_vehicle: null\n");
    parkpass(&dir)
        .args(["request", "завтра", "10:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--vehicle"));
}

// ---------------------------------------------------------------------------
// parkpass chat
// ---------------------------------------------------------------------------

#[test]
fn chat_add_then_duplicate() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "fleet: []\n");

    parkpass(&dir)
        .args(["chat", "--user", "7"])
        .write_stdin("/add пример А123ВС777 Тест\n/add пример А123ВС777 Тест\n/cars\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Машина добавлена: пример: А123ВС777 (Тест)"))
        .stdout(predicate::str::contains("Машина 'пример' уже есть в базе"));

    let out = parkpass(&dir)
        .args(["--json", "vehicle", "list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let list: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[test]
fn chat_prompts_for_vehicle_without_default() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "default_vehicle: null\n");

    parkpass(&dir)
        .arg("chat")
        .write_stdin("завтра 10:00\nпривет\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("/pick <id>"))
        .stdout(predicate::str::contains("Не понял время"));
}

// ---------------------------------------------------------------------------
// parkpass config
// ---------------------------------------------------------------------------

#[test]
fn config_init_show_validate() {
    let dir = TempDir::new().unwrap();
    parkpass(&dir).args(["config", "init"]).assert().success();
    assert!(dir.path().join("config.yaml").exists());

    parkpass(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    parkpass(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("site_url: https://parkspot.ru/"));

    parkpass(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config OK"));
}

#[test]
fn config_validate_reports_errors() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "site_url: parkspot.ru\n");
    parkpass(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("error: site_url"));
}

#[test]
fn check_unreachable_site_fails() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        &format!(
            "site_url: http://127.0.0.1:{}/\ncheck_timeout_secs: 2\n",
            closed_port()
        ),
    );
    parkpass(&dir)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not reachable"));
}
