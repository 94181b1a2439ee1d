use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use remove_ieds::domain::document::attribute;
use remove_ieds::infra::scl::read_document;
use tempfile::TempDir;

const STATION: &str = include_str!("fixtures/station.scd");

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("station.scd"), STATION).expect("write fixture");
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("remove-ieds").expect("binary exists");
        cmd.current_dir(self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("xdg"))
            .env_remove("REMOVE_IEDS_LOG")
            .env_remove("REMOVE_IEDS_CLOSE_AFTER_REMOVE");
        cmd
    }

    fn backups(&self) -> Vec<PathBuf> {
        fs::read_dir(self.dir.path())
            .expect("read tempdir")
            .map(|entry| entry.expect("dir entry").path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "bak"))
            .collect()
    }
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("run binary");
    assert!(output.status.success(), "command failed: {output:?}");
    String::from_utf8(output.stdout).expect("utf-8 stdout")
}

fn unchanged(path: &Path) -> bool {
    fs::read_to_string(path).expect("read fixture copy") == STATION
}

#[test]
fn help_displays_usage() {
    Command::cargo_bin("remove-ieds")
        .expect("binary exists")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("remove"));
}

#[test]
fn list_prints_headline_and_supporting_text() {
    let ws = Workspace::new();
    let stdout = stdout_of(ws.command().args(["list", "station.scd"]));
    assert_eq!(
        stdout,
        "IED1 — ABB - RTU\n    Bay controller - 1.0 - 2007B4\nIED2 — Siemens - Protection\nIED3 — \n"
    );
}

#[test]
fn list_json_matches_dialog_items() {
    let ws = Workspace::new();
    let stdout = stdout_of(ws.command().args(["list", "station.scd", "--json"]));
    insta::assert_snapshot!(stdout.trim_end(), @r#"
[
  {
    "headline": "IED1 — ABB - RTU",
    "supporting_text": "Bay controller - 1.0 - 2007B4",
    "ied": {
      "name": "IED1",
      "occurrence": 0
    },
    "selected": false
  },
  {
    "headline": "IED2 — Siemens - Protection",
    "supporting_text": "",
    "ied": {
      "name": "IED2",
      "occurrence": 0
    },
    "selected": false
  },
  {
    "headline": "IED3 — ",
    "supporting_text": "",
    "ied": {
      "name": "IED3",
      "occurrence": 0
    },
    "selected": false
  }
]
"#);
}

#[test]
fn remove_writes_output_without_touching_input() {
    let ws = Workspace::new();
    ws.command()
        .args(["remove", "station.scd", "--ied", "IED2", "-o", "out/station.scd"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed IED2"))
        .stdout(predicate::str::contains("wrote"));

    assert!(unchanged(&ws.path("station.scd")));
    assert!(ws.backups().is_empty());

    let doc = read_document(&ws.path("out/station.scd")).expect("output parses");
    let names: Vec<_> = doc
        .ieds()
        .iter()
        .filter_map(|(_, ied)| attribute(ied, "name"))
        .collect();
    assert_eq!(names, ["IED1", "IED3"]);
    assert_eq!(doc.descendants_named("ConnectedAP").len(), 1);
    assert!(doc.descendants_named("ExtRef").is_empty());

    let lnodes = doc.descendants_named("LNode");
    assert_eq!(attribute(lnodes[0].1, "iedName"), Some("IED1"));
    assert_eq!(attribute(lnodes[1].1, "iedName"), Some("None"));
    assert_eq!(attribute(lnodes[1].1, "ldInst"), None);
}

#[test]
fn remove_in_place_keeps_a_backup() {
    let ws = Workspace::new();
    ws.command()
        .args(["remove", "station.scd", "--ied", "IED1", "--ied", "IED3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed IED1"))
        .stdout(predicate::str::contains("removed IED3"));

    let backups = ws.backups();
    assert_eq!(backups.len(), 1);
    assert!(unchanged(&backups[0]));

    let doc = read_document(&ws.path("station.scd")).expect("rewritten file parses");
    assert_eq!(doc.ieds().len(), 1);
    assert!(doc.find_ied("IED2").is_some());
    assert!(doc.descendants_named("IEDName").is_empty());
}

#[test]
fn dry_run_reports_without_writing() {
    let ws = Workspace::new();
    ws.command()
        .args(["remove", "station.scd", "--ied", "IED1", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would remove IED1"))
        .stdout(predicate::str::contains("wrote").not());

    assert!(unchanged(&ws.path("station.scd")));
    assert!(ws.backups().is_empty());
}

#[test]
fn unknown_ied_fails_before_any_change() {
    let ws = Workspace::new();
    ws.command()
        .args(["remove", "station.scd", "--ied", "IED1", "--ied", "NOPE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no IED named NOPE"));

    assert!(unchanged(&ws.path("station.scd")));
}

#[test]
fn non_scl_input_is_rejected() {
    let ws = Workspace::new();
    fs::write(ws.path("other.xml"), "<Project/>").expect("write file");
    ws.command()
        .args(["list", "other.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("other.xml"));
}

#[test]
fn completions_are_generated() {
    Command::cargo_bin("remove-ieds")
        .expect("binary exists")
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("remove-ieds"));
}

#[test]
fn remove_by_name_covers_duplicates_and_leaves_unnamed_ieds() {
    let ws = Workspace::new();
    fs::write(
        ws.path("twins.scd"),
        r#"<SCL><IED name="X" type="a"/><IED type="b"/><IED name="X" type="c"/></SCL>"#,
    )
    .expect("write file");
    ws.command()
        .args(["remove", "twins.scd", "--ied", "X"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed X\n"))
        .stdout(predicate::str::contains("removed X #2"));

    let doc = read_document(&ws.path("twins.scd")).expect("rewritten file parses");
    let kinds: Vec<_> = doc
        .ieds()
        .iter()
        .filter_map(|(_, ied)| attribute(ied, "type"))
        .collect();
    assert_eq!(kinds, ["b"]);
}
