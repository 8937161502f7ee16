use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

const PANEL: &str = r#"(kicad_pcb (version 20221018) (generator pcbnew)
  (net 0 "")
  (gr_line (start 0 0) (end 100 0) (layer "Edge.Cuts") (width 0.1))
  (gr_line (start 100 0) (end 100 100) (layer "Edge.Cuts") (width 0.1))
  (gr_line (start 100 100) (end 0 100) (layer "Edge.Cuts") (width 0.1))
  (gr_line (start 0 100) (end 0 0) (layer "Edge.Cuts") (width 0.1))
  (gr_line (start 200 0) (end 300 0) (layer "Edge.Cuts") (width 0.1))
  (gr_line (start 300 0) (end 300 100) (layer "Edge.Cuts") (width 0.1))
  (gr_line (start 300 100) (end 200 100) (layer "Edge.Cuts") (width 0.1))
  (gr_line (start 200 100) (end 200 0) (layer "Edge.Cuts") (width 0.1))
  (gr_text "LEFT" (at 50 50) (layer "F.SilkS"))
  (footprint "R_0603" (layer "F.Cu") (at 250 50))
)"#;

fn pcb() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pcb"));
    cmd.env_remove("RUST_LOG").env("NO_COLOR", "1");
    cmd
}

fn panel_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.child("panel.kicad_pcb").write_str(PANEL).unwrap();
    temp
}

#[test]
fn splits_panel_into_boards() {
    let temp = panel_dir();

    pcb()
        .current_dir(temp.path())
        .args(["panel", "panel.kicad_pcb", "-o", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Identified 2 PCB rectangles from 8 unique Edge.Cuts",
        ))
        .stdout(predicate::str::contains("Found PCB #1 at -10000;-10000"));

    let first = temp.child("out/board-1.kicad_pcb");
    let second = temp.child("out/board-2.kicad_pcb");
    first.assert(predicate::str::contains("LEFT"));
    first.assert(predicate::str::contains("R_0603").not());
    second.assert(predicate::str::contains("R_0603"));
    second.assert(predicate::str::contains("LEFT").not());
}

#[test]
fn dry_run_writes_nothing() {
    let temp = panel_dir();

    let output = pcb()
        .current_dir(temp.path())
        .args(["panel", "panel.kicad_pcb", "--dry-run", "--margin", "0"])
        .output()
        .unwrap();
    assert!(output.status.success());
    insta::assert_snapshot!(String::from_utf8_lossy(&output.stdout), @r###"
    Identified 2 PCB rectangles from 8 unique Edge.Cuts
    Found PCB #1 at 0;0 -- 100000000;100000000
    Found PCB #2 at 200000000;0 -- 300000000;100000000
    "###);

    temp.child("board-1.kicad_pcb")
        .assert(predicate::path::missing());
}

#[test]
fn custom_name_pattern() {
    let temp = panel_dir();

    pcb()
        .current_dir(temp.path())
        .args(["panel", "panel.kicad_pcb", "--name", "part{}.kicad_pcb"])
        .assert()
        .success();

    temp.child("part1.kicad_pcb").assert(predicate::path::exists());
    temp.child("part2.kicad_pcb").assert(predicate::path::exists());
}

#[test]
fn name_pattern_needs_placeholder() {
    let temp = panel_dir();

    pcb()
        .current_dir(temp.path())
        .args(["panel", "panel.kicad_pcb", "--name", "fixed.kicad_pcb"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("must contain"));
}

#[test]
fn negative_margin_fails() {
    let temp = panel_dir();

    pcb()
        .current_dir(temp.path())
        .args(["panel", "panel.kicad_pcb", "--margin=-5"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Margin must not be negative"));
    temp.child("board-1.kicad_pcb")
        .assert(predicate::path::missing());
}

#[test]
fn missing_panel_fails() {
    let temp = TempDir::new().unwrap();

    pcb()
        .current_dir(temp.path())
        .args(["panel", "nope.kicad_pcb"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load panel nope.kicad_pcb"));
}

#[test]
fn no_outlines_is_not_an_error() {
    let temp = TempDir::new().unwrap();
    temp.child("blank.kicad_pcb")
        .write_str("(kicad_pcb (version 20221018))")
        .unwrap();

    pcb()
        .current_dir(temp.path())
        .args(["panel", "blank.kicad_pcb", "-o", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Identified 0 PCB rectangles"));
    temp.child("out").assert(predicate::path::missing());
}
