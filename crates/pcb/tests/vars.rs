use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

const BOARD: &str = r#"(kicad_pcb (version 20221018) (generator pcbnew)
  (title_block (title "Sensor"))
  (gr_text "rev ${REV} built ${DATE}" (at 10 10) (layer "F.SilkS"))
  (gr_text "${FILENAME}" (at 10 20) (layer "F.SilkS"))
)"#;

fn pcb() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pcb"));
    cmd.env_remove("RUST_LOG").env("NO_COLOR", "1");
    cmd
}

fn board_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.child("main.kicad_pcb").write_str(BOARD).unwrap();
    temp
}

#[test]
fn expands_with_overrides() {
    let temp = board_dir();

    pcb()
        .current_dir(temp.path())
        .args([
            "vars",
            "main.kicad_pcb",
            "-o",
            "out",
            "--var",
            "REV:abc123",
            "--var",
            "DATE:2024-01-01",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("(3 substitutions)"));

    let out = temp.child("out/main.kicad_pcb");
    out.assert(predicate::str::contains("\"rev abc123 built 2024-01-01\""));
    out.assert(predicate::str::contains("\"main.kicad_pcb\""));
    temp.child("main.kicad_pcb")
        .assert(predicate::str::contains("${REV}"));
}

#[test]
fn filename_can_be_overridden() {
    let temp = board_dir();

    pcb()
        .current_dir(temp.path())
        .args([
            "vars",
            ".",
            "-o",
            "out",
            "--var",
            "REV:r1",
            "--var",
            "FILENAME:override.pcb",
        ])
        .assert()
        .success();

    temp.child("out/main.kicad_pcb")
        .assert(predicate::str::contains("\"override.pcb\""));
}

#[test]
fn date_uses_requested_format() {
    let temp = board_dir();

    pcb()
        .current_dir(temp.path())
        .args([
            "vars",
            "main.kicad_pcb",
            "-o",
            "out",
            "--var",
            "REV:r1",
            "--date-format",
            "%%literal",
        ])
        .assert()
        .success();

    temp.child("out/main.kicad_pcb")
        .assert(predicate::str::contains("\"rev r1 built %literal\""));
}

#[test]
fn refuses_to_clobber_input() {
    let temp = board_dir();

    pcb()
        .current_dir(temp.path())
        .args(["vars", "main.kicad_pcb", "--var", "REV:r1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Will not overwrite input file `main.kicad_pcb`",
        ));

    pcb()
        .current_dir(temp.path())
        .args(["vars", "main.kicad_pcb", "-c", "--var", "REV:r1"])
        .assert()
        .success();
    temp.child("main.kicad_pcb")
        .assert(predicate::str::contains("\"rev r1 built"));
}

#[test]
fn rejects_invalid_inputs() {
    let temp = TempDir::new().unwrap();
    temp.child("notes.txt").write_str("hello").unwrap();
    temp.child("empty").create_dir_all().unwrap();

    pcb()
        .current_dir(temp.path())
        .args(["vars", "missing.kicad_pcb"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("doesn't exist"));

    pcb()
        .current_dir(temp.path())
        .args(["vars", "notes.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("doesn't have .kicad_pcb extension"));

    pcb()
        .current_dir(temp.path())
        .args(["vars", "empty"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("doesn't contain any .kicad_pcb files"));
}

#[test]
fn unknown_variable_fails() {
    let temp = TempDir::new().unwrap();
    temp.child("b.kicad_pcb")
        .write_str(r#"(kicad_pcb (gr_text "${WHAT}" (at 0 0)))"#)
        .unwrap();

    pcb()
        .current_dir(temp.path())
        .args(["vars", "b.kicad_pcb", "-o", "out"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown variable `WHAT`"));
}

#[test]
fn self_referencing_variable_fails() {
    let temp = TempDir::new().unwrap();
    temp.child("b.kicad_pcb")
        .write_str(r#"(kicad_pcb (gr_text "${X}" (at 0 0)))"#)
        .unwrap();

    pcb()
        .current_dir(temp.path())
        .args(["vars", "b.kicad_pcb", "-o", "out", "--var", "X:${X}"])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Variable `X` never finishes expanding"));
}

#[test]
fn malformed_var_is_a_usage_error() {
    pcb()
        .args(["vars", "x.kicad_pcb", "--var", "NOVALUE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected NAME:VALUE"));
}

#[test]
fn help_lists_builtin_variables() {
    pcb()
        .args(["vars", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Variables set by default:"))
        .stdout(predicate::str::contains("DOC_COMPANY"))
        .stdout(predicate::str::contains("Current SCM revision of project"));
}
