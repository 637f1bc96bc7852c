use assert_cmd::Command;
use predicates::prelude::*;

fn mcc() -> Command {
    Command::cargo_bin("mcc").unwrap()
}

#[test]
fn compiles_a_source_argument_to_stdout() {
    mcc()
        .arg("int main(){ return 42; }")
        .assert()
        .success()
        .stdout(predicate::str::contains("main:"))
        .stdout(predicate::str::contains("mov $42, %rax"));
}

#[test]
fn verbose_flag_writes_progress_to_stderr_not_stdout() {
    mcc()
        .arg("-v")
        .arg("int main(){ return 0; }")
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed"))
        .stdout(predicate::str::contains("parsed").not());
}

#[test]
fn no_arguments_is_a_usage_error() {
    mcc().assert().failure().code(1).stderr(predicate::str::contains("usage"));
}

#[test]
fn more_than_one_positional_argument_is_a_usage_error() {
    mcc()
        .arg("int main(){ return 0; }")
        .arg("int f(){ return 1; }")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn syntax_error_reports_a_caret_diagnostic_and_fails() {
    mcc()
        .arg("int main(){ return ; }")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("^"));
}

#[test]
fn undefined_variable_is_a_fatal_diagnostic() {
    mcc()
        .arg("int main(){ return x; }")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("undefined variable"));
}
