#![cfg(unix)]
pub use _utils::*;

use command_extra::CommandExtra;
use modup_testing_utils::{bin::CommandTempCwd, fake_npm::FakeNpm};
use pretty_assertions::assert_eq;
use std::fs;

const AUDIT_BEFORE: &str =
    r#"{"metadata":{"vulnerabilities":{"info":0,"low":0,"moderate":2,"high":1,"critical":0}}}"#;

fn registry() -> FakeNpm {
    FakeNpm::new().version("react", "18.3.1").version("lodash", "4.17.21").version("jest", "29.7.0")
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn should_print_text_report() {
    let command = CommandTempCwd::init()
        .with_manifest(MANIFEST)
        .with_fixed_modules(r#"{ "dependencies": { "react": "17.0.2" } }"#);
    let Project { modup, root, .. } = project_with(command, registry());

    let output = modup.with_arg("--report").output().expect("execute modup");
    assert!(output.status.success());

    let stdout = stdout_of(&output);
    dbg!(&stdout);
    let lines: Vec<_> = stdout.lines().skip_while(|line| line.is_empty()).skip(1).collect();
    assert_eq!(
        lines,
        [
            "Package  Current  Wanted   Latest   Type",
            "lodash   ^4.0.0   4.17.21  4.17.21  dependencies",
            "react    ^16.0.0  17.0.2   18.3.1   dependencies",
            "jest     ^27.0.0  29.7.0   29.7.0   devDependencies",
        ],
    );

    drop(root); // cleanup
}

#[test]
fn should_report_no_new_dependencies() {
    let npm = FakeNpm::new().version("react", "^16.0.0").version("lodash", "^4.0.0").version(
        "jest",
        "^27.0.0",
    );
    let Project { modup, root, .. } = project(npm);

    let output = modup.with_arg("-r").output().expect("execute modup");
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("- no new dependencies -"));

    drop(root); // cleanup
}

#[test]
fn should_not_print_report_when_silent() {
    let Project { modup, root, .. } = project(registry());

    let output = modup.with_args(["-r", "-s"]).output().expect("execute modup");
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "");
    assert_eq!(String::from_utf8_lossy(&output.stderr), "");

    drop(root); // cleanup
}

#[test]
fn should_save_html_report() {
    let Project { modup, root, workspace, .. } = project(registry());

    let output = modup.with_arg("--saveReportToFile").output().expect("execute modup");
    assert!(output.status.success());
    assert!(!stdout_of(&output).contains("Package"));

    let html = fs::read_to_string(workspace.join("updatedModules.html")).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>\n"));
    assert!(html.contains(r#"<td><span style="color:#FF1B1B">react</span></td>"#));
    assert!(html.contains(r#"<td><span style="color:black">devDependencies</span></td>"#));

    drop(root); // cleanup
}

#[test]
fn should_run_audits_around_the_upgrade() {
    let npm = registry().audit(AUDIT_BEFORE, 1);
    let Project { modup, root, workspace, npm } = project(npm);

    let output = modup.with_arg("--run-audit").output().expect("execute modup");
    assert!(output.status.success());

    eprintln!("Auditing alone does not overwrite the manifest");
    assert!(workspace.join("package.json.new").exists());
    assert_eq!(fs::read_to_string(workspace.join("package.json")).unwrap(), MANIFEST);

    let audits = npm.calls().into_iter().filter(|call| call == "audit --json").count();
    assert_eq!(audits, 2);

    let stdout = stdout_of(&output);
    assert!(stdout.contains("Audit Report: Before"));
    assert!(stdout.contains("Moderate  2 ⇦"));
    assert!(stdout.contains("Audit Report: After"));
    assert!(!stdout.contains("Securing modules..."));

    drop(root); // cleanup
}

#[test]
fn should_fix_audit_between_snapshots() {
    let npm = registry().audit(AUDIT_BEFORE, 1).audit_fix("fixed 3 of 3 vulnerabilities");
    let Project { modup, root, workspace, npm } = project(npm);

    let output = modup.with_arg("-x").output().expect("execute modup");
    assert!(output.status.success());

    eprintln!("Fixing implies overwriting");
    assert!(!workspace.join("package.json.new").exists());

    let calls: Vec<_> =
        npm.calls().into_iter().filter(|call| call.starts_with("audit")).collect();
    assert_eq!(calls, ["audit --json", "audit fix", "audit --json"]);

    let stdout = stdout_of(&output);
    let fix_at = stdout.find("fixed 3 of 3 vulnerabilities").unwrap();
    assert!(stdout.find("Audit Report: Before").unwrap() < fix_at);
    assert!(fix_at < stdout.find("Audit Report: After").unwrap());

    drop(root); // cleanup
}

#[test]
fn should_fail_when_audit_fix_fails() {
    let npm = registry().audit(AUDIT_BEFORE, 1).audit_fix_fails("ERESOLVE unable to resolve");
    let Project { modup, root, npm, .. } = project(npm);

    let output = modup.with_arg("--fix-audit").output().expect("execute modup");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("npm audit fix exited"));

    eprintln!("No after audit is taken once the fix failed");
    let audits = npm.calls().into_iter().filter(|call| call == "audit --json").count();
    assert_eq!(audits, 1);

    drop(root); // cleanup
}
