use std::{
    env, fs,
    path::PathBuf,
    process::{Command, Output, Stdio},
};

fn bin_path() -> String {
    if let Ok(path) = env::var("CARGO_BIN_EXE_fizzbuzz-bridge") {
        return path;
    }
    let mut fallback =
        PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("manifest dir not set by cargo"));
    fallback.push("target");
    fallback.push("debug");
    fallback.push("fizzbuzz-bridge");
    if cfg!(windows) {
        fallback.set_extension("exe");
    }
    if fallback.exists() {
        return fallback.to_string_lossy().into_owned();
    }
    panic!(
        "binary path not set by cargo test and fallback {:?} not found",
        fallback
    );
}

fn root() -> String {
    env::var("CARGO_MANIFEST_DIR").expect("manifest dir not set by cargo")
}

fn run_bridge(args: &[&str]) -> Output {
    Command::new(bin_path())
        .current_dir(root())
        .args(args)
        .env_remove("FIZZBUZZ_BRIDGE_TRACE")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("failed to run fizzbuzz-bridge")
}

fn fizzbuzz_line(n: usize) -> String {
    match (n % 3, n % 5) {
        (0, 0) => "FizzBuzz".into(),
        (0, _) => "Fizz".into(),
        (_, 0) => "Buzz".into(),
        _ => n.to_string(),
    }
}

#[test]
fn default_run_prints_fizzbuzz_to_fifty() {
    let output = run_bridge(&[]);
    assert!(
        output.status.success(),
        "bridge failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 50);
    for (index, line) in lines.iter().enumerate() {
        assert_eq!(*line, fizzbuzz_line(index + 1), "line {}", index + 1);
    }
    assert!(stdout.ends_with("Buzz\n"));
    assert!(output.stderr.is_empty());
}

#[test]
fn explicit_module_matches_bundled_unit() {
    let bundled = run_bridge(&[]);
    let explicit = run_bridge(&["demos/fizzbuzz.ll"]);
    assert!(explicit.status.success());
    assert_eq!(bundled.stdout, explicit.stdout);
}

#[test]
fn trace_goes_to_stderr_only() {
    let output = Command::new(bin_path())
        .current_dir(root())
        .env("FIZZBUZZ_BRIDGE_TRACE", "1")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("failed to run fizzbuzz-bridge");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[bridge] entering `fizzbuzz`"));
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 50);
}

#[test]
fn module_without_routine_fails_before_output() {
    let output = run_bridge(&["demos/numeric.ll"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("fizzbuzz"), "stderr: {stderr}");
}

#[test]
fn double_returning_routine_runs_with_result_ignored() {
    let output = run_bridge(&["--routine", "cube", "demos/numeric.ll"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
}

#[test]
fn wrong_routine_signature_fails_before_output() {
    let dir = env::temp_dir().join(format!("fizzbuzz-bridge-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    let module = dir.join("int_result.ll");
    fs::write(
        &module,
        "define i32 @fizzbuzz(double %n) {\nentry:\n  ret i32 0\n}\n",
    )
    .expect("write module");

    let output = run_bridge(&[module.to_str().expect("utf8 temp path")]);
    let _ = fs::remove_dir_all(&dir);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("signature_mismatch"), "stderr: {stderr}");
}

#[test]
fn usage_errors_exit_nonzero() {
    let output = run_bridge(&["fizzbuzz.swift"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}
