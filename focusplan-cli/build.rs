use std::process::Command;

/// Stamp the short git hash into `focusplan --version`.
fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let workspace_root = format!("{manifest_dir}/..");

    let sha = Command::new("git")
        .args(["-C", &workspace_root, "rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=FOCUSPLAN_BUILD_SHA={sha}");
}
