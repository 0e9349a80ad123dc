use std::path::Path;
use std::process::Command;

const BUILD_ID_VAR: &str = "CLEANER_BUILD_SHA";

fn main() {
    println!("cargo:rerun-if-env-changed={BUILD_ID_VAR}");

    // packagers building from a tarball pass the id in
    let id = std::env::var(BUILD_ID_VAR)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").ok()?;
            let repo_root = Path::new(&manifest_dir).join("..");
            git_output(&repo_root, &["describe", "--always", "--dirty", "--abbrev=10"])
        })
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env={BUILD_ID_VAR}={id}");
}

fn git_output(repo_root: &Path, args: &[&str]) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .args(args)
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8(out.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
