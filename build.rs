use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs");

    let version = describe().unwrap_or_else(|| {
        std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "unknown".to_string())
    });

    println!("cargo:rustc-env=MEMEDB_VERSION={version}");
}

/// `git describe` output with the tag's leading 'v' removed, or a bare
/// `<pkg>-g<hash>` when the repository has no release tags yet.
fn describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty", "--tags", "--match", "v[0-9]*"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let raw = String::from_utf8(output.stdout).ok()?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    match raw.strip_prefix('v') {
        Some(tagged) => Some(tagged.to_string()),
        None => {
            let pkg = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
            Some(format!("{pkg}-g{raw}"))
        }
    }
}
