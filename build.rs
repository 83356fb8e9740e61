use std::env;
use std::process::Command;
use time::OffsetDateTime;

// Exposes APP_BUILD_YEAR and APP_VERSION_DISPLAY to the `--version` output.
fn main() {
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    println!("cargo:rerun-if-env-changed=CARGO_PKG_VERSION");

    let build_year = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|raw| raw.parse::<i64>().ok())
        .and_then(|epoch| OffsetDateTime::from_unix_timestamp(epoch).ok())
        .map(|dt| dt.year())
        .unwrap_or_else(|| OffsetDateTime::now_utc().year());
    println!("cargo:rustc-env=APP_BUILD_YEAR={build_year}");

    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());
    let display = if env::var("PROFILE").as_deref() == Ok("release") {
        version
    } else {
        println!("cargo:rerun-if-changed=.git/HEAD");
        if tagged_as(&format!("v{version}")) {
            version
        } else {
            format!("{version}-dev")
        }
    };
    println!("cargo:rustc-env=APP_VERSION_DISPLAY={display}");
}

fn tagged_as(expected: &str) -> bool {
    Command::new("git")
        .args(["describe", "--tags", "--exact-match"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .is_some_and(|tag| tag.trim() == expected)
}
