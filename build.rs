use chrono::Utc;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    // Reported in the startup log line
    let stamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    println!("cargo:rustc-env=BUILD_DATE={stamp}");
}
