use chrono::Local;

fn main() {
    // Build timestamp appended to the reported tool version.
    let stamp = Local::now().format(".%Y%m%d%H%M%S").to_string();
    println!("cargo:rustc-env=CEPHFSTOOL_BUILD_STAMP={stamp}");
    println!("cargo:rerun-if-changed=build.rs");
}
