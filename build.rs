use std::path::Path;

fn main() {
    // Embedded UI assets, relative to the crate root
    let web_assets_path = Path::new("web");

    // rust-embed refuses to compile against a missing folder
    if !web_assets_path.exists() {
        println!("cargo:warning=Web assets directory doesn't exist. Creating placeholder...");
        if let Err(e) = std::fs::create_dir_all(web_assets_path) {
            println!("cargo:warning=Failed to create web assets directory: {}", e);
        }
    }

    println!("cargo:rerun-if-changed=web");
    println!("cargo:rerun-if-changed=migrations");
    println!("cargo:rerun-if-changed=build.rs");
}
