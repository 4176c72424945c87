use rust_embed::RustEmbed;

/// Browser UI assets, embedded into the binary at compile time.
/// Path is relative to Cargo.toml.
#[derive(RustEmbed)]
#[folder = "web/"]
pub struct WebAssets;
