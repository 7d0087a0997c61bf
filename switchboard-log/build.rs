use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Collects the crate names of all `switchboard*` members next to this crate.
fn workspace_crates(root: &Path) -> io::Result<Vec<String>> {
    let mut crates = fs::read_dir(root)?
        .filter_map(Result::ok)
        .filter(|entry| entry.path().join("Cargo.toml").is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with("switchboard"))
        .map(|name| name.replace('-', "_"))
        .collect::<Vec<_>>();

    crates.sort();
    Ok(crates)
}

fn main() -> io::Result<()> {
    let manifest_dir = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").ok_or_else(|| {
        io::Error::other("CARGO_MANIFEST_DIR is not set")
    })?);
    let root = manifest_dir.parent().unwrap_or(&manifest_dir);
    let crates = workspace_crates(root)?;

    let out_dir = env::var_os("OUT_DIR").ok_or_else(|| io::Error::other("OUT_DIR is not set"))?;
    let names = crates
        .iter()
        .map(|name| format!("{name:?}"))
        .collect::<Vec<_>>()
        .join(", ");

    fs::write(
        Path::new(&out_dir).join("constants.gen.rs"),
        format!("const CRATE_NAMES: &[&str] = &[{names}];\n"),
    )?;

    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
