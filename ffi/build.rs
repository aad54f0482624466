use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into()));
    let include_dir = crate_dir.join("include");
    if let Err(e) = std::fs::create_dir_all(&include_dir) {
        println!("cargo:warning=cannot create {}: {e}", include_dir.display());
        return;
    }
    let header = include_dir.join("recycle.h");

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("RECYCLE_H")
        .with_cpp_compat(true)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(header);
        }
        Err(e) => println!("cargo:warning=cbindgen could not generate recycle.h: {e}"),
    }
}
