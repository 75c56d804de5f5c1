use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let crate_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo"));
    let out = crate_dir.join("include").join("formdata_ffi.h");

    match cbindgen::generate(&crate_dir) {
        Ok(bindings) => {
            if let Err(e) = std::fs::create_dir_all(crate_dir.join("include")) {
                println!("cargo:warning=could not create include dir: {e}");
                return;
            }
            bindings.write_to_file(out);
        }
        // Header generation failures are reported, not fatal.
        Err(e) => println!("cargo:warning=cbindgen failed: {e}"),
    }
}
