use std::env;

/// Formats the binary can read, in `FileType` order. Text needs no feature.
const FORMATS: [(&str, Option<&str>); 3] = [
    ("text", None),
    ("word", Some("CARGO_FEATURE_WORD")),
    ("pdf", Some("CARGO_FEATURE_PDF")),
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    let enabled: Vec<&str> = FORMATS
        .iter()
        .filter(|(_, feature)| feature.map_or(true, |var| env::var_os(var).is_some()))
        .map(|(name, _)| *name)
        .collect();
    println!("cargo:rustc-env=SIMID_FORMATS={}", enabled.join(", "));
}
