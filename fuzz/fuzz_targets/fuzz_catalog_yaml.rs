#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz catalog parsing and validation with arbitrary YAML input.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(catalog) = maturity_tools::catalog::QuestionCatalog::from_yaml_str(s) {
            let _ = catalog.validate();
        }
    }
});
