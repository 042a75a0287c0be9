//! Languages command handler.

use readaloud_core::{DEFAULT_LANGUAGE, SUPPORTED_LANGUAGES};

/// Execute `readaloud languages`.
pub fn execute() {
    for (code, name) in SUPPORTED_LANGUAGES {
        let marker = if *code == DEFAULT_LANGUAGE { " (default)" } else { "" };
        println!("{code}  {name}{marker}");
    }
}
