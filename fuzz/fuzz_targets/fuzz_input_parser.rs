#![no_main]

use glide_core::input_parser::parse_encoded_input;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Encoded host records come from untrusted glue code; decoding must
    // never panic, only return an error or an unmapped record.
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(Some(event)) = parse_encoded_input(text) {
        let _ = event.modality();
    }
});
