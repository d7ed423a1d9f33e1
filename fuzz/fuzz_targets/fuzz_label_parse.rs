#![no_main]

use libfuzzer_sys::fuzz_target;
use vocalbank_spec::{align, normalize_label_text, parse_label_text, TickUnit, FRAME_PERIOD_MS};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing never fails; bad lines become diagnostics.
    let parsed = parse_label_text(text, TickUnit::HundredNanos);
    let alignment = align(&parsed.segments, 256, FRAME_PERIOD_MS);
    assert_eq!(alignment.frames.len(), 256);

    let once = normalize_label_text(text);
    let twice = normalize_label_text(&once.text);
    assert_eq!(once.text, twice.text);
    assert!(!twice.changed);
});
