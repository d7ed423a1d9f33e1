#![no_main]

use libfuzzer_sys::fuzz_target;
use vocalbank_spec::{Score, TickUnit, FRAME_PERIOD_MS, GUARD_FRAMES};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Anything that parses has been validated and must be safe to size and export.
    if let Ok(score) = Score::from_json(text) {
        let _ = score.total_frames(FRAME_PERIOD_MS, GUARD_FRAMES);
        let _ = score.to_label_text(TickUnit::HundredNanos);
        let _ = score.to_json_pretty();
    }
});
