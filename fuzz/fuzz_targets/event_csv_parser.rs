#![no_main]

use libfuzzer_sys::fuzz_target;
use funnelscope::ingest::parse_events_csv;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must yield rows or row errors, never a panic
    if let Ok(result) = parse_events_csv(data, "fuzz") {
        for event in &result.records {
            assert!(!event.funnel_id.trim().is_empty());
        }
    }
});
