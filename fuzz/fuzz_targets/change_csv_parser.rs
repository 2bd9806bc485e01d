#![no_main]

use libfuzzer_sys::fuzz_target;
use funnelscope::ingest::parse_changes_csv;

fuzz_target!(|data: &[u8]| {
    if let Ok(result) = parse_changes_csv(data, "fuzz") {
        for change in &result.records {
            assert!((1..=5).contains(&change.severity));
        }
    }
});
