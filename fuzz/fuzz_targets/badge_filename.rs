#![no_main]

use libfuzzer_sys::fuzz_target;
use lingo_relay::parse_badge_filename;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    match parse_badge_filename(&raw) {
        Some((stat, extension)) => {
            assert!(!stat.is_empty());
            assert!(!extension.is_empty());
            assert!(!extension.contains('.'));
            assert_eq!(format!("{stat}.{extension}"), raw);
        }
        None => {
            // Either no dot at all, or the dot sits at an edge.
            let split = raw.rsplit_once('.');
            assert!(match split {
                None => true,
                Some((stat, extension)) => stat.is_empty() || extension.is_empty(),
            });
        }
    }
});
