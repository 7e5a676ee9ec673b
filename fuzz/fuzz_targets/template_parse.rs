#![no_main]

use std::collections::BTreeMap;

use libfuzzer_sys::fuzz_target;
use lingo_relay::PathTemplate;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let Ok(template) = PathTemplate::parse(&raw) else {
        return;
    };

    let route = template.route_path();
    assert!(!route.contains('<'));

    let bindings: BTreeMap<String, String> = template
        .param_names()
        .map(|name| (name.to_string(), "x".to_string()))
        .collect();
    let resolved = template.resolve(&bindings).expect("all params bound");
    assert!(!resolved.contains('<'));
    let local = template
        .resolve_local_path(&bindings)
        .expect("all params bound");
    assert!(resolved.ends_with(&local));
});
