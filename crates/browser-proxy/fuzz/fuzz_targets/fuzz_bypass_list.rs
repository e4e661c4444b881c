#![no_main]

use browser_proxy::routing::BypassMatcher;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    // First line is the bypass list, the rest are hosts to match
    let mut lines = input.lines();
    let matcher = BypassMatcher::parse(lines.next().unwrap_or_default());
    for host in lines {
        let matched = matcher.matches(host);
        // Case never changes the decision
        assert_eq!(matched, matcher.matches(&host.to_ascii_uppercase()));
    }
});
