#![no_main]

use browser_proxy::routing::{ProxyServer, plan_for_host};
use browser_proxy::{ProxyConfig, ProxySettings};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(server) = ProxyServer::parse(raw) {
        // Display output must parse back with the same scheme
        let reparsed = ProxyServer::parse(&server.to_string()).expect("display must reparse");
        assert_eq!(server.scheme(), reparsed.scheme());
    }
    if let Ok(config) = ProxyConfig::from_settings(&ProxySettings::new(raw)) {
        let _ = plan_for_host("example.com", Some(&config));
    }
});
