#![no_main]

use browser_proxy::{BrowserContextOptions, ProxySettings};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let _ = ProxySettings::from_value(&value);
    let _ = BrowserContextOptions::from_value(&value);
});
