// Proxy routing example - Inspect connection plans without opening sockets
//
// Shows: ProxySettings parsing, bypass lists, per-host connection plans

use browser_proxy::ProxySettings;
use browser_proxy::routing::{ProxyConfig, plan_for};
use url::Url;

fn main() -> anyhow::Result<()> {
    let config = ProxyConfig::from_settings(
        &ProxySettings::new("socks5://127.0.0.1:1080")
            .bypass("localhost, 1.non.existent.domain.for.the.test, .another.test")
            .username("user")
            .password("secret"),
    )?;

    // Credentials never show up in logs or Display output
    println!("Proxy: {}", config.sanitized_server());
    println!("Bypass rules: {}", config.bypass().rules().len());

    for target in [
        "http://0.non.existent.domain.for.the.test/target.html",
        "http://1.non.existent.domain.for.the.test/target.html",
        "http://foo.is.the.another.test/",
        "http://another.test/",
        "http://LOCALHOST:3000/",
    ] {
        let plan = plan_for(&Url::parse(target)?, Some(&config))?;
        println!("{:<55} -> {}", target, plan);
    }

    Ok(())
}
