// Context proxies example - One browser, a different proxy per context
//
// Shows: placeholder launch-level proxy, per-context overrides, navigation
//
// Expects an HTTP proxy on 127.0.0.1:3128 and a SOCKS5 proxy on
// 127.0.0.1:1080 (e.g. `ssh -D 1080 host`).

use browser_proxy::{Browser, BrowserContextOptions, LaunchOptions, ProxySettings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Every context overrides the proxy, so the global value is never used
    let browser = Browser::launch_with_options(
        LaunchOptions::new().proxy(ProxySettings::new("http://per-context")),
    )?;

    let http_context = browser.new_context_with_options(
        BrowserContextOptions::builder()
            .proxy(ProxySettings::new("127.0.0.1:3128").bypass("localhost"))
            .build(),
    )?;
    let socks_context = browser.new_context_with_options(
        BrowserContextOptions::builder()
            .proxy(ProxySettings::new("socks5://127.0.0.1:1080"))
            .navigation_timeout(10_000.0)
            .build(),
    )?;

    for context in [&http_context, &socks_context] {
        let page = context.new_page()?;
        match page.goto("http://example.com/", None).await {
            Ok(Some(response)) => println!(
                "{} -> {} {} via {}",
                page.url(),
                response.status(),
                response.status_text(),
                response.connection_plan()
            ),
            Ok(None) => println!("{} -> no response", page.url()),
            Err(e) => println!("Navigation failed: {}", e),
        }
    }

    browser.close();
    Ok(())
}
