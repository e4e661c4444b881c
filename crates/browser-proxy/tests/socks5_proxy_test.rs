// Integration tests for SOCKS5 proxies
//
// The mock SOCKS5 server tunnels every CONNECT to the local origin server and
// records the requested destination, which must be the unresolved host name.


use browser_proxy::protocol::{BrowserContextOptions, ProxySettings};
use browser_proxy::routing::{ConnectionPlan, ProxyScheme};
use browser_proxy::{Browser, LaunchOptions};
use test_server::{MockSocks5Proxy, TestServer};

#[tokio::test]
async fn test_socks5_context_proxy() {
    test_server::init_tracing();
    let origin = TestServer::start().await;
    let proxy = MockSocks5Proxy::start(origin.addr()).await;

    let browser = Browser::launch_with_options(
        LaunchOptions::new().proxy(ProxySettings::new("http://per-context")),
    )
    .unwrap();
    let context = browser
        .new_context_with_options(
            BrowserContextOptions::builder()
                .proxy(ProxySettings::new(proxy.server()))
                .build(),
        )
        .unwrap();
    assert_eq!(context.proxy().unwrap().scheme(), ProxyScheme::Socks5);

    let page = context.new_page().unwrap();
    let response = page
        .goto("http://non-existent.com/target.html", None)
        .await
        .expect("Navigation through SOCKS5 should succeed")
        .unwrap();

    assert!(response.ok());
    assert!(
        response
            .text()
            .unwrap()
            .contains("<title>Served by the proxy</title>")
    );
    match response.connection_plan() {
        ConnectionPlan::Socks5Tunnel { server } => {
            assert_eq!(server.scheme(), ProxyScheme::Socks5);
            assert_eq!(server.host(), "127.0.0.1");
        }
        other => panic!("Expected a SOCKS5 tunnel, got {}", other),
    }
    assert_eq!(proxy.targets(), vec![("non-existent.com".to_string(), 80)]);

    browser.close();
    proxy.shutdown();
    origin.shutdown();
}

#[tokio::test]
async fn test_socks5_respects_bypass_and_ports() {
    let origin = TestServer::start().await;
    let proxy = MockSocks5Proxy::start(origin.addr()).await;

    let browser = Browser::launch_with_options(
        LaunchOptions::new().proxy(ProxySettings::new(proxy.server()).bypass("127.0.0.1")),
    )
    .unwrap();
    let page = browser.new_page().unwrap();

    // Explicit target ports are forwarded unchanged
    let response = page
        .goto("http://non-existent.com:8080/target.html", None)
        .await
        .unwrap()
        .unwrap();
    assert!(response.ok());
    assert_eq!(proxy.targets(), vec![("non-existent.com".to_string(), 8080)]);

    // Bypassed origin goes direct
    let response = page
        .goto(&format!("{}/target.html", origin.url()), None)
        .await
        .unwrap()
        .unwrap();
    assert!(response.connection_plan().is_direct());
    assert_eq!(proxy.targets().len(), 1);

    browser.close();
    proxy.shutdown();
    origin.shutdown();
}
