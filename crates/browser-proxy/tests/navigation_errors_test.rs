// Integration tests for navigation error handling
//
// Tests cover:
// - goto() timeout while the proxy never answers
// - A zero timeout disables the navigation deadline
// - Unreachable proxies are reported, never downgraded to direct connections
// - Direct navigations without any proxy
// - Navigations on closed pages


use browser_proxy::protocol::{BrowserContextOptions, GotoOptions, ProxySettings};
use browser_proxy::{Browser, Error, LaunchOptions};
use std::time::Duration;
use test_server::{MockHttpProxy, ProxyBehavior, TestServer};

#[tokio::test]
async fn test_navigation_timeout_through_silent_proxy() {
    let origin = TestServer::start().await;
    let proxy = MockHttpProxy::start(origin.addr(), ProxyBehavior::Hang).await;

    let browser =
        Browser::launch_with_options(LaunchOptions::new().proxy(ProxySettings::new(proxy.server())))
            .unwrap();
    let page = browser.new_page().unwrap();

    let options = GotoOptions::new().timeout(Duration::from_millis(200));
    let err = page
        .goto("http://non-existent.com/target.html", Some(options))
        .await
        .expect_err("Expected timeout error");

    match &err {
        Error::NavigationTimeout { url, duration_ms } => {
            assert_eq!(url, "http://non-existent.com/target.html");
            assert_eq!(*duration_ms, 200);
        }
        other => panic!("Expected NavigationTimeout, got {:?}", other),
    }
    assert!(err.to_string().contains("timeout"));

    // Failed navigations do not commit
    assert_eq!(page.url(), "about:blank");

    browser.close();
    proxy.shutdown();
    origin.shutdown();
}

#[tokio::test]
async fn test_context_navigation_timeout_default() {
    let origin = TestServer::start().await;
    let proxy = MockHttpProxy::start(origin.addr(), ProxyBehavior::Hang).await;

    let browser = Browser::launch_with_options(
        LaunchOptions::new().proxy(ProxySettings::new("http://per-context")),
    )
    .unwrap();
    let context = browser
        .new_context_with_options(
            BrowserContextOptions::builder()
                .proxy(ProxySettings::new(proxy.server()))
                .navigation_timeout(150.0)
                .build(),
        )
        .unwrap();
    let page = context.new_page().unwrap();

    let err = page
        .goto("http://non-existent.com/", None)
        .await
        .expect_err("Expected timeout error");
    assert!(
        matches!(err, Error::NavigationTimeout { duration_ms: 150, .. }),
        "{:?}",
        err
    );

    browser.close();
    proxy.shutdown();
    origin.shutdown();
}

#[tokio::test]
async fn test_zero_timeout_disables_deadline() {
    let origin = TestServer::start().await;
    let proxy = MockHttpProxy::start(origin.addr(), ProxyBehavior::Open).await;

    // Launch-level 0 applies to every context that does not override it
    let browser = Browser::launch_with_options(
        LaunchOptions::new()
            .proxy(ProxySettings::new(proxy.server()))
            .timeout(0.0),
    )
    .unwrap();
    let page = browser.new_page().unwrap();
    let response = page
        .goto("http://non-existent.com/target.html", None)
        .await
        .expect("Zero launch timeout must not expire")
        .unwrap();
    assert!(response.ok());

    // Context-level 0
    let context = browser
        .new_context_with_options(
            BrowserContextOptions::builder().navigation_timeout(0.0).build(),
        )
        .unwrap();
    let page = context.new_page().unwrap();
    let response = page
        .goto("http://non-existent.com/target.html", None)
        .await
        .expect("Zero context timeout must not expire")
        .unwrap();
    assert!(response.ok());

    // Per-navigation zero overrides a non-zero default
    let context = browser
        .new_context_with_options(
            BrowserContextOptions::builder().navigation_timeout(5000.0).build(),
        )
        .unwrap();
    let page = context.new_page().unwrap();
    let response = page
        .goto(
            "http://non-existent.com/target.html",
            Some(GotoOptions::new().timeout(Duration::ZERO)),
        )
        .await
        .expect("Zero goto timeout must not expire")
        .unwrap();
    assert!(response.text().unwrap().contains("Served by the proxy"));

    assert_eq!(proxy.targets().len(), 3);

    browser.close();
    proxy.shutdown();
    origin.shutdown();
}

#[tokio::test]
async fn test_unreachable_proxy_is_not_bypassed() {
    // Bind then drop to obtain a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead = listener.local_addr().unwrap();
    drop(listener);

    let origin = TestServer::start().await;
    let browser = Browser::launch_with_options(
        LaunchOptions::new().proxy(ProxySettings::new(dead.to_string())),
    )
    .unwrap();
    let page = browser.new_page().unwrap();

    // The origin is reachable directly, but it is not on the bypass list
    let err = page
        .goto(&format!("{}/target.html", origin.url()), None)
        .await
        .expect_err("Unreachable proxy must fail the navigation");
    assert!(matches!(err, Error::ProxyUnreachable { .. }), "{:?}", err);

    browser.close();
    origin.shutdown();
}

#[tokio::test]
async fn test_direct_navigation_without_proxy() {
    let origin = TestServer::start().await;
    let browser = Browser::launch().unwrap();
    let page = browser.new_page().unwrap();

    let response = page
        .goto(&format!("{}/", origin.url()), None)
        .await
        .unwrap()
        .expect("http navigations produce a response");
    assert!(response.ok());
    assert_eq!(response.status(), 200);
    assert!(response.connection_plan().is_direct());
    assert!(response.text().unwrap().contains("Test Page"));

    page.close();
    let err = page
        .goto(&format!("{}/", origin.url()), None)
        .await
        .expect_err("Closed page must reject navigation");
    assert!(matches!(err, Error::TargetClosed { .. }));

    browser.close();
    origin.shutdown();
}
