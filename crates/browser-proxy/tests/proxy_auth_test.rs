// Integration tests for proxy authentication
//
// The mock proxy answers 407 unless the expected Proxy-Authorization header
// is present. Credentials are only sent after a challenge, and a challenge is
// answered at most once.


use browser_proxy::protocol::{BrowserContextOptions, ProxySettings};
use browser_proxy::{Browser, Error, LaunchOptions};
use test_server::{ConnectRecord, MockHttpProxy, ProxyBehavior, TestServer};

// base64("user:secret")
const EXPECTED_AUTHORIZATION: &str = "Basic dXNlcjpzZWNyZXQ=";

async fn start_protected_proxy(origin: &TestServer) -> MockHttpProxy {
    MockHttpProxy::start(
        origin.addr(),
        ProxyBehavior::RequireAuthorization(EXPECTED_AUTHORIZATION.to_string()),
    )
    .await
}

fn context_browser() -> Browser {
    Browser::launch_with_options(
        LaunchOptions::new().proxy(ProxySettings::new("http://per-context")),
    )
    .unwrap()
}

#[tokio::test]
async fn test_challenge_without_credentials_fails() {
    let origin = TestServer::start().await;
    let proxy = start_protected_proxy(&origin).await;

    let browser = context_browser();
    let context = browser
        .new_context_with_options(
            BrowserContextOptions::builder()
                .proxy(ProxySettings::new(proxy.server()))
                .build(),
        )
        .unwrap();
    let page = context.new_page().unwrap();

    let err = page
        .goto("http://non-existent.com/target.html", None)
        .await
        .expect_err("407 without credentials must fail");
    assert!(matches!(err, Error::ProxyAuthFailed { .. }), "{:?}", err);

    // No retry without credentials
    assert_eq!(proxy.records().len(), 1);

    browser.close();
    proxy.shutdown();
    origin.shutdown();
}

#[tokio::test]
async fn test_challenge_answered_with_basic_credentials() {
    test_server::init_tracing();
    let origin = TestServer::start().await;
    let proxy = start_protected_proxy(&origin).await;

    let browser = context_browser();
    let context = browser
        .new_context_with_options(
            BrowserContextOptions::builder()
                .proxy(
                    ProxySettings::new(proxy.server())
                        .username("user")
                        .password("secret"),
                )
                .build(),
        )
        .unwrap();
    let page = context.new_page().unwrap();

    let response = page
        .goto("http://non-existent.com/target.html", None)
        .await
        .expect("Authenticated navigation should succeed")
        .unwrap();
    assert!(response.ok());
    assert!(response.text().unwrap().contains("Served by the proxy"));

    assert_eq!(
        proxy.records(),
        vec![
            ConnectRecord {
                target: "non-existent.com:80".to_string(),
                authorization: None,
            },
            ConnectRecord {
                target: "non-existent.com:80".to_string(),
                authorization: Some(EXPECTED_AUTHORIZATION.to_string()),
            },
        ]
    );

    browser.close();
    proxy.shutdown();
    origin.shutdown();
}

#[tokio::test]
async fn test_wrong_credentials_retry_once() {
    let origin = TestServer::start().await;
    let proxy = start_protected_proxy(&origin).await;

    let browser = Browser::launch_with_options(
        LaunchOptions::new().proxy(
            ProxySettings::new(proxy.server())
                .username("user")
                .password("wrong"),
        ),
    )
    .unwrap();
    let page = browser.new_page().unwrap();

    let err = page
        .goto("http://non-existent.com/target.html", None)
        .await
        .expect_err("Rejected credentials must fail");
    assert!(matches!(err, Error::ProxyAuthFailed { .. }), "{:?}", err);

    let records = proxy.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].authorization, None);
    assert!(records[1].authorization.is_some());

    // The password never appears in the error
    assert!(!err.to_string().contains("wrong"));

    browser.close();
    proxy.shutdown();
    origin.shutdown();
}
