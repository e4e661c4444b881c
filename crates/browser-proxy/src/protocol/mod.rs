// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Protocol Objects - Browser, contexts, pages and navigation responses
//
// Architecture:
// - Browser owns the launch-level proxy and creates contexts
// - BrowserContext resolves its proxy once and shares it with its pages
// - Page routes every navigation through the context's ProxyRouter

pub mod browser;
pub mod browser_context;
pub mod page;
pub mod proxy;
pub mod response;

pub use browser::Browser;
pub use browser_context::{BrowserContext, BrowserContextOptions, BrowserContextOptionsBuilder};
pub use page::{GotoOptions, Page};
pub use proxy::ProxySettings;
pub use response::Response;
