// Adapters layer: concrete implementations for external systems (console http api, local storage).

pub mod http;
pub mod storage;

pub use http::{AuthScheme, ConsoleClient};
pub use storage::LocalStorage;
