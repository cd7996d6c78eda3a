// Adapters layer: concrete implementations for external systems (REST API, session, storage).

pub mod http;
pub mod session;
pub mod storage;
