//! Error taxonomy -> wire shape mappers. One module per transport, each
//! a total function from `DomainError`/`anyhow::Error` to that transport's
//! native error representation.

pub mod http;
pub mod rpc;
pub mod ws;

pub use http::HttpError;
pub use rpc::IntoStatus;
pub use ws::WsClose;
