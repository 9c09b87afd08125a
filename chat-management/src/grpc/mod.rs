//! gRPC service implementation for the authentication and session core.

pub mod auth_service;

pub mod proto {
    tonic::include_proto!("chat.v1");

    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("chat_auth_descriptor");
}

pub use auth_service::AuthServiceImpl;
