pub mod client_ip;
pub mod middleware;
pub mod validator;

pub use client_ip::ClientIp;
pub use middleware::request_tracing;
pub use validator::SecretKeyValidator;
