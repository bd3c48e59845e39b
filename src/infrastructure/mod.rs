pub mod browser;
pub mod http;
pub mod oracle;
pub mod storage;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
