pub mod dates;
pub mod error;
pub mod jwt;
pub mod logger;
pub mod pagination;
pub mod password;
pub mod storage;
