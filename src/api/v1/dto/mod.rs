pub mod authorize;
pub mod principal;
