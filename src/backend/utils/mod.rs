pub mod crypto;
pub mod guards;
pub mod logging;
pub mod rate_limit;
pub mod time;
