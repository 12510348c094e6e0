pub mod accounts;
pub mod handlers;
pub mod middleware;
pub mod password;
pub mod session;

pub use middleware::load_current_user;
