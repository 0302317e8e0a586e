mod app_user;
mod contest;
mod walk;

pub use app_user::AppUser;
pub use contest::Contest;
pub use walk::Walk;
