mod validator;

pub mod model;
pub mod service;

pub use model::CurrentUser;
pub use service::AuthService;
pub use validator::SessionValidator;
