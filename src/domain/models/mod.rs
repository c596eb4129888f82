mod assessment;
mod credential;
mod error;
mod prompt;
mod provider;
mod request;
mod response;
mod turn;

pub use assessment::*;
pub use credential::*;
pub use error::*;
pub use prompt::*;
pub use provider::*;
pub use request::*;
pub use response::*;
pub use turn::*;
