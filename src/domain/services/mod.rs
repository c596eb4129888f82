mod assessments;
mod credentials;
mod gateway;
mod normalizer;
mod selector;

pub use assessments::*;
pub use credentials::*;
pub use gateway::*;
pub use normalizer::*;
pub use selector::*;
