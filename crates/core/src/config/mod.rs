pub mod resolver_config;
pub mod sources;
pub mod validation;

pub use resolver_config::*;
pub use sources::*;
pub use validation::*;
