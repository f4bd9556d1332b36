pub mod access;
pub mod error;
pub mod factory;
pub mod identity;
pub mod jwt;
pub mod pipeline;
pub mod resolver;
pub mod verifier;

pub use access::{AccessDecision, AccessEvaluator, DecisionReason};
pub use error::AuthError;
pub use factory::build_auth_pipeline;
pub use pipeline::{AuthPipeline, Authorized, ChannelAccess, Scope};
pub use resolver::{Role, User};
