//! Negative mutation engine.
//!
//! Derives invalid-payload cases from request schemas alone: a valid
//! baseline is synthesized from the constraints, then one constraint at a
//! time is violated. Every case expects a status in {400, 422}.

pub mod baseline;
pub mod engine;
pub mod model;
pub mod provider;
pub mod security;

pub use baseline::synthesize;
pub use engine::{invalid_format_literal, mutate};
pub use model::{
    ErrorBodyExpectation, ExpectedFailure, MutationCase, MutationCategory, AUTH_STATUSES,
    MAX_SYNTHESIZED_LEN, ROOT_FIELD, VALIDATION_STATUSES,
};
pub use provider::{
    error_body_expectation, MutationProvider, NoMutationProvider, SchemaMutationProvider,
};
pub use security::{security_cases, SecurityCase};
