//! Canonical Intermediate Representation of an API contract.
//!
//! Provides:
//! - `SchemaRef` / `SchemaKind`: the recursive schema tree as a closed sum type
//! - `Endpoint`, `EndpointId`, `ResponseBody`, `ApiSpec`
//! - `build_hash` and `SchemaHash`: order-independent structural digests
//!
//! The IR is immutable once built; every consumer borrows it read-only.

pub mod hash;
pub mod model;

pub use hash::{build_hash, canonical_form, hash_response, hash_string, SchemaHash};
pub use model::{
    ApiSpec, Constraints, Endpoint, EndpointId, ResponseBody, SchemaKind, SchemaRef,
};
