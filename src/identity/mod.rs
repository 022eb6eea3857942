//! Delegated authentication for the confession API.
//! Bearer tokens are verified by a pluggable `AuthVerifier`; handlers only ever
//! see the resulting `RequestContext` and its optional subject id.

mod request_context;
mod subject;
mod verifier;

pub use request_context::{bearer_credentials, RequestContext};
pub use subject::SubjectId;
pub use verifier::{
    mint_hs256, verifier_from_config, AnyOfVerifier, AuthVerifier, Claims, Credentials, JwtVerifier, SharedVerifier,
    StaticTokenVerifier,
};
