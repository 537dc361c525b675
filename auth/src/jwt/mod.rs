pub mod claims;
pub mod errors;
pub mod handler;
pub mod signing;

pub use claims::Claims;
pub use claims::TokenIdentity;
pub use claims::TokenKind;
pub use errors::JwtError;
pub use handler::JwtHandler;
pub use signing::SigningScheme;
