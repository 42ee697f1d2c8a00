//! API endpoint implementations.

mod auth;
mod inscripciones;

pub use auth::AuthApi;
pub use inscripciones::InscripcionesApi;
