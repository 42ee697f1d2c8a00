//! HTTP client SDK for the Liceo Municipal enrollment portal backend.
//!
//! This crate provides a typed client for the portal's REST API, with the
//! bearer-token lifecycle handled transparently: expired access tokens
//! are refreshed before a request goes out, a 401 answer triggers exactly
//! one refresh-and-retry cycle, and concurrent refreshes collapse into a
//! single round-trip.
//!
//! # Example
//!
//! ```no_run
//! use liceo_client::{LiceoClient, MatriculaRequest, TipoPago, Result};
//!
//! # async fn example() -> Result<()> {
//! // Create a client (base URL can also come from LICEO_API_BASE_URL)
//! let client = LiceoClient::from_env()?;
//!
//! // Log in; the token pair lands in the client's store
//! client.auth().login("maria.gonzalez", "secreta").await?;
//!
//! // Keep the session alive in the background
//! client.session().start_auto_refresh().await;
//!
//! // Browse courses and enroll
//! let cursos = client.inscripciones().cursos_disponibles(2026).await?;
//! if let Some(division) = cursos
//!     .iter()
//!     .flat_map(|c| &c.divisiones)
//!     .find(|d| d.cupo_disponible() > 0)
//! {
//!     let matricula = client
//!         .inscripciones()
//!         .matricular(&MatriculaRequest {
//!             id_division_horario: division.id,
//!             tipo_pago: TipoPago::Contado,
//!         })
//!         .await?;
//!     println!("Inscripción {}", matricula.idu_inscripcion_public);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Auth**: login, logout, profile, explicit refresh
//! - **Inscripciones**: public student registration, student profile,
//!   available courses per cycle year, enrollment

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use client::{ClientBuilder, LiceoClient, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use error::{Error, Result, SESSION_EXPIRED_MESSAGE};
pub use types::*;

// Re-export the auth-side types that appear in this crate's API surface
pub use liceo_auth::{
    file_store, memory_store, AuthError, FileTokenStore, LoginResponse, MemoryTokenStore, Session,
    SharedTokenStore, TokenPair, TokenStore,
};
