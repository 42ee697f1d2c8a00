//! Inscripciones API: public registration and the enrollment flow.

use crate::client::LiceoClient;
use crate::error::Result;
use crate::types::{
    AltaAlumnoRequest, AlumnoResponse, CursoDisponible, MatriculaRequest, MatriculaResponse,
    PerfilAlumno,
};

/// Enrollment API client.
pub struct InscripcionesApi {
    client: LiceoClient,
}

impl InscripcionesApi {
    pub(crate) fn new(client: LiceoClient) -> Self {
        Self { client }
    }

    /// Register a new student account. Public endpoint, no auth.
    ///
    /// `existed_previously` on the response reports that the account was
    /// linked to a pre-existing student record instead of created fresh.
    /// Conflicts (duplicate document or username) surface the server's
    /// message.
    pub async fn alta_alumno(&self, request: &AltaAlumnoRequest) -> Result<AlumnoResponse> {
        self.client
            .post_public("/api/v1/inscripciones/alumnos", request)
            .await
    }

    /// Personal profile of the authenticated student.
    ///
    /// The server answers 403 when the account is not linked to a
    /// student record; see [`crate::Error::is_forbidden`].
    pub async fn perfil(&self) -> Result<PerfilAlumno> {
        self.client.get("/api/v1/inscripciones/perfil").await
    }

    /// Courses and divisions open to the authenticated student for a
    /// cycle year, filtered server-side by the student's age.
    pub async fn cursos_disponibles(&self, anio: i32) -> Result<Vec<CursoDisponible>> {
        self.client
            .get(&format!("/api/v1/inscripciones/cursos-disponibles?anio={anio}"))
            .await
    }

    /// Enroll the authenticated student in a division.
    pub async fn matricular(&self, request: &MatriculaRequest) -> Result<MatriculaResponse> {
        self.client
            .post("/api/v1/inscripciones/matricular", request)
            .await
    }
}
