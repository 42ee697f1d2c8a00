//! Request and response types for the portal API.
//!
//! These types mirror the backend's wire contract. Auth endpoints use
//! snake_case field names; the inscripciones endpoints use the backend's
//! Spanish camelCase names, mapped here with `rename_all`.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// Current user from `GET /api/auth/profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration (alta de alumno)
// ─────────────────────────────────────────────────────────────────────────────

/// Student personal data for registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatosAlumno {
    pub nombre: String,
    pub apellido: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_documento: Option<String>,
    pub numero_documento: String,
    pub domicilio: String,
    pub localidad: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escuela: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nivel_escolar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// ISO 8601 date, e.g. `2010-05-15`.
    pub fecha_nacimiento: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posee_cud: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discapacidad: Option<String>,
    pub sexo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocupacion: Option<String>,
}

/// Guardian data, required by the backend when the student is a minor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatosResponsable {
    pub nombre: String,
    pub apellido: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_documento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero_documento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parentesco: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domicilio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localidad: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sexo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocupacion: Option<String>,
}

/// Request for `POST /api/v1/inscripciones/alumnos`: student data plus
/// the credentials of the account being created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AltaAlumnoRequest {
    pub alumno: DatosAlumno,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsable: Option<DatosResponsable>,
}

/// Registered student record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlumnoResponse {
    pub id: i64,
    pub nombre: String,
    pub apellido: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_documento: Option<String>,
    pub numero_documento: String,
    pub domicilio: String,
    pub localidad: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escuela: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nivel_escolar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub fecha_nacimiento: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posee_cud: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discapacidad: Option<String>,
    pub username: String,
    /// True when a student record with the same document number already
    /// existed and the account was linked to it instead of created fresh.
    #[serde(default)]
    pub existed_previously: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Student profile
// ─────────────────────────────────────────────────────────────────────────────

/// Guardian block inside a student profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsablePerfil {
    pub nombre: String,
    pub apellido: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_documento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero_documento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parentesco: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domicilio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localidad: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sexo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocupacion: Option<String>,
}

/// Response from `GET /api/v1/inscripciones/perfil`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfilAlumno {
    pub nombre: String,
    pub apellido: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_documento: Option<String>,
    pub numero_documento: String,
    pub domicilio: String,
    pub localidad: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escuela: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nivel_escolar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub fecha_nacimiento: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posee_cud: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discapacidad: Option<String>,
    pub sexo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocupacion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsable: Option<ResponsablePerfil>,
    /// True when the student data predated the account.
    #[serde(default)]
    pub existed_previously: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Available courses
// ─────────────────────────────────────────────────────────────────────────────

/// A division (class group) with its schedule and seat counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionHorario {
    pub id: i64,
    pub letra: String,
    pub horarios: String,
    pub cupo: u32,
    pub cantidad_inscriptos: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrumento_descripcion: Option<String>,
}

impl DivisionHorario {
    /// Seats still open in this division.
    pub fn cupo_disponible(&self) -> u32 {
        self.cupo.saturating_sub(self.cantidad_inscriptos)
    }
}

/// A course the authenticated student can enroll in, from
/// `GET /api/v1/inscripciones/cursos-disponibles?anio=N`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursoDisponible {
    pub id: i64,
    pub descripcion: String,
    pub edad_minima: u32,
    pub edad_maxima: u32,
    pub carrera_id: i64,
    pub carrera_nombre: String,
    /// Enrollment cost for this course in the cycle; absent if not defined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monto_matricula: Option<f64>,
    #[serde(default)]
    pub divisiones: Vec<DivisionHorario>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Enrollment (matriculación)
// ─────────────────────────────────────────────────────────────────────────────

/// Payment modality for an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoPago {
    Contado,
    Financiado,
}

/// Request for `POST /api/v1/inscripciones/matricular`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatriculaRequest {
    pub id_division_horario: i64,
    pub tipo_pago: TipoPago,
}

/// Confirmed enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatriculaResponse {
    pub id_inscripcion_academica: i64,
    pub idu_inscripcion_public: i64,
    pub id_division_horario: i64,
    pub id_curso: i64,
    pub anio: i32,
}
