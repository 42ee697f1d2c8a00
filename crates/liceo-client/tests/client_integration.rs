//! Client integration tests against a mock backend.
//!
//! Cover the request cycle: bearer attachment, pre-send refresh, the
//! single 401 refresh-and-retry, skip-auth credential failures, and
//! error-body normalization.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use liceo_client::{
    Error, LiceoClient, MatriculaRequest, MemoryTokenStore, TipoPago, TokenStore,
    SESSION_EXPIRED_MESSAGE,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Build an unsigned JWT whose `exp` claim sits the given offset from now.
fn token_expiring_in(secs_from_now: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{}}}"#, now_secs() + secs_from_now));
    format!("{header}.{payload}.signature")
}

fn client_with_store(server: &MockServer, store: Arc<MemoryTokenStore>) -> LiceoClient {
    LiceoClient::builder()
        .base_url(server.uri())
        .token_store(store)
        .build()
        .unwrap()
}

fn login_body(access_token: &str, refresh_token: &str) -> serde_json::Value {
    json!({
        "access_token": access_token,
        "refresh_token": refresh_token,
        "expires_in": 900,
    })
}

fn profile_body() -> serde_json::Value {
    json!({
        "id": "u-17",
        "username": "maria.gonzalez",
        "email": "maria@example.com",
        "roles": ["ALUMNO"],
    })
}

#[tokio::test]
async fn test_valid_token_attaches_bearer_and_returns_body() {
    let server = MockServer::start().await;
    let access = token_expiring_in(3600);

    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .and(header("authorization", format!("Bearer {access}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(&access, "r1"));
    let client = client_with_store(&server, store);

    let profile = client.auth().profile().await.unwrap();
    assert_eq!(profile.id, "u-17");
    assert_eq!(profile.username, "maria.gonzalez");
    assert_eq!(profile.roles, vec!["ALUMNO".to_string()]);
    server.verify().await;
}

#[tokio::test]
async fn test_401_refreshes_and_retries_once() {
    let server = MockServer::start().await;
    let old_access = token_expiring_in(3600);
    let new_access = token_expiring_in(3600 + 77);

    // The server has revoked the old token even though it looks fresh.
    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .and(header("authorization", format!("Bearer {old_access}").as_str()))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({"refresh_token": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body(&new_access, "r2")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .and(header("authorization", format!("Bearer {new_access}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(&old_access, "r1"));
    let client = client_with_store(&server, Arc::clone(&store));

    let profile = client.auth().profile().await.unwrap();
    assert_eq!(profile.username, "maria.gonzalez");
    assert_eq!(store.refresh_token().await.as_deref(), Some("r2"));
    server.verify().await;
}

#[tokio::test]
async fn test_second_401_clears_tokens_and_reports_session_expired() {
    let server = MockServer::start().await;
    let access = token_expiring_in(3600);

    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(login_body(&token_expiring_in(3600), "r2")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(&access, "r1"));
    let client = client_with_store(&server, Arc::clone(&store));

    let err = client.auth().profile().await.unwrap_err();
    assert!(err.is_session_expired());
    assert_eq!(err.to_string(), SESSION_EXPIRED_MESSAGE);
    assert!(store.pair().await.is_none());
    server.verify().await;
}

#[tokio::test]
async fn test_expired_token_refreshes_before_send() {
    let server = MockServer::start().await;
    let new_access = token_expiring_in(3600);

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({"refresh_token": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body(&new_access, "r2")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .and(header("authorization", format!("Bearer {new_access}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(&token_expiring_in(-60), "r1"));
    let client = client_with_store(&server, store);

    client.auth().profile().await.unwrap();
    server.verify().await;
}

#[tokio::test]
async fn test_pre_send_refresh_failure_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(&token_expiring_in(-60), "r1"));
    let client = client_with_store(&server, Arc::clone(&store));

    let err = client.auth().profile().await.unwrap_err();
    assert!(err.is_session_expired());
    assert!(store.pair().await.is_none());
    server.verify().await;
}

#[tokio::test]
async fn test_login_rejection_surfaces_message_without_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Credenciales inválidas"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let client = client_with_store(&server, Arc::clone(&store));

    let err = client.auth().login("maria", "wrong").await.unwrap_err();
    assert_eq!(err.to_string(), "Credenciales inválidas");
    assert!(!err.is_session_expired());
    assert!(store.pair().await.is_none());
    server.verify().await;
}

#[tokio::test]
async fn test_public_call_401_is_a_credential_failure_not_session_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/inscripciones/alumnos"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Registro deshabilitado"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let client = client_with_store(&server, store);

    let request = alta_request();
    let err = client.inscripciones().alta_alumno(&request).await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Registro deshabilitado");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    server.verify().await;
}

#[tokio::test]
async fn test_registration_round_trip_without_auth_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/inscripciones/alumnos"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 31,
            "nombre": "María",
            "apellido": "González",
            "numeroDocumento": "45123456",
            "domicilio": "Calle San Martín 123",
            "localidad": "Santa Fe",
            "fechaNacimiento": "2010-05-15",
            "username": "maria.gonzalez",
            "existedPreviously": true,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let client = client_with_store(&server, store);

    let alumno = client
        .inscripciones()
        .alta_alumno(&alta_request())
        .await
        .unwrap();
    assert_eq!(alumno.id, 31);
    assert!(alumno.existed_previously);

    let requests = server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| !r.headers.contains_key("authorization")));
}

#[tokio::test]
async fn test_concurrent_stale_callers_share_one_refresh() {
    let server = MockServer::start().await;
    let new_access = token_expiring_in(3600);

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(login_body(&new_access, "r2"))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .and(header("authorization", format!("Bearer {new_access}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .expect(5)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(&token_expiring_in(-60), "r1"));
    let client = client_with_store(&server, store);

    let mut tasks = Vec::new();
    for _ in 0..5 {
        let client = client.clone();
        tasks.push(tokio::spawn(
            async move { client.auth().profile().await },
        ));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }
    server.verify().await;
}

#[tokio::test]
async fn test_authenticated_post_sends_wire_names() {
    let server = MockServer::start().await;
    let access = token_expiring_in(3600);

    Mock::given(method("POST"))
        .and(path("/api/v1/inscripciones/matricular"))
        .and(header("authorization", format!("Bearer {access}").as_str()))
        .and(body_json(json!({"idDivisionHorario": 7, "tipoPago": "CONTADO"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "idInscripcionAcademica": 101,
            "iduInscripcionPublic": 2026101,
            "idDivisionHorario": 7,
            "idCurso": 3,
            "anio": 2026,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(&access, "r1"));
    let client = client_with_store(&server, store);

    let matricula = client
        .inscripciones()
        .matricular(&MatriculaRequest {
            id_division_horario: 7,
            tipo_pago: TipoPago::Contado,
        })
        .await
        .unwrap();
    assert_eq!(matricula.id_inscripcion_academica, 101);
    assert_eq!(matricula.anio, 2026);
}

#[tokio::test]
async fn test_cursos_disponibles_passes_year_and_parses_divisions() {
    let server = MockServer::start().await;
    let access = token_expiring_in(3600);

    Mock::given(method("GET"))
        .and(path("/api/v1/inscripciones/cursos-disponibles"))
        .and(query_param("anio", "2026"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 3,
            "descripcion": "Guitarra inicial",
            "edadMinima": 8,
            "edadMaxima": 12,
            "carreraId": 1,
            "carreraNombre": "Música",
            "divisiones": [
                {"id": 7, "letra": "A", "horarios": "Lun 18-19", "cupo": 20, "cantidadInscriptos": 18}
            ],
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(&access, "r1"));
    let client = client_with_store(&server, store);

    let cursos = client.inscripciones().cursos_disponibles(2026).await.unwrap();
    assert_eq!(cursos.len(), 1);
    assert_eq!(cursos[0].divisiones[0].cupo_disponible(), 2);
    assert!(cursos[0].monto_matricula.is_none());
}

#[tokio::test]
async fn test_error_bodies_are_normalized() {
    let server = MockServer::start().await;
    let access = token_expiring_in(3600);

    Mock::given(method("GET"))
        .and(path("/api/v1/inscripciones/cursos-disponibles"))
        .and(query_param("anio", "1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "db down"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/inscripciones/cursos-disponibles"))
        .and(query_param("anio", "2"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/inscripciones/cursos-disponibles"))
        .and(query_param("anio", "3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(&access, "r1"));
    let client = client_with_store(&server, store);
    let api = client.inscripciones();

    match api.cursos_disponibles(1).await.unwrap_err() {
        Error::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "db down");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    match api.cursos_disponibles(2).await.unwrap_err() {
        Error::Api { message, .. } => assert_eq!(message, "Bad Gateway"),
        other => panic!("expected Api error, got {other:?}"),
    }
    match api.cursos_disponibles(3).await.unwrap_err() {
        Error::Api { message, .. } => assert_eq!(message, "Request failed"),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_success_body_is_not_silently_coerced() {
    let server = MockServer::start().await;
    let access = token_expiring_in(3600);

    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(&access, "r1"));
    let client = client_with_store(&server, store);

    // A 2xx without a JSON content-type carries no value; an endpoint
    // typed to expect a body reports that instead of inventing one.
    let err = client.auth().profile().await.unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[tokio::test]
async fn test_explicit_refresh_updates_store() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({"refresh_token": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body("a2", "r2")))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens("a1", "r1"));
    let client = client_with_store(&server, Arc::clone(&store));

    let response = client.auth().refresh("r1").await.unwrap();
    assert_eq!(response.access_token, "a2");
    assert_eq!(store.access_token().await.as_deref(), Some("a2"));
}

fn alta_request() -> liceo_client::AltaAlumnoRequest {
    liceo_client::AltaAlumnoRequest {
        alumno: liceo_client::DatosAlumno {
            nombre: "María".to_string(),
            apellido: "González".to_string(),
            tipo_documento: Some("DNI".to_string()),
            numero_documento: "45123456".to_string(),
            domicilio: "Calle San Martín 123".to_string(),
            localidad: "Santa Fe".to_string(),
            telefono: Some("3424567890".to_string()),
            escuela: None,
            nivel_escolar: None,
            email: Some("maria@example.com".to_string()),
            fecha_nacimiento: "2010-05-15".to_string(),
            posee_cud: None,
            discapacidad: None,
            sexo: "F".to_string(),
            ocupacion: None,
        },
        username: "maria.gonzalez".to_string(),
        password: "secreta".to_string(),
        responsable: Some(liceo_client::DatosResponsable {
            nombre: "Laura".to_string(),
            apellido: "González".to_string(),
            tipo_documento: Some("DNI".to_string()),
            numero_documento: Some("30111222".to_string()),
            parentesco: Some("Madre".to_string()),
            domicilio: None,
            localidad: None,
            telefono: Some("3421234567".to_string()),
            email: None,
            sexo: Some("F".to_string()),
            ocupacion: None,
        }),
    }
}
