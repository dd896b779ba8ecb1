//! API Integration Tests
//!
//! Full router over in-memory storage, driven with `oneshot`.

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{json, Value};

use foodloop::auth::TokenService;
use foodloop::repository::{AuditRepository, Repositories};
use foodloop::AppStateInner;

mod common;

use common::{failing_audits, TestApp, TEST_SECRET};

const ADMIN_EMAIL: &str = "admin@foodloop.test";
const ADMIN_PASSWORD: &str = "admin123";

/// Category plus an active publication, created by an authenticated user
async fn seed_publication(app: &TestApp, token: &str, owner_id: i32) -> i64 {
    let (status, body) = app
        .send(
            "POST",
            "/foodloop/categorias",
            Some(json!({ "nombre": "Lácteos", "descripcion": "Leche y derivados" })),
            Some(token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let category_id = body["id"].as_i64().unwrap();

    let (status, body) = app
        .send(
            "POST",
            "/foodloop/publicaciones",
            Some(json!({
                "usuarioId": owner_id,
                "categoriaId": category_id,
                "titulo": "Leche entera",
                "descripcion": "Diez cajas",
                "tipo": "donacion",
                "cantidad": "10",
                "fechaCaducidad": "2030-01-15"
            })),
            Some(token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "Publicación creada");
    body["id"].as_i64().unwrap()
}

async fn audit_count(app: &TestApp) -> usize {
    app.state.audits.get_all().await.unwrap().len()
}

// =========================================================================
// Registration and login
// =========================================================================

#[tokio::test]
async fn test_register_then_login() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            "POST",
            "/foodloop/register",
            Some(json!({
                "nombreEntidad": "Ana Ruiz",
                "correo": "ana@test.com",
                "password": "abc123"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Usuario registrado correctamente");
    let user_id = body["userId"].as_i64().expect("numeric userId");

    let (status, body) = app
        .send(
            "POST",
            "/foodloop/login",
            Some(json!({ "email": "ana@test.com", "password": "abc123" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();
    assert!(!token.is_empty());

    let claims = TokenService::new(TEST_SECRET).verify(token).unwrap();
    assert_eq!(i64::from(claims.id), user_id);
    assert_eq!(claims.email, "ana@test.com");
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let app = TestApp::new();
    let body = json!({ "name": "Ana Ruiz", "email": "ana@test.com", "password": "abc123" });

    let (status, _) = app.send("POST", "/foodloop/register", Some(body.clone()), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.send("POST", "/foodloop/register", Some(body), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.state.users.get_all().await.unwrap().len(), 1);

    let (status, body) = app
        .send(
            "POST",
            "/foodloop/register",
            Some(json!({ "email": "b@test.com", "password": "abc123" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Nombre es requerido");

    let (status, body) = app
        .send(
            "POST",
            "/foodloop/register",
            Some(json!({ "name": "Beto Paz", "email": "b@test", "password": "abc123" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Correo electrónico no válido");
}

#[tokio::test]
async fn test_login_errors() {
    let app = TestApp::new();
    app.seed_user("ana@test.com", "abc123").await;

    let (status, body) = app
        .send("POST", "/foodloop/login", Some(json!({ "email": "ana@test.com" })), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email y contraseña son requeridos");

    let (status, body) = app
        .send(
            "POST",
            "/foodloop/login",
            Some(json!({ "email": "ana@test.com", "password": "wrong1" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid Credentials");
}

// =========================================================================
// Gate
// =========================================================================

#[tokio::test]
async fn test_gate_without_token_or_credentials() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/foodloop/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token requerido o credenciales de administrador");
}

#[tokio::test]
async fn test_gate_credential_fallback() {
    let app = TestApp::new();
    app.seed_user("ana@test.com", "abc123").await;
    app.seed_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = app
        .send(
            "GET",
            "/foodloop/users?email=ana%40test.com&password=abc123",
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Acceso solo para administradores");

    let (status, body) = app
        .send(
            "GET",
            "/foodloop/users?email=ana%40test.com&password=nope99",
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Credenciales inválidas");

    let (status, body) = app
        .send(
            "GET",
            "/foodloop/users?correo=admin%40foodloop.test&password=admin123",
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_gate_fallback_keeps_body_for_handler() {
    let app = TestApp::new();
    app.seed_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = app
        .send(
            "POST",
            "/foodloop/categorias",
            Some(json!({
                "email": ADMIN_EMAIL,
                "password": ADMIN_PASSWORD,
                "nombre": "Frutas"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "Categoría creada");

    let id = body["id"].as_i64().unwrap();
    let (status, body) = app
        .send("GET", &format!("/foodloop/categorias/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nombre"], "Frutas");
}

#[tokio::test]
async fn test_gate_rejects_bad_tokens() {
    let app = TestApp::new();
    let id = app.seed_user("ana@test.com", "abc123").await;

    let (status, body) = app.send("GET", "/foodloop/users", None, Some("not-a-token")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Token invalido o expirado");

    let foreign = TokenService::new("other-secret").issue(id, "ana@test.com").unwrap();
    let (status, _) = app.send("GET", "/foodloop/users", None, Some(&foreign)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let expired = TokenService::new(TEST_SECRET)
        .with_ttl(chrono::Duration::seconds(-10))
        .issue(id, "ana@test.com")
        .unwrap();
    let (status, _) = app.send("GET", "/foodloop/users", None, Some(&expired)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unsupported_methods_are_not_gated() {
    let app = TestApp::new();

    let (status, _) = app.send("DELETE", "/foodloop/transacciones/1", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = app.send("DELETE", "/foodloop/categorias", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_gate_oversized_body_is_unauthorized() {
    let app = TestApp::new();
    let body = json!({ "nombre": "x".repeat(2 * 1024 * 1024) });

    let (status, body) = app.send("POST", "/foodloop/categorias", Some(body), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token requerido o credenciales de administrador");
}

#[tokio::test]
async fn test_public_reads_and_gated_writes_share_paths() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/foodloop/categorias", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _) = app.send("GET", "/foodloop/publicaciones", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send("POST", "/foodloop/categorias", Some(json!({ "nombre": "Frutas" })), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.send("GET", "/foodloop/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// =========================================================================
// Users
// =========================================================================

#[tokio::test]
async fn test_user_reads_hide_password() {
    let app = TestApp::new();
    let id = app.seed_user("ana@test.com", "abc123").await;
    let token = app.token_for("ana@test.com", "abc123").await;

    let (status, body) = app
        .send("GET", &format!("/foodloop/users/{id}"), None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["correo"], "ana@test.com");
    assert!(body.get("password").is_none());
    assert!(body["fechaRegistro"].as_str().is_some());

    let (status, body) = app.send("GET", "/foodloop/users/abc", None, Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Error en parámetro");

    let (status, body) = app.send("GET", "/foodloop/users/999", None, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Usuario no encontrado");

    let (status, body) = app
        .send("GET", "/foodloop/users/query/email", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Query param 'email' es requerido");

    let (status, body) = app
        .send("GET", "/foodloop/users/email/ana@test.com", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
}

#[tokio::test]
async fn test_user_update_and_soft_delete() {
    let app = TestApp::new();
    let id = app.seed_user("ana@test.com", "abc123").await;
    app.seed_user("beto@test.com", "abc123").await;
    let token = app.token_for("ana@test.com", "abc123").await;

    let (status, body) = app
        .send(
            "PUT",
            &format!("/foodloop/users/{id}"),
            Some(json!({ "email": "beto@test.com" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Ese email ya está en uso");

    let (status, body) = app
        .send(
            "PUT",
            &format!("/foodloop/users/{id}"),
            Some(json!({ "name": "Ana Maria", "password": "nueva99" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Usuario actualizado con éxito");
    assert!(app.state.users.login("ana@test.com", "nueva99").await.is_ok());

    let (status, body) = app
        .send("PUT", "/foodloop/users/delete/999", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Usuario no encontrado");

    let (status, body) = app
        .send(
            "PUT",
            &format!("/foodloop/users/query/delete?id={id}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Usuario dado de baja exitosamente");

    let user = app.state.users.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(user.status, 0);
}

#[tokio::test]
async fn test_password_reset() {
    let app = TestApp::new();
    app.seed_user("ana@test.com", "abc123").await;
    let token = app.token_for("ana@test.com", "abc123").await;

    let (status, _) = app
        .send(
            "PUT",
            "/foodloop/users/password/reset",
            Some(json!({ "correo": "nadie@test.com", "newPassword": "nueva99" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            "PUT",
            "/foodloop/users/password/reset",
            Some(json!({ "correo": "ana@test.com", "newPassword": "nueva99" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.state.users.login("ana@test.com", "abc123").await.is_err());
    assert!(app.state.users.login("ana@test.com", "nueva99").await.is_ok());
}

// =========================================================================
// Transactions
// =========================================================================

#[tokio::test]
async fn test_transaction_pauses_publication() {
    let app = TestApp::new();
    let donor = app.seed_user("donante@test.com", "abc123").await;
    let beneficiary = app.seed_user("beneficiario@test.com", "abc123").await;
    let token = app.token_for("donante@test.com", "abc123").await;
    let publication_id = seed_publication(&app, &token, donor).await;

    let transaction = json!({
        "publicacionId": publication_id,
        "donanteVendedorId": donor,
        "beneficiarioCompradorId": beneficiary
    });

    let (status, body) = app
        .send("POST", "/foodloop/transacciones", Some(transaction.clone()), Some(&token))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "Transacción creada");

    let (status, body) = app
        .send("GET", &format!("/foodloop/publicaciones/{publication_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["estado"], 0);

    let (status, body) = app
        .send("POST", "/foodloop/transacciones", Some(transaction), Some(&token))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"], format!("publicacionId={publication_id}"));
    assert_eq!(app.state.transactions.get_all().await.unwrap().len(), 1);

    let audits = app.state.audits.get_all().await.unwrap();
    assert!(audits
        .iter()
        .any(|entry| entry.table == "transacciones" && entry.action.as_str() == "CREATE"));
    assert!(audits.iter().any(|entry| entry.table == "publicaciones"
        && entry.action.as_str() == "UPDATE"
        && entry.record_id == Some(publication_id as i32)));
}

#[tokio::test]
async fn test_transaction_on_missing_publication() {
    let app = TestApp::new();
    let id = app.seed_user("ana@test.com", "abc123").await;
    let token = app.token_for("ana@test.com", "abc123").await;

    let (status, _) = app
        .send(
            "POST",
            "/foodloop/transacciones",
            Some(json!({
                "publicacionId": 77,
                "donanteVendedorId": id,
                "beneficiarioCompradorId": id
            })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(app.state.transactions.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_transaction_is_not_found() {
    let app = TestApp::new();
    app.seed_user("ana@test.com", "abc123").await;
    let token = app.token_for("ana@test.com", "abc123").await;

    let (status, body) = app
        .send(
            "PUT",
            "/foodloop/transacciones/999",
            Some(json!({ "estado": 1 })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Transacción no encontrada");

    let (status, body) = app
        .send("PUT", "/foodloop/transacciones/delete/999", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Transacción no encontrada");
}

#[tokio::test]
async fn test_soft_delete_transaction_and_publication() {
    let app = TestApp::new();
    let donor = app.seed_user("donante@test.com", "abc123").await;
    let beneficiary = app.seed_user("beneficiario@test.com", "abc123").await;
    let token = app.token_for("donante@test.com", "abc123").await;
    let sold = seed_publication(&app, &token, donor).await;
    let listed = seed_publication(&app, &token, donor).await;

    let (status, body) = app
        .send(
            "POST",
            "/foodloop/transacciones",
            Some(json!({
                "publicacionId": sold,
                "donanteVendedorId": donor,
                "beneficiarioCompradorId": beneficiary
            })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let transaction_id = body["id"].as_i64().unwrap();

    let (status, body) = app
        .send(
            "PUT",
            &format!("/foodloop/transacciones/delete/{transaction_id}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Transacción eliminada");

    let (status, body) = app
        .send(
            "GET",
            &format!("/foodloop/transacciones/{transaction_id}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["estado"], 0);

    let (status, body) = app
        .send("PUT", &format!("/foodloop/publicaciones/delete/{listed}"), None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Publicación eliminada");

    let (status, body) = app
        .send("GET", &format!("/foodloop/publicaciones/{listed}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["estado"], 0);

    let (status, _) = app
        .send("PUT", "/foodloop/publicaciones/delete/999", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =========================================================================
// Reports
// =========================================================================

#[tokio::test]
async fn test_report_lifecycle() {
    let app = TestApp::new();
    let reporter = app.seed_user("ana@test.com", "abc123").await;
    let token = app.token_for("ana@test.com", "abc123").await;
    let publication_id = seed_publication(&app, &token, reporter).await;

    let (status, body) = app
        .send(
            "POST",
            "/foodloop/reportes",
            Some(json!({ "descripcion": "falta descripción" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Todos los campos requeridos: descripcion, reportanteId, publicacionId"
    );

    let (status, body) = app
        .send(
            "POST",
            "/foodloop/reportes",
            Some(json!({
                "descripcionReporte": "Producto vencido",
                "idReportante": reporter,
                "idPublicacion": publication_id.to_string()
            })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Reporte creado correctamente");
    let report_id = body["reporteId"].as_i64().unwrap();

    let (status, body) = app
        .send(
            "GET",
            &format!("/foodloop/reportes/query/id?id={report_id}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["descripcion"], "Producto vencido");

    let (status, body) = app
        .send(
            "PUT",
            &format!("/foodloop/reportes/{report_id}"),
            Some(json!({ "estado": "x" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "estado inválido");

    let (status, body) = app
        .send(
            "PUT",
            &format!("/foodloop/reportes/query/delete?id={report_id}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Reporte eliminado exitosamente");

    let (_, body) = app
        .send("GET", &format!("/foodloop/reportes/{report_id}"), None, Some(&token))
        .await;
    assert_eq!(body["estado"], 0);

    let (status, body) = app
        .send("GET", "/foodloop/reportes/999", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Reporte no encontrado");
}

// =========================================================================
// Audit trail
// =========================================================================

#[tokio::test]
async fn test_mutations_are_audited_with_actor() {
    let app = TestApp::new();
    let id = app.seed_user("ana@test.com", "abc123").await;
    let token = app.token_for("ana@test.com", "abc123").await;

    let (status, body) = app
        .send(
            "POST",
            "/foodloop/categorias",
            Some(json!({ "nombre": "Panadería" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = body["id"].as_i64().unwrap();

    let (status, body) = app.send("GET", "/foodloop/auditorias", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    let entry = entries
        .iter()
        .find(|entry| entry["tablaAfectada"] == "categorias")
        .expect("category audit entry");
    assert_eq!(entry["accion"], "CREATE");
    assert_eq!(entry["usuarioId"], id);
    assert_eq!(entry["registroId"], category_id);
}

#[tokio::test]
async fn test_one_audit_entry_per_successful_mutation() {
    let app = TestApp::new();
    let donor = app.seed_user("donante@test.com", "abc123").await;
    let token = app.token_for("donante@test.com", "abc123").await;
    let publication_id = seed_publication(&app, &token, donor).await;

    let before = audit_count(&app).await;

    let (status, _) = app
        .send(
            "PUT",
            &format!("/foodloop/publicaciones/{publication_id}"),
            Some(json!({ "titulo": "Leche deslactosada" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(audit_count(&app).await, before + 1);

    let (status, _) = app
        .send(
            "PUT",
            "/foodloop/publicaciones/999",
            Some(json!({ "titulo": "Nada" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(audit_count(&app).await, before + 1);

    let (status, _) = app
        .send("PUT", &format!("/foodloop/publicaciones/delete/{publication_id}"), None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    let after_delete = audit_count(&app).await;
    assert_eq!(after_delete, before + 2);

    let (status, _) = app
        .send(
            "POST",
            "/foodloop/transacciones",
            Some(json!({
                "publicacionId": publication_id,
                "donanteVendedorId": donor,
                "beneficiarioCompradorId": donor
            })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(audit_count(&app).await, after_delete);
}

#[tokio::test]
async fn test_audit_crud() {
    let app = TestApp::new();
    app.seed_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let token = app.token_for(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = app
        .send("POST", "/foodloop/auditorias", Some(json!({ "accion": "READ" })), Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Campos requeridos: accion, descripcion");

    let (status, body) = app
        .send(
            "POST",
            "/foodloop/auditorias",
            Some(json!({ "accion": "read", "descripcion": "Revisión manual" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Auditoría creada");
    let id = body["id"].as_i64().unwrap();

    let (status, body) = app
        .send("PUT", &format!("/foodloop/auditorias/delete/{id}"), None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Eliminada");

    let (status, body) = app
        .send("GET", &format!("/foodloop/auditorias/{id}"), None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["estado"], 0);
    assert_eq!(body["accion"], "READ");
}

#[tokio::test]
async fn test_failing_audit_storage_does_not_change_responses() {
    let app = TestApp::with_repositories(Repositories::in_memory().with_audits(failing_audits()));

    let (status, body) = app
        .send(
            "POST",
            "/foodloop/register",
            Some(json!({ "name": "Ana Ruiz", "email": "ana@test.com", "password": "abc123" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let donor = body["userId"].as_i64().unwrap() as i32;

    let (status, body) = app
        .send(
            "POST",
            "/foodloop/login",
            Some(json!({ "email": "ana@test.com", "password": "abc123" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let publication_id = seed_publication(&app, &token, donor).await;

    let (status, _) = app
        .send(
            "POST",
            "/foodloop/transacciones",
            Some(json!({
                "publicacionId": publication_id,
                "donanteVendedorId": donor,
                "beneficiarioCompradorId": donor
            })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let publication = app
        .state
        .publications
        .get_by_id(publication_id as i32)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(publication.status, 0);
}

#[tokio::test]
async fn test_request_level_audit() {
    let repos = Repositories::in_memory();
    let state = AppStateInner::build(repos.clone(), TokenService::new(TEST_SECRET), true);
    let app = TestApp {
        router: foodloop::create_router(state.clone()),
        state,
        repos,
    };

    let (status, _) = app
        .send(
            "POST",
            "/foodloop/register",
            Some(json!({ "name": "Ana Ruiz", "email": "ana@test.com", "password": "abc123" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut request_entry: Option<Value> = None;
    for _ in 0..50 {
        let entries = app.repos.audits.find_all().await.unwrap();
        if let Some(entry) = entries
            .iter()
            .find(|entry| entry.description.starts_with("Solicitud POST"))
        {
            request_entry = Some(serde_json::to_value(entry).unwrap());
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let entry = request_entry.expect("request-level audit entry");
    assert_eq!(entry["tablaAfectada"], "usuarios");
    assert_eq!(entry["accion"], "CREATE");
    assert!(entry["registroId"].as_i64().is_some());
    assert!(entry["descripcion"]
        .as_str()
        .unwrap()
        .contains("/foodloop/register -> estado 201"));
}
