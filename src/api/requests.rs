//! Request normalization
//!
//! Bodies arrive with several spellings for the same field. Everything is
//! resolved here into typed commands and change sets before a service sees
//! it. Numbers are accepted as JSON numbers or numeric strings.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::domain::time::{bogota, bogota_noon};
use crate::domain::{
    status, AuditAction, AuditEntryChanges, CategoryChanges, NewAuditEntry, NewCategory,
    NewPublication, NewReport, NewTransaction, PublicationChanges, ReportChanges,
    TransactionChanges,
};
use crate::error::{AppError, AppResult};
use crate::services::{RegisterUserCommand, UpdateUserCommand};

use super::validation;

pub type JsonObject = Map<String, Value>;

// =========================================================================
// Field access
// =========================================================================

/// Parse a request body; an empty body is an empty object
pub fn parse_body(bytes: &[u8]) -> AppResult<JsonObject> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(JsonObject::new());
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::validation("El cuerpo debe ser un objeto JSON")),
        Err(_) => Err(AppError::validation("JSON inválido")),
    }
}

/// First non-null value under any of `keys`
fn first<'a>(body: &'a JsonObject, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| body.get(*key))
        .find(|value| !value.is_null())
}

/// First string value under any of `keys`; numbers are stringified
pub fn text(body: &JsonObject, keys: &[&str]) -> Option<String> {
    match first(body, keys)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Like [`text`] but trimmed and never empty
pub fn non_empty_text(body: &JsonObject, keys: &[&str]) -> Option<String> {
    text(body, keys)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Integer from a JSON number or numeric string
pub fn parse_i32(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `Ok(None)` when absent, `Err` when present but not an integer
pub fn integer(body: &JsonObject, keys: &[&str], error: &str) -> AppResult<Option<i32>> {
    match first(body, keys) {
        None => Ok(None),
        Some(value) => parse_i32(value)
            .map(Some)
            .ok_or_else(|| AppError::validation(error)),
    }
}

fn decimal(body: &JsonObject, keys: &[&str], error: &str) -> AppResult<Option<Decimal>> {
    let parsed = match first(body, keys) {
        None => return Ok(None),
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string()).ok(),
        Some(Value::String(s)) => Decimal::from_str(s.trim()).ok(),
        Some(_) => None,
    };
    parsed.map(Some).ok_or_else(|| AppError::validation(error))
}

/// `YYYY-MM-DD` (noon in Bogotá) or RFC 3339
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(bogota_noon(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|instant| instant.with_timezone(&Utc))
}

/// Calendar day from `YYYY-MM-DD` or the Bogotá day of an RFC 3339 instant
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|instant| instant.with_timezone(&bogota()).date_naive())
    })
}

fn instant(body: &JsonObject, keys: &[&str], error: &str) -> AppResult<Option<DateTime<Utc>>> {
    match text(body, keys) {
        None => Ok(None),
        Some(raw) => parse_instant(&raw)
            .map(Some)
            .ok_or_else(|| AppError::validation(error)),
    }
}

fn day(body: &JsonObject, keys: &[&str], error: &str) -> AppResult<Option<NaiveDate>> {
    match text(body, keys) {
        None => Ok(None),
        Some(raw) => parse_day(&raw)
            .map(Some)
            .ok_or_else(|| AppError::validation(error)),
    }
}

/// Path or query id
pub fn parse_id(raw: &str, error: &str) -> AppResult<i32> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::validation(error))
}

// =========================================================================
// Users
// =========================================================================

pub fn register_command(body: &JsonObject) -> AppResult<RegisterUserCommand> {
    let name = non_empty_text(body, &["name", "nombreEntidad"])
        .ok_or_else(|| AppError::validation("Nombre es requerido"))?;
    if !validation::is_valid_name(&name) {
        return Err(AppError::validation("Error en dato"));
    }

    let email = text(body, &["email", "correo"])
        .map(|s| s.trim().to_string())
        .filter(|email| validation::is_valid_email(email))
        .ok_or_else(|| AppError::validation("Correo electrónico no válido"))?;

    let password = text(body, &["password"])
        .filter(|password| validation::is_valid_password(password))
        .ok_or_else(|| {
            AppError::validation(
                "La contraseña debe tener al menos 6 caracteres y máximo 25, incluyendo al menos una letra y un número",
            )
        })?;

    let mut command = RegisterUserCommand::new(name, email, password);
    if let Some(entity_type) = non_empty_text(body, &["tipoEntidad"]) {
        command = command.with_entity_type(entity_type);
    }
    if let Some(phone) = text(body, &["telefono"]) {
        command = command.with_phone(phone);
    }
    if let Some(location) = text(body, &["ubicacion"]) {
        command = command.with_location(location);
    }
    if let Some(address) = text(body, &["direccion"]) {
        command = command.with_address(address);
    }

    Ok(command)
}

/// `(email, password)` for login and the credential fallback
pub fn credentials(body: &JsonObject) -> Option<(String, String)> {
    let email = non_empty_text(body, &["email", "correo"])?;
    let password = text(body, &["password"]).filter(|p| !p.is_empty())?;
    Some((email, password))
}

pub fn update_user_command(body: &JsonObject) -> AppResult<UpdateUserCommand> {
    let mut command = UpdateUserCommand::new();

    if let Some(name) = non_empty_text(body, &["name", "nombreEntidad"]) {
        if !validation::is_valid_update_name(&name) {
            return Err(AppError::validation(
                "El nombre debe tener al menos 3 caracteres y solo contener letras",
            ));
        }
        command.name = Some(name);
    }

    if let Some(email) = non_empty_text(body, &["email", "correo"]) {
        if !validation::is_valid_email(&email) {
            return Err(AppError::validation("Correo electrónico no válido"));
        }
        command.email = Some(email);
    }

    if let Some(password) = non_empty_text(body, &["password"]) {
        if !validation::is_valid_update_password(&password) {
            return Err(AppError::validation(
                "La contraseña debe tener al menos 6 caracteres, incluyendo al menos una letra y un número",
            ));
        }
        command.password = Some(password);
    }

    command.entity_type = non_empty_text(body, &["tipoEntidad"]);
    command.phone = text(body, &["telefono"]);
    command.location = text(body, &["ubicacion"]);
    command.address = text(body, &["direccion"]);

    Ok(command)
}

/// `(email, new password)` for a password reset
pub fn password_reset(body: &JsonObject) -> AppResult<(String, String)> {
    let email = non_empty_text(body, &["email", "correo"])
        .filter(|email| validation::is_valid_email(email))
        .ok_or_else(|| AppError::validation("Correo electrónico no válido"))?;

    let password = non_empty_text(body, &["newPassword", "password"])
        .filter(|password| validation::is_valid_update_password(password))
        .ok_or_else(|| {
            AppError::validation(
                "La contraseña debe tener al menos 6 caracteres, incluyendo al menos una letra y un número",
            )
        })?;

    Ok((email, password))
}

// =========================================================================
// Categories
// =========================================================================

pub fn new_category(body: &JsonObject) -> AppResult<NewCategory> {
    let name = non_empty_text(body, &["nombre"])
        .ok_or_else(|| AppError::validation("Nombre requerido"))?;
    let description = text(body, &["descripcion"]).unwrap_or_default();
    Ok(NewCategory::new(name, description))
}

pub fn category_changes(body: &JsonObject) -> AppResult<CategoryChanges> {
    Ok(CategoryChanges {
        name: non_empty_text(body, &["nombre"]),
        description: text(body, &["descripcion"]),
        status: integer(body, &["estado"], "estado inválido")?,
    })
}

// =========================================================================
// Publications
// =========================================================================

pub fn new_publication(body: &JsonObject) -> AppResult<NewPublication> {
    const REQUIRED: &str = "Campos requeridos: usuarioId, categoriaId, titulo";

    let owner_id = integer(body, &["usuarioId"], "usuarioId inválido")?
        .ok_or_else(|| AppError::validation(REQUIRED))?;
    let category_id = integer(body, &["categoriaId"], "categoriaId inválido")?
        .ok_or_else(|| AppError::validation(REQUIRED))?;
    let title = non_empty_text(body, &["titulo"]).ok_or_else(|| AppError::validation(REQUIRED))?;

    let expires_on = day(body, &["fechaCaducidad"], "fechaCaducidad inválida")?
        .unwrap_or_else(|| Utc::now().with_timezone(&bogota()).date_naive());

    Ok(NewPublication {
        owner_id,
        category_id,
        title,
        description: text(body, &["descripcion"]).unwrap_or_default(),
        kind: text(body, &["tipo"]).unwrap_or_default(),
        quantity: text(body, &["cantidad"]).unwrap_or_default(),
        price: decimal(body, &["precio"], "precio inválido")?.unwrap_or_default(),
        expires_on,
        status: status::ACTIVE,
    })
}

pub fn publication_changes(body: &JsonObject) -> AppResult<PublicationChanges> {
    Ok(PublicationChanges {
        owner_id: integer(body, &["usuarioId"], "usuarioId inválido")?,
        category_id: integer(body, &["categoriaId"], "categoriaId inválido")?,
        title: non_empty_text(body, &["titulo"]),
        description: text(body, &["descripcion"]),
        kind: text(body, &["tipo"]),
        quantity: text(body, &["cantidad"]),
        price: decimal(body, &["precio"], "precio inválido")?,
        expires_on: day(body, &["fechaCaducidad"], "fechaCaducidad inválida")?,
        status: integer(body, &["estado"], "estado inválido")?,
    })
}

// =========================================================================
// Transactions
// =========================================================================

pub fn new_transaction(body: &JsonObject) -> AppResult<NewTransaction> {
    const REQUIRED: &str =
        "Campos requeridos: publicacionId, donanteVendedorId, beneficiarioCompradorId";

    let publication_id = integer(body, &["publicacionId"], "publicacionId inválido")?
        .ok_or_else(|| AppError::validation(REQUIRED))?;
    let donor_id = integer(body, &["donanteVendedorId"], "donanteVendedorId inválido")?
        .ok_or_else(|| AppError::validation(REQUIRED))?;
    let beneficiary_id = integer(
        body,
        &["beneficiarioCompradorId"],
        "beneficiarioCompradorId inválido",
    )?
    .ok_or_else(|| AppError::validation(REQUIRED))?;

    let mut transaction = NewTransaction::new(publication_id, donor_id, beneficiary_id);
    if let Some(date) = instant(body, &["fechaTransaccion"], "fechaTransaccion inválida")? {
        transaction = transaction.with_date(date);
    }
    Ok(transaction)
}

pub fn transaction_changes(body: &JsonObject) -> AppResult<TransactionChanges> {
    Ok(TransactionChanges {
        publication_id: integer(body, &["publicacionId"], "publicacionId inválido")?,
        donor_id: integer(body, &["donanteVendedorId"], "donanteVendedorId inválido")?,
        beneficiary_id: integer(
            body,
            &["beneficiarioCompradorId"],
            "beneficiarioCompradorId inválido",
        )?,
        status: integer(body, &["estado"], "estado inválido")?,
        transacted_at: instant(body, &["fechaTransaccion"], "fechaTransaccion inválida")?,
    })
}

// =========================================================================
// Reports
// =========================================================================

pub fn new_report(body: &JsonObject) -> AppResult<NewReport> {
    const REQUIRED: &str = "Todos los campos requeridos: descripcion, reportanteId, publicacionId";

    let description = non_empty_text(body, &["descripcion", "descripcionReporte"])
        .ok_or_else(|| AppError::validation(REQUIRED))?;
    let reporter_id = integer(
        body,
        &["reportanteId", "idReportante", "usuarioId"],
        "reportanteId inválido",
    )?
    .ok_or_else(|| AppError::validation(REQUIRED))?;
    let publication_id = integer(
        body,
        &["publicacionId", "idPublicacion"],
        "publicacionId inválido",
    )?
    .ok_or_else(|| AppError::validation(REQUIRED))?;

    Ok(NewReport::new(reporter_id, publication_id, description))
}

pub fn report_changes(body: &JsonObject) -> AppResult<ReportChanges> {
    let description = match text(body, &["descripcion"]) {
        None => None,
        Some(raw) if raw.trim().is_empty() => {
            return Err(AppError::validation("Descripción inválida"))
        }
        Some(raw) => Some(raw.trim().to_string()),
    };

    Ok(ReportChanges {
        reporter_id: integer(
            body,
            &["reportanteId", "reportante_id", "idReportante", "usuarioId"],
            "reportanteId inválido",
        )?,
        publication_id: integer(
            body,
            &["publicacionId", "publicacion_id", "idPublicacion"],
            "publicacionId inválido",
        )?,
        description,
        status: integer(body, &["estado"], "estado inválido")?,
        reported_at: instant(
            body,
            &["fechaReporte", "fecha_reporte", "fecha"],
            "fechaReporte inválida",
        )?,
    })
}

// =========================================================================
// Audit entries
// =========================================================================

fn action(body: &JsonObject) -> AppResult<Option<AuditAction>> {
    match non_empty_text(body, &["accion"]) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| AppError::validation("accion inválida")),
    }
}

pub fn new_audit_entry(body: &JsonObject) -> AppResult<NewAuditEntry> {
    const REQUIRED: &str = "Campos requeridos: accion, descripcion";

    let action = action(body)?.ok_or_else(|| AppError::validation(REQUIRED))?;
    let description =
        non_empty_text(body, &["descripcion"]).ok_or_else(|| AppError::validation(REQUIRED))?;
    let table = non_empty_text(body, &["tablaAfectada"]).unwrap_or_default();

    let mut entry = NewAuditEntry::new(action, table, description);
    entry.actor_id = integer(body, &["usuarioId"], "usuarioId inválido")?;
    entry.record_id = integer(body, &["registroId"], "registroId inválido")?;
    Ok(entry)
}

pub fn audit_changes(body: &JsonObject) -> AppResult<AuditEntryChanges> {
    Ok(AuditEntryChanges {
        actor_id: integer(body, &["usuarioId"], "usuarioId inválido")?,
        table: non_empty_text(body, &["tablaAfectada"]),
        record_id: integer(body, &["registroId"], "registroId inválido")?,
        action: action(body)?,
        description: non_empty_text(body, &["descripcion"]),
        status: integer(body, &["estado"], "estado inválido")?,
        recorded_at: instant(body, &["fecha"], "fecha inválida")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_parse_body() {
        assert!(parse_body(b"").unwrap().is_empty());
        assert!(parse_body(b"  ").unwrap().is_empty());
        assert!(parse_body(b"{\"a\":1}").unwrap().contains_key("a"));
        assert!(parse_body(b"[1,2]").is_err());
        assert!(parse_body(b"{nope").is_err());
    }

    #[test]
    fn test_register_aliases_and_defaults() {
        let body = object(json!({
            "nombreEntidad": "  Ana Ruiz ",
            "correo": "ana@test.com",
            "password": "abc123"
        }));

        let command = register_command(&body).unwrap();
        assert_eq!(command.name, "Ana Ruiz");
        assert_eq!(command.email, "ana@test.com");
        assert_eq!(command.entity_type, "Individual");
        assert_eq!(command.address, "");
    }

    #[test]
    fn test_register_validation_messages() {
        let missing_name = object(json!({ "email": "a@test.com", "password": "abc123" }));
        assert_eq!(
            register_command(&missing_name).unwrap_err().to_string(),
            "Nombre es requerido"
        );

        let bad_email = object(json!({ "name": "Ana Ruiz", "email": "nope", "password": "abc123" }));
        assert_eq!(
            register_command(&bad_email).unwrap_err().to_string(),
            "Correo electrónico no válido"
        );

        let weak = object(json!({ "name": "Ana Ruiz", "email": "a@test.com", "password": "abcdef" }));
        assert!(register_command(&weak).is_err());
    }

    #[test]
    fn test_credentials_accept_both_spellings() {
        let body = object(json!({ "correo": "a@test.com", "password": "x1" }));
        assert_eq!(
            credentials(&body),
            Some(("a@test.com".to_string(), "x1".to_string()))
        );
        assert_eq!(credentials(&object(json!({ "email": "a@test.com" }))), None);
    }

    #[test]
    fn test_report_create_aliases() {
        let body = object(json!({
            "descripcionReporte": "Producto en mal estado",
            "idReportante": "4",
            "idPublicacion": 9
        }));

        let report = new_report(&body).unwrap();
        assert_eq!(report.reporter_id, 4);
        assert_eq!(report.publication_id, 9);
        assert_eq!(report.status, status::ACTIVE);
    }

    #[test]
    fn test_report_update_rejects_bad_values() {
        let body = object(json!({ "estado": "activo" }));
        assert_eq!(report_changes(&body).unwrap_err().to_string(), "estado inválido");

        let body = object(json!({ "descripcion": "   " }));
        assert_eq!(
            report_changes(&body).unwrap_err().to_string(),
            "Descripción inválida"
        );

        let body = object(json!({ "fecha_reporte": "ayer" }));
        assert_eq!(
            report_changes(&body).unwrap_err().to_string(),
            "fechaReporte inválida"
        );
    }

    #[test]
    fn test_report_update_aliases() {
        let body = object(json!({
            "reportante_id": 3,
            "publicacion_id": "8",
            "fecha": "2025-10-04"
        }));

        let changes = report_changes(&body).unwrap();
        assert_eq!(changes.reporter_id, Some(3));
        assert_eq!(changes.publication_id, Some(8));
        assert_eq!(
            changes.reported_at,
            Some(Utc.with_ymd_and_hms(2025, 10, 4, 17, 0, 0).unwrap())
        );
        assert_eq!(changes.description, None);
    }

    #[test]
    fn test_parse_instant() {
        assert_eq!(
            parse_instant("2025-09-08T20:18:00Z"),
            Some(Utc.with_ymd_and_hms(2025, 9, 8, 20, 18, 0).unwrap())
        );
        assert_eq!(parse_instant("08/09/2025"), None);
    }

    #[test]
    fn test_new_publication() {
        let body = object(json!({
            "usuarioId": 1,
            "categoriaId": "2",
            "titulo": "Leche",
            "precio": 1500.5,
            "fechaCaducidad": "2025-12-01"
        }));

        let publication = new_publication(&body).unwrap();
        assert_eq!(publication.category_id, 2);
        assert_eq!(publication.price, dec!(1500.5));
        assert_eq!(
            publication.expires_on,
            NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
        );

        let missing = object(json!({ "usuarioId": 1 }));
        assert!(new_publication(&missing).is_err());
    }

    #[test]
    fn test_new_transaction_requires_all_parties() {
        let body = object(json!({ "publicacionId": 1, "donanteVendedorId": 2 }));
        assert!(new_transaction(&body).is_err());

        let body = object(json!({
            "publicacionId": 1,
            "donanteVendedorId": 2,
            "beneficiarioCompradorId": 3
        }));
        assert_eq!(new_transaction(&body).unwrap().beneficiary_id, 3);
    }

    #[test]
    fn test_new_audit_entry() {
        let body = object(json!({ "accion": "update", "descripcion": "ajuste manual" }));
        let entry = new_audit_entry(&body).unwrap();
        assert_eq!(entry.action, AuditAction::Update);
        assert_eq!(entry.actor_id, None);

        let body = object(json!({ "accion": "DROP", "descripcion": "x" }));
        assert!(new_audit_entry(&body).is_err());
    }
}
