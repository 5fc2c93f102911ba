use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::DNI_RE;

#[derive(Serialize, Clone, Debug)]
pub struct Player {
    pub id: i64,
    pub nombre: String,
    pub apellido: String,
    pub dni: String,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub telefono: String,
    pub contacto_emergencia_nombre: String,
    pub contacto_emergencia_tel: String,
    pub grupo_sanguineo: Option<String>,
    pub alergias: String,
    pub lesiones: String,
    pub cirugias: String,
    pub rama: String,
    pub apto_fisico: Option<String>,
    pub dni_frente: Option<String>,
    pub dni_dorso: Option<String>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbPlayer {
    pub id: Option<i64>,
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub dni: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub telefono: Option<String>,
    pub contacto_emergencia_nombre: Option<String>,
    pub contacto_emergencia_tel: Option<String>,
    pub grupo_sanguineo: Option<String>,
    pub alergias: Option<String>,
    pub lesiones: Option<String>,
    pub cirugias: Option<String>,
    pub rama: Option<String>,
    pub apto_fisico: Option<String>,
    pub dni_frente: Option<String>,
    pub dni_dorso: Option<String>,
}

impl From<DbPlayer> for Player {
    fn from(player: DbPlayer) -> Self {
        Self {
            id: player.id.unwrap_or_default(),
            nombre: player.nombre.unwrap_or_default(),
            apellido: player.apellido.unwrap_or_default(),
            dni: player.dni.unwrap_or_default(),
            fecha_nacimiento: player.fecha_nacimiento,
            telefono: player.telefono.unwrap_or_default(),
            contacto_emergencia_nombre: player.contacto_emergencia_nombre.unwrap_or_default(),
            contacto_emergencia_tel: player.contacto_emergencia_tel.unwrap_or_default(),
            grupo_sanguineo: player.grupo_sanguineo,
            alergias: player.alergias.unwrap_or_default(),
            lesiones: player.lesiones.unwrap_or_default(),
            cirugias: player.cirugias.unwrap_or_default(),
            rama: player.rama.unwrap_or_default(),
            apto_fisico: player.apto_fisico,
            dni_frente: player.dni_frente,
            dni_dorso: player.dni_dorso,
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Payment {
    pub id: i64,
    pub jugador_id: i64,
    pub fecha_pago: NaiveDate,
    pub mes_correspondiente: String,
    pub monto: f64,
    pub metodo: String,
    pub observaciones: String,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbPayment {
    pub id: Option<i64>,
    pub jugador_id: Option<i64>,
    pub fecha_pago: Option<NaiveDate>,
    pub mes_correspondiente: Option<String>,
    pub monto: Option<f64>,
    pub metodo: Option<String>,
    pub observaciones: Option<String>,
}

impl From<DbPayment> for Payment {
    fn from(payment: DbPayment) -> Self {
        Self {
            id: payment.id.unwrap_or_default(),
            jugador_id: payment.jugador_id.unwrap_or_default(),
            fecha_pago: payment.fecha_pago.unwrap_or_default(),
            mes_correspondiente: payment.mes_correspondiente.unwrap_or_default(),
            monto: payment.monto.unwrap_or_default(),
            metodo: payment.metodo.unwrap_or_default(),
            observaciones: payment.observaciones.unwrap_or_default(),
        }
    }
}

/// Ledger row: a payment plus the owning player's name. Denormalized for the
/// treasury's global view.
#[derive(Serialize, Clone)]
pub struct PaymentWithPlayer {
    pub id: i64,
    pub jugador_id: i64,
    pub jugador_nombre: String,
    pub jugador_apellido: String,
    pub fecha_pago: NaiveDate,
    pub mes_correspondiente: String,
    pub monto: f64,
    pub metodo: String,
    pub observaciones: String,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbPaymentWithPlayer {
    pub id: Option<i64>,
    pub jugador_id: Option<i64>,
    pub jugador_nombre: Option<String>,
    pub jugador_apellido: Option<String>,
    pub fecha_pago: Option<NaiveDate>,
    pub mes_correspondiente: Option<String>,
    pub monto: Option<f64>,
    pub metodo: Option<String>,
    pub observaciones: Option<String>,
}

impl From<DbPaymentWithPlayer> for PaymentWithPlayer {
    fn from(row: DbPaymentWithPlayer) -> Self {
        Self {
            id: row.id.unwrap_or_default(),
            jugador_id: row.jugador_id.unwrap_or_default(),
            jugador_nombre: row.jugador_nombre.unwrap_or_default(),
            jugador_apellido: row.jugador_apellido.unwrap_or_default(),
            fecha_pago: row.fecha_pago.unwrap_or_default(),
            mes_correspondiente: row.mes_correspondiente.unwrap_or_default(),
            monto: row.monto.unwrap_or_default(),
            metodo: row.metodo.unwrap_or_default(),
            observaciones: row.observaciones.unwrap_or_default(),
        }
    }
}

#[derive(sqlx::FromRow, Serialize, Clone)]
pub struct PaymentTotals {
    pub cantidad: i64,
    pub total: f64,
}

#[derive(Serialize, Clone)]
pub struct AttendanceRecord {
    pub id: i64,
    pub jugador_id: i64,
    pub fecha: NaiveDate,
    pub tipo_entrenamiento: String,
    pub estado: String,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbAttendanceRecord {
    pub id: Option<i64>,
    pub jugador_id: Option<i64>,
    pub fecha: Option<NaiveDate>,
    pub tipo_entrenamiento: Option<String>,
    pub estado: Option<String>,
}

impl From<DbAttendanceRecord> for AttendanceRecord {
    fn from(record: DbAttendanceRecord) -> Self {
        Self {
            id: record.id.unwrap_or_default(),
            jugador_id: record.jugador_id.unwrap_or_default(),
            fecha: record.fecha.unwrap_or_default(),
            tipo_entrenamiento: record.tipo_entrenamiento.unwrap_or_default(),
            estado: record.estado.unwrap_or_default(),
        }
    }
}

/// Per-player history projection: the roll-call screen only needs the date,
/// the session type and the recorded status.
#[derive(sqlx::FromRow, Serialize, Clone)]
pub struct AttendanceDay {
    pub fecha: NaiveDate,
    pub tipo_entrenamiento: String,
    pub estado: String,
}

#[derive(Serialize, Clone)]
pub struct KinesiologyRecord {
    pub id: i64,
    pub jugador_id: i64,
    pub fecha: NaiveDate,
    pub motivo: String,
    pub tratamiento: String,
    pub observaciones: String,
    pub profesional: String,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbKinesiologyRecord {
    pub id: Option<i64>,
    pub jugador_id: Option<i64>,
    pub fecha: Option<NaiveDate>,
    pub motivo: Option<String>,
    pub tratamiento: Option<String>,
    pub observaciones: Option<String>,
    pub profesional: Option<String>,
}

impl From<DbKinesiologyRecord> for KinesiologyRecord {
    fn from(record: DbKinesiologyRecord) -> Self {
        Self {
            id: record.id.unwrap_or_default(),
            jugador_id: record.jugador_id.unwrap_or_default(),
            fecha: record.fecha.unwrap_or_default(),
            motivo: record.motivo.unwrap_or_default(),
            tratamiento: record.tratamiento.unwrap_or_default(),
            observaciones: record.observaciones.unwrap_or_default(),
            profesional: record.profesional.unwrap_or_default(),
        }
    }
}

/// Create/update payload for a player. Only name and dni are mandatory; the
/// medical fields fall back to "Ninguna" and the branch to "Masculino", the
/// same defaults the registration form leaves implicit.
#[derive(Deserialize, Validate, Clone)]
pub struct PlayerData {
    #[validate(length(min = 1, message = "no puede estar vacío"))]
    pub nombre: String,
    pub apellido: Option<String>,
    #[validate(regex(path = *DNI_RE, message = "debe ser numérico"))]
    pub dni: String,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub telefono: Option<String>,
    pub contacto_emergencia_nombre: Option<String>,
    pub contacto_emergencia_tel: Option<String>,
    pub grupo_sanguineo: Option<String>,
    pub alergias: Option<String>,
    pub lesiones: Option<String>,
    pub cirugias: Option<String>,
    pub rama: Option<String>,
}

#[derive(Deserialize, Validate, Clone)]
pub struct PaymentData {
    pub jugador_id: i64,
    pub fecha_pago: NaiveDate,
    #[validate(length(min = 1, message = "no puede estar vacío"))]
    pub mes_correspondiente: String,
    #[validate(range(min = 0.0, message = "debe ser positivo"))]
    pub monto: f64,
    pub metodo: Option<String>,
    pub observaciones: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct AttendanceEntry {
    pub jugador_id: i64,
    pub fecha: NaiveDate,
    pub tipo_entrenamiento: String,
    pub estado: String,
}

#[derive(Deserialize, Validate, Clone)]
pub struct KinesiologyData {
    pub jugador_id: i64,
    pub fecha: NaiveDate,
    #[validate(length(min = 1, message = "no puede estar vacío"))]
    pub motivo: String,
    pub tratamiento: Option<String>,
    pub observaciones: Option<String>,
    pub profesional: Option<String>,
}

/// Staff-directory update: personal fields only. Role and credentials are
/// deliberately absent.
#[derive(Deserialize, Validate, Clone)]
pub struct StaffUpdateData {
    #[validate(length(min = 1, message = "no puede estar vacío"))]
    pub nombre: String,
    #[validate(length(min = 1, message = "no puede estar vacío"))]
    pub apellido: String,
    #[validate(regex(path = *DNI_RE, message = "debe ser numérico"))]
    pub dni: String,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    #[validate(email(message = "correo inválido"))]
    pub correo: String,
}
