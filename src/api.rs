use rocket::Request;
use rocket::State;
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::{Deserialize, Serialize, json::Json};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::auth::{Account, NewAccount, Permission, Role, StaffMember};
use crate::db::{
    authenticate_account, create_account, create_kinesiology_record, create_payment, create_player,
    delete_kinesiology_record, delete_payment, delete_player, get_all_payments,
    get_attendance_by_date_type, get_attendance_by_player, get_kinesiology_by_player,
    get_payment_totals, get_payments_by_player, get_player, get_players, get_staff,
    get_staff_member, recover_password, set_player_documents, submit_attendance,
    update_account_password, update_kinesiology_record, update_payment, update_player,
    update_staff_member,
};
use crate::error::{AppError, ErrorBody};
use crate::models::{
    AttendanceDay, AttendanceEntry, AttendanceRecord, KinesiologyData, KinesiologyRecord, Payment,
    PaymentData, PaymentTotals, PaymentWithPlayer, Player, PlayerData, StaffUpdateData,
};
use crate::storage::DocumentStore;
use crate::validation::{DNI_RE, ValidateExt, parse_fecha};

#[derive(Serialize)]
pub struct MessageResponse {
    pub mensaje: String,
}

// ==========================================
// Accounts & authentication
// ==========================================

#[derive(Deserialize, Validate, Clone)]
pub struct RegistrationRequest {
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
    #[validate(length(min = 3, message = "debe tener al menos 3 caracteres"))]
    pub usuario: String,
    #[validate(length(min = 6, message = "debe tener al menos 6 caracteres"))]
    pub password: String,
    pub rol: String,
    #[serde(rename = "rolCreador")]
    pub rol_creador: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AccountData {
    pub id: i64,
    pub nombre: String,
    pub usuario: String,
    pub rol: String,
}

impl From<Account> for AccountData {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            nombre: account.nombre,
            usuario: account.usuario,
            rol: account.rol.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct RegisteredResponse {
    pub mensaje: String,
    pub usuario: AccountData,
}

/// Account creation is the one role-gated operation: the caller states its
/// own role and only the top administrative role passes the capability
/// check. The gate runs before payload validation.
#[post("/registro", data = "<registration>")]
pub async fn api_register(
    registration: Json<RegistrationRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<RegisteredResponse>>, AppError> {
    let creator = Role::from_str(&registration.rol_creador).map_err(|_| {
        AppError::Authorization("Solo el Admin Principal puede crear cuentas".to_string())
    })?;
    creator.require_permission(Permission::ManageAccounts)?;

    registration.check()?;

    let rol =
        Role::from_str(&registration.rol).map_err(|err| AppError::Validation(err.to_string()))?;

    let account = create_account(
        db,
        &NewAccount {
            nombre: registration.nombre.clone(),
            apellido: registration.apellido.clone(),
            dni: registration.dni.clone(),
            direccion: registration.direccion.clone().unwrap_or_default(),
            telefono: registration.telefono.clone().unwrap_or_default(),
            correo: registration.correo.clone(),
            usuario: registration.usuario.clone(),
            password: registration.password.clone(),
            rol,
        },
    )
    .await?;

    Ok(Custom(
        Status::Created,
        Json(RegisteredResponse {
            mensaje: "Usuario registrado con éxito".to_string(),
            usuario: AccountData::from(account),
        }),
    ))
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    pub usuario: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginUserData {
    pub id: i64,
    pub nombre: String,
    pub rol: String,
    pub debe_cambiar_password: bool,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub mensaje: String,
    pub usuario: LoginUserData,
}

#[post("/login", data = "<login>")]
pub async fn api_login(
    login: Json<LoginRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<LoginResponse>, AppError> {
    let account = authenticate_account(db, &login.usuario, &login.password).await?;

    Ok(Json(LoginResponse {
        mensaje: "Login exitoso".to_string(),
        usuario: LoginUserData {
            id: account.id,
            nombre: account.nombre,
            rol: account.rol.to_string(),
            // The client must route to the mandatory change screen while set.
            debe_cambiar_password: account.debe_cambiar_password,
        },
    }))
}

#[derive(Deserialize, Validate)]
pub struct PasswordChangeRequest {
    pub id: i64,
    #[serde(rename = "nuevaPassword")]
    #[validate(length(min = 6, message = "debe tener al menos 6 caracteres"))]
    pub nueva_password: String,
}

#[post("/cambiar-password", data = "<change>")]
pub async fn api_change_password(
    change: Json<PasswordChangeRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, AppError> {
    change.check()?;

    update_account_password(db, change.id, &change.nueva_password).await?;

    Ok(Json(MessageResponse {
        mensaje: "Contraseña actualizada con éxito".to_string(),
    }))
}

#[derive(Deserialize, Validate)]
pub struct RecoveryRequest {
    #[validate(email(message = "correo inválido"))]
    pub correo: String,
    #[validate(regex(path = *DNI_RE, message = "debe ser numérico"))]
    pub dni: String,
    #[serde(rename = "nuevaPassword")]
    #[validate(length(min = 6, message = "debe tener al menos 6 caracteres"))]
    pub nueva_password: String,
}

#[derive(Serialize, Deserialize)]
pub struct RecoveryResponse {
    pub mensaje: String,
    #[serde(rename = "usuarioRecordado")]
    pub usuario_recordado: String,
}

#[post("/recuperar", data = "<recovery>")]
pub async fn api_recover_password(
    recovery: Json<RecoveryRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<RecoveryResponse>, AppError> {
    recovery.check()?;

    let usuario = recover_password(db, &recovery.correo, &recovery.dni, &recovery.nueva_password)
        .await?;

    Ok(Json(RecoveryResponse {
        mensaje: "Contraseña actualizada con éxito".to_string(),
        usuario_recordado: usuario,
    }))
}

// ==========================================
// Players
// ==========================================

#[get("/jugadores")]
pub async fn api_get_players(db: &State<Pool<Sqlite>>) -> Result<Json<Vec<Player>>, AppError> {
    Ok(Json(get_players(db).await?))
}

#[get("/jugadores/<id>")]
pub async fn api_get_player(id: i64, db: &State<Pool<Sqlite>>) -> Result<Json<Player>, AppError> {
    Ok(Json(get_player(db, id).await?))
}

#[post("/jugadores", data = "<player>")]
pub async fn api_create_player(
    player: Json<PlayerData>,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<Player>>, AppError> {
    player.check()?;

    let created = create_player(db, &player).await?;
    Ok(Custom(Status::Created, Json(created)))
}

#[put("/jugadores/<id>", data = "<player>")]
pub async fn api_update_player(
    id: i64,
    player: Json<PlayerData>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Player>, AppError> {
    player.check()?;

    Ok(Json(update_player(db, id, &player).await?))
}

#[delete("/jugadores/<id>")]
pub async fn api_delete_player(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, AppError> {
    delete_player(db, id).await?;

    Ok(Json(MessageResponse {
        mensaje: "Jugador eliminado correctamente".to_string(),
    }))
}

/// The three named document slots a player row can reference. All optional:
/// the secretary uploads whatever is at hand.
#[derive(FromForm)]
pub struct PlayerDocuments<'f> {
    pub apto_fisico: Option<TempFile<'f>>,
    pub dni_frente: Option<TempFile<'f>>,
    pub dni_dorso: Option<TempFile<'f>>,
}

#[post("/jugadores/<id>/documentos", data = "<documents>")]
pub async fn api_upload_player_documents(
    id: i64,
    mut documents: Form<PlayerDocuments<'_>>,
    store: &State<DocumentStore>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Player>, AppError> {
    // Fail before touching the filesystem if the player is unknown.
    get_player(db, id).await?;

    let apto_fisico = match documents.apto_fisico.as_mut() {
        Some(file) => Some(store.save("apto_fisico", file).await?),
        None => None,
    };
    let dni_frente = match documents.dni_frente.as_mut() {
        Some(file) => Some(store.save("dni_frente", file).await?),
        None => None,
    };
    let dni_dorso = match documents.dni_dorso.as_mut() {
        Some(file) => Some(store.save("dni_dorso", file).await?),
        None => None,
    };

    let player = set_player_documents(
        db,
        id,
        apto_fisico.as_deref(),
        dni_frente.as_deref(),
        dni_dorso.as_deref(),
    )
    .await?;

    Ok(Json(player))
}

// ==========================================
// Payments (treasury)
// ==========================================

#[get("/pagos/totales")]
pub async fn api_get_payment_totals(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<PaymentTotals>, AppError> {
    Ok(Json(get_payment_totals(db).await?))
}

#[get("/pagos/todos")]
pub async fn api_get_all_payments(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<PaymentWithPlayer>>, AppError> {
    Ok(Json(get_all_payments(db).await?))
}

#[get("/pagos/<jugador_id>")]
pub async fn api_get_player_payments(
    jugador_id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Payment>>, AppError> {
    Ok(Json(get_payments_by_player(db, jugador_id).await?))
}

#[derive(Serialize, Deserialize)]
pub struct PaymentCreatedResponse {
    pub mensaje: String,
    pub pago: Payment,
}

#[post("/pagos", data = "<payment>")]
pub async fn api_create_payment(
    payment: Json<PaymentData>,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<PaymentCreatedResponse>>, AppError> {
    payment.check()?;

    let pago = create_payment(db, &payment).await?;

    Ok(Custom(
        Status::Created,
        Json(PaymentCreatedResponse {
            mensaje: "¡Pago registrado con éxito!".to_string(),
            pago,
        }),
    ))
}

#[put("/pagos/<id>", data = "<payment>")]
pub async fn api_update_payment(
    id: i64,
    payment: Json<PaymentData>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Payment>, AppError> {
    payment.check()?;

    Ok(Json(update_payment(db, id, &payment).await?))
}

#[delete("/pagos/<id>")]
pub async fn api_delete_payment(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, AppError> {
    delete_payment(db, id).await?;

    Ok(Json(MessageResponse {
        mensaje: "Pago eliminado correctamente".to_string(),
    }))
}

// ==========================================
// Attendance
// ==========================================

#[get("/asistencia/jugador/<id>")]
pub async fn api_get_player_attendance(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<AttendanceDay>>, AppError> {
    Ok(Json(get_attendance_by_player(db, id).await?))
}

#[get("/asistencia/<fecha>/<tipo>", rank = 2)]
pub async fn api_get_attendance_sheet(
    fecha: &str,
    tipo: &str,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    let fecha = parse_fecha(fecha)?;

    Ok(Json(get_attendance_by_date_type(db, fecha, tipo).await?))
}

#[post("/asistencia", data = "<entries>")]
pub async fn api_submit_attendance(
    entries: Json<Vec<AttendanceEntry>>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, AppError> {
    submit_attendance(db, &entries).await?;

    Ok(Json(MessageResponse {
        mensaje: "¡Planilla guardada con éxito!".to_string(),
    }))
}

// ==========================================
// Staff directory
// ==========================================

#[get("/personal")]
pub async fn api_get_staff(db: &State<Pool<Sqlite>>) -> Result<Json<Vec<StaffMember>>, AppError> {
    Ok(Json(get_staff(db).await?))
}

#[get("/personal/<id>")]
pub async fn api_get_staff_member(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<StaffMember>, AppError> {
    Ok(Json(get_staff_member(db, id).await?))
}

#[put("/personal/<id>", data = "<update>")]
pub async fn api_update_staff_member(
    id: i64,
    update: Json<StaffUpdateData>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<StaffMember>, AppError> {
    update.check()?;

    Ok(Json(update_staff_member(db, id, &update).await?))
}

// ==========================================
// Kinesiology
// ==========================================

#[get("/kinesiologia/<jugador_id>")]
pub async fn api_get_player_kinesiology(
    jugador_id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<KinesiologyRecord>>, AppError> {
    Ok(Json(get_kinesiology_by_player(db, jugador_id).await?))
}

#[post("/kinesiologia", data = "<record>")]
pub async fn api_create_kinesiology(
    record: Json<KinesiologyData>,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<KinesiologyRecord>>, AppError> {
    record.check()?;

    let created = create_kinesiology_record(db, &record).await?;
    Ok(Custom(Status::Created, Json(created)))
}

#[put("/kinesiologia/<id>", data = "<record>")]
pub async fn api_update_kinesiology(
    id: i64,
    record: Json<KinesiologyData>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<KinesiologyRecord>, AppError> {
    record.check()?;

    Ok(Json(update_kinesiology_record(db, id, &record).await?))
}

#[delete("/kinesiologia/<id>")]
pub async fn api_delete_kinesiology(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, AppError> {
    delete_kinesiology_record(db, id).await?;

    Ok(Json(MessageResponse {
        mensaje: "Registro eliminado correctamente".to_string(),
    }))
}

// ==========================================
// Service
// ==========================================

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}

/// Framework-level failures (bad JSON, unknown routes) answer with the same
/// envelope the handlers use.
#[catch(default)]
pub fn default_catcher(status: Status, _req: &Request<'_>) -> Custom<Json<ErrorBody>> {
    let kind = match status.code {
        401 => "authentication",
        403 => "authorization",
        404 => "not_found",
        409 => "conflict",
        400 | 422 => "validation",
        _ => "internal",
    };

    Custom(
        status,
        Json(ErrorBody {
            kind,
            message: status.reason_lossy().to_string(),
        }),
    )
}
