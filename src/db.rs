use chrono::NaiveDate;
use sqlx::{Pool, QueryBuilder, Sqlite};
use tracing::{info, instrument};

use crate::auth::{Account, DbAccount, DbStaffMember, NewAccount, StaffMember};
use crate::error::AppError;
use crate::models::{
    AttendanceDay, AttendanceEntry, AttendanceRecord, DbAttendanceRecord, DbKinesiologyRecord,
    DbPayment, DbPaymentWithPlayer, DbPlayer, KinesiologyData, KinesiologyRecord, Payment,
    PaymentData, PaymentTotals, PaymentWithPlayer, Player, PlayerData, StaffUpdateData,
};

const ACCOUNT_COLUMNS: &str =
    "id, nombre, apellido, dni, direccion, telefono, correo, usuario, rol, debe_cambiar_password";

const STAFF_COLUMNS: &str = "id, nombre, apellido, dni, direccion, telefono, correo, rol";

const UNIQUE_ACCOUNT_MSG: &str = "Es posible que el DNI, Correo o Usuario ya existan";

// ==========================================
// Accounts
// ==========================================

#[instrument(skip_all, fields(usuario = %account.usuario, rol = %account.rol))]
pub async fn create_account(
    pool: &Pool<Sqlite>,
    account: &NewAccount,
) -> Result<Account, AppError> {
    info!("Creating new account");

    let hashed_password = bcrypt::hash(&account.password, bcrypt::DEFAULT_COST)?;

    let res = sqlx::query(
        "INSERT INTO usuarios
         (nombre, apellido, dni, direccion, telefono, correo, usuario, password, rol, debe_cambiar_password)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1)",
    )
    .bind(&account.nombre)
    .bind(&account.apellido)
    .bind(&account.dni)
    .bind(&account.direccion)
    .bind(&account.telefono)
    .bind(&account.correo)
    .bind(&account.usuario)
    .bind(&hashed_password)
    .bind(account.rol.as_str())
    .execute(pool)
    .await
    .map_err(|err| AppError::from_db(err, UNIQUE_ACCOUNT_MSG))?;

    get_account(pool, res.last_insert_rowid()).await
}

#[instrument]
pub async fn get_account(pool: &Pool<Sqlite>, id: i64) -> Result<Account, AppError> {
    info!("Fetching account by ID");
    let row = sqlx::query_as::<_, DbAccount>(&format!(
        "SELECT {} FROM usuarios WHERE id = ?",
        ACCOUNT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(account) => Ok(Account::from(account)),
        _ => Err(AppError::NotFound(format!(
            "Usuario con id {} no encontrado",
            id
        ))),
    }
}

#[instrument(skip_all, fields(usuario))]
pub async fn authenticate_account(
    pool: &Pool<Sqlite>,
    usuario: &str,
    password: &str,
) -> Result<Account, AppError> {
    info!("Authenticating account");

    #[derive(sqlx::FromRow)]
    struct AuthRow {
        id: i64,
        password: String,
    }

    let row = sqlx::query_as::<_, AuthRow>("SELECT id, password FROM usuarios WHERE usuario = ?")
        .bind(usuario)
        .fetch_optional(pool)
        .await?;

    let row = match row {
        Some(row) => row,
        _ => return Err(AppError::Authentication("El usuario no existe".to_string())),
    };

    let valid = bcrypt::verify(password, &row.password).unwrap_or(false);
    if !valid {
        return Err(AppError::Authentication("Contraseña incorrecta".to_string()));
    }

    get_account(pool, row.id).await
}

/// Mandatory first-login change: stores the new hash and clears the
/// force-change flag in the same statement.
#[instrument(skip_all, fields(account_id))]
pub async fn update_account_password(
    pool: &Pool<Sqlite>,
    account_id: i64,
    new_password: &str,
) -> Result<(), AppError> {
    info!("Updating account password");
    let hashed_password = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)?;

    let res = sqlx::query("UPDATE usuarios SET password = ?, debe_cambiar_password = 0 WHERE id = ?")
        .bind(&hashed_password)
        .bind(account_id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Usuario con id {} no encontrado",
            account_id
        )));
    }

    Ok(())
}

/// Recovery needs BOTH the email and the national ID to match one row.
/// Returns the account's login name so the user can be reminded of it.
#[instrument(skip_all, fields(correo))]
pub async fn recover_password(
    pool: &Pool<Sqlite>,
    correo: &str,
    dni: &str,
    new_password: &str,
) -> Result<String, AppError> {
    info!("Recovering account password");

    #[derive(sqlx::FromRow)]
    struct RecoveryRow {
        id: i64,
        usuario: String,
    }

    let row =
        sqlx::query_as::<_, RecoveryRow>("SELECT id, usuario FROM usuarios WHERE correo = ? AND dni = ?")
            .bind(correo)
            .bind(dni)
            .fetch_optional(pool)
            .await?;

    let row = match row {
        Some(row) => row,
        _ => {
            return Err(AppError::NotFound(
                "No encontramos ninguna cuenta que coincida con ese Correo y DNI".to_string(),
            ));
        }
    };

    let hashed_password = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)?;

    sqlx::query("UPDATE usuarios SET password = ? WHERE id = ?")
        .bind(&hashed_password)
        .bind(row.id)
        .execute(pool)
        .await?;

    Ok(row.usuario)
}

// ==========================================
// Staff directory
// ==========================================

#[instrument]
pub async fn get_staff(pool: &Pool<Sqlite>) -> Result<Vec<StaffMember>, AppError> {
    info!("Fetching staff directory");
    let rows = sqlx::query_as::<_, DbStaffMember>(&format!(
        "SELECT {} FROM usuarios ORDER BY apellido, nombre",
        STAFF_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(StaffMember::from).collect())
}

#[instrument]
pub async fn get_staff_member(pool: &Pool<Sqlite>, id: i64) -> Result<StaffMember, AppError> {
    info!("Fetching staff member");
    let row = sqlx::query_as::<_, DbStaffMember>(&format!(
        "SELECT {} FROM usuarios WHERE id = ?",
        STAFF_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(member) => Ok(StaffMember::from(member)),
        _ => Err(AppError::NotFound(format!(
            "Miembro del personal con id {} no encontrado",
            id
        ))),
    }
}

/// Personal fields only. Role and credentials are not reachable from here.
#[instrument(skip(pool, data))]
pub async fn update_staff_member(
    pool: &Pool<Sqlite>,
    id: i64,
    data: &StaffUpdateData,
) -> Result<StaffMember, AppError> {
    info!("Updating staff member");
    let res = sqlx::query(
        "UPDATE usuarios
         SET nombre = ?, apellido = ?, dni = ?, direccion = ?, telefono = ?, correo = ?
         WHERE id = ?",
    )
    .bind(&data.nombre)
    .bind(&data.apellido)
    .bind(&data.dni)
    .bind(data.direccion.clone().unwrap_or_default())
    .bind(data.telefono.clone().unwrap_or_default())
    .bind(&data.correo)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|err| AppError::from_db(err, UNIQUE_ACCOUNT_MSG))?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Miembro del personal con id {} no encontrado",
            id
        )));
    }

    get_staff_member(pool, id).await
}

// ==========================================
// Players
// ==========================================

#[instrument]
pub async fn get_players(pool: &Pool<Sqlite>) -> Result<Vec<Player>, AppError> {
    info!("Fetching all players");
    let rows = sqlx::query_as::<_, DbPlayer>("SELECT * FROM jugadores ORDER BY id ASC")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Player::from).collect())
}

#[instrument]
pub async fn get_player(pool: &Pool<Sqlite>, id: i64) -> Result<Player, AppError> {
    info!("Fetching player");
    let row = sqlx::query_as::<_, DbPlayer>("SELECT * FROM jugadores WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(player) => Ok(Player::from(player)),
        _ => Err(AppError::NotFound("Jugador no encontrado".to_string())),
    }
}

#[instrument(skip(pool, data))]
pub async fn create_player(pool: &Pool<Sqlite>, data: &PlayerData) -> Result<Player, AppError> {
    info!("Creating player");
    let res = sqlx::query(
        "INSERT INTO jugadores
         (nombre, apellido, dni, fecha_nacimiento, telefono,
          contacto_emergencia_nombre, contacto_emergencia_tel,
          grupo_sanguineo, alergias, lesiones, cirugias, rama)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&data.nombre)
    .bind(data.apellido.clone().unwrap_or_default())
    .bind(&data.dni)
    .bind(data.fecha_nacimiento)
    .bind(data.telefono.clone().unwrap_or_default())
    .bind(data.contacto_emergencia_nombre.clone().unwrap_or_default())
    .bind(data.contacto_emergencia_tel.clone().unwrap_or_default())
    .bind(&data.grupo_sanguineo)
    .bind(data.alergias.clone().unwrap_or_else(|| "Ninguna".to_string()))
    .bind(data.lesiones.clone().unwrap_or_else(|| "Ninguna".to_string()))
    .bind(data.cirugias.clone().unwrap_or_else(|| "Ninguna".to_string()))
    .bind(data.rama.clone().unwrap_or_else(|| "Masculino".to_string()))
    .execute(pool)
    .await?;

    get_player(pool, res.last_insert_rowid()).await
}

#[instrument(skip(pool, data))]
pub async fn update_player(
    pool: &Pool<Sqlite>,
    id: i64,
    data: &PlayerData,
) -> Result<Player, AppError> {
    info!("Updating player");
    let res = sqlx::query(
        "UPDATE jugadores
         SET nombre = ?, apellido = ?, dni = ?, fecha_nacimiento = ?, telefono = ?,
             contacto_emergencia_nombre = ?, contacto_emergencia_tel = ?,
             grupo_sanguineo = ?, alergias = ?, lesiones = ?, cirugias = ?, rama = ?
         WHERE id = ?",
    )
    .bind(&data.nombre)
    .bind(data.apellido.clone().unwrap_or_default())
    .bind(&data.dni)
    .bind(data.fecha_nacimiento)
    .bind(data.telefono.clone().unwrap_or_default())
    .bind(data.contacto_emergencia_nombre.clone().unwrap_or_default())
    .bind(data.contacto_emergencia_tel.clone().unwrap_or_default())
    .bind(&data.grupo_sanguineo)
    .bind(data.alergias.clone().unwrap_or_else(|| "Ninguna".to_string()))
    .bind(data.lesiones.clone().unwrap_or_else(|| "Ninguna".to_string()))
    .bind(data.cirugias.clone().unwrap_or_else(|| "Ninguna".to_string()))
    .bind(data.rama.clone().unwrap_or_else(|| "Masculino".to_string()))
    .bind(id)
    .execute(pool)
    .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("Jugador no encontrado".to_string()));
    }

    get_player(pool, id).await
}

#[instrument]
pub async fn delete_player(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting player");
    let res = sqlx::query("DELETE FROM jugadores WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("Jugador no encontrado".to_string()));
    }

    Ok(())
}

/// Stores the generated filenames for whichever document slots were uploaded.
/// Absent slots keep their previous value.
#[instrument(skip(pool))]
pub async fn set_player_documents(
    pool: &Pool<Sqlite>,
    id: i64,
    apto_fisico: Option<&str>,
    dni_frente: Option<&str>,
    dni_dorso: Option<&str>,
) -> Result<Player, AppError> {
    info!("Storing player document references");
    let res = sqlx::query(
        "UPDATE jugadores
         SET apto_fisico = COALESCE(?, apto_fisico),
             dni_frente = COALESCE(?, dni_frente),
             dni_dorso = COALESCE(?, dni_dorso)
         WHERE id = ?",
    )
    .bind(apto_fisico)
    .bind(dni_frente)
    .bind(dni_dorso)
    .bind(id)
    .execute(pool)
    .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("Jugador no encontrado".to_string()));
    }

    get_player(pool, id).await
}

// ==========================================
// Payments
// ==========================================

#[instrument]
pub async fn get_payments_by_player(
    pool: &Pool<Sqlite>,
    jugador_id: i64,
) -> Result<Vec<Payment>, AppError> {
    info!("Fetching payments for player");
    let rows = sqlx::query_as::<_, DbPayment>(
        "SELECT * FROM pagos WHERE jugador_id = ? ORDER BY fecha_pago DESC",
    )
    .bind(jugador_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Payment::from).collect())
}

#[instrument]
pub async fn get_payment(pool: &Pool<Sqlite>, id: i64) -> Result<Payment, AppError> {
    info!("Fetching payment");
    let row = sqlx::query_as::<_, DbPayment>("SELECT * FROM pagos WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(payment) => Ok(Payment::from(payment)),
        _ => Err(AppError::NotFound("Pago no encontrado".to_string())),
    }
}

#[instrument(skip(pool, data))]
pub async fn create_payment(pool: &Pool<Sqlite>, data: &PaymentData) -> Result<Payment, AppError> {
    info!("Recording payment");
    let res = sqlx::query(
        "INSERT INTO pagos (jugador_id, fecha_pago, mes_correspondiente, monto, metodo, observaciones)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(data.jugador_id)
    .bind(data.fecha_pago)
    .bind(&data.mes_correspondiente)
    .bind(data.monto)
    .bind(data.metodo.clone().unwrap_or_default())
    .bind(data.observaciones.clone().unwrap_or_default())
    .execute(pool)
    .await?;

    get_payment(pool, res.last_insert_rowid()).await
}

#[instrument(skip(pool, data))]
pub async fn update_payment(
    pool: &Pool<Sqlite>,
    id: i64,
    data: &PaymentData,
) -> Result<Payment, AppError> {
    info!("Updating payment");
    let res = sqlx::query(
        "UPDATE pagos
         SET jugador_id = ?, fecha_pago = ?, mes_correspondiente = ?, monto = ?, metodo = ?, observaciones = ?
         WHERE id = ?",
    )
    .bind(data.jugador_id)
    .bind(data.fecha_pago)
    .bind(&data.mes_correspondiente)
    .bind(data.monto)
    .bind(data.metodo.clone().unwrap_or_default())
    .bind(data.observaciones.clone().unwrap_or_default())
    .bind(id)
    .execute(pool)
    .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("Pago no encontrado".to_string()));
    }

    get_payment(pool, id).await
}

#[instrument]
pub async fn delete_payment(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting payment");
    let res = sqlx::query("DELETE FROM pagos WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("Pago no encontrado".to_string()));
    }

    Ok(())
}

#[instrument]
pub async fn get_payment_totals(pool: &Pool<Sqlite>) -> Result<PaymentTotals, AppError> {
    info!("Computing payment totals");
    let totals = sqlx::query_as::<_, PaymentTotals>(
        "SELECT COUNT(*) AS cantidad, COALESCE(SUM(monto), 0.0) AS total FROM pagos",
    )
    .fetch_one(pool)
    .await?;

    Ok(totals)
}

#[instrument]
pub async fn get_all_payments(pool: &Pool<Sqlite>) -> Result<Vec<PaymentWithPlayer>, AppError> {
    info!("Fetching global payment ledger");
    let rows = sqlx::query_as::<_, DbPaymentWithPlayer>(
        "SELECT p.id, p.jugador_id, j.nombre AS jugador_nombre, j.apellido AS jugador_apellido,
                p.fecha_pago, p.mes_correspondiente, p.monto, p.metodo, p.observaciones
         FROM pagos p
         JOIN jugadores j ON j.id = p.jugador_id
         ORDER BY p.fecha_pago DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(PaymentWithPlayer::from).collect())
}

// ==========================================
// Attendance
// ==========================================

#[instrument]
pub async fn get_attendance_by_player(
    pool: &Pool<Sqlite>,
    jugador_id: i64,
) -> Result<Vec<AttendanceDay>, AppError> {
    info!("Fetching attendance history for player");
    let rows = sqlx::query_as::<_, AttendanceDay>(
        "SELECT fecha, tipo_entrenamiento, estado
         FROM asistencia
         WHERE jugador_id = ?
         ORDER BY fecha DESC",
    )
    .bind(jugador_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[instrument]
pub async fn get_attendance_by_date_type(
    pool: &Pool<Sqlite>,
    fecha: NaiveDate,
    tipo_entrenamiento: &str,
) -> Result<Vec<AttendanceRecord>, AppError> {
    info!("Fetching attendance sheet");
    let rows = sqlx::query_as::<_, DbAttendanceRecord>(
        "SELECT * FROM asistencia WHERE fecha = ? AND tipo_entrenamiento = ?",
    )
    .bind(fecha)
    .bind(tipo_entrenamiento)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(AttendanceRecord::from).collect())
}

/// Applies a whole roll-call sheet as one multi-row upsert inside a single
/// transaction: either every (jugador, fecha, tipo) tuple lands, or none do.
/// An unknown jugador_id trips the FK constraint and rolls the batch back.
#[instrument(skip_all, fields(entries = entries.len()))]
pub async fn submit_attendance(
    pool: &Pool<Sqlite>,
    entries: &[AttendanceEntry],
) -> Result<u64, AppError> {
    info!("Submitting attendance sheet");

    if entries.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO asistencia (jugador_id, fecha, tipo_entrenamiento, estado) ");
    builder.push_values(entries, |mut row, entry| {
        row.push_bind(entry.jugador_id)
            .push_bind(entry.fecha)
            .push_bind(&entry.tipo_entrenamiento)
            .push_bind(&entry.estado);
    });
    builder.push(
        " ON CONFLICT (jugador_id, fecha, tipo_entrenamiento) DO UPDATE SET estado = excluded.estado",
    );

    let res = builder.build().execute(&mut *tx).await?;

    tx.commit().await?;

    Ok(res.rows_affected())
}

// ==========================================
// Kinesiology
// ==========================================

#[instrument]
pub async fn get_kinesiology_by_player(
    pool: &Pool<Sqlite>,
    jugador_id: i64,
) -> Result<Vec<KinesiologyRecord>, AppError> {
    info!("Fetching kinesiology history for player");
    let rows = sqlx::query_as::<_, DbKinesiologyRecord>(
        "SELECT * FROM kinesiologia WHERE jugador_id = ? ORDER BY fecha DESC, id DESC",
    )
    .bind(jugador_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(KinesiologyRecord::from).collect())
}

#[instrument]
pub async fn get_kinesiology_record(
    pool: &Pool<Sqlite>,
    id: i64,
) -> Result<KinesiologyRecord, AppError> {
    info!("Fetching kinesiology record");
    let row = sqlx::query_as::<_, DbKinesiologyRecord>("SELECT * FROM kinesiologia WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(record) => Ok(KinesiologyRecord::from(record)),
        _ => Err(AppError::NotFound(
            "Registro de kinesiología no encontrado".to_string(),
        )),
    }
}

#[instrument(skip(pool, data))]
pub async fn create_kinesiology_record(
    pool: &Pool<Sqlite>,
    data: &KinesiologyData,
) -> Result<KinesiologyRecord, AppError> {
    info!("Creating kinesiology record");
    let res = sqlx::query(
        "INSERT INTO kinesiologia (jugador_id, fecha, motivo, tratamiento, observaciones, profesional)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(data.jugador_id)
    .bind(data.fecha)
    .bind(&data.motivo)
    .bind(data.tratamiento.clone().unwrap_or_default())
    .bind(data.observaciones.clone().unwrap_or_default())
    .bind(data.profesional.clone().unwrap_or_default())
    .execute(pool)
    .await?;

    get_kinesiology_record(pool, res.last_insert_rowid()).await
}

#[instrument(skip(pool, data))]
pub async fn update_kinesiology_record(
    pool: &Pool<Sqlite>,
    id: i64,
    data: &KinesiologyData,
) -> Result<KinesiologyRecord, AppError> {
    info!("Updating kinesiology record");
    let res = sqlx::query(
        "UPDATE kinesiologia
         SET jugador_id = ?, fecha = ?, motivo = ?, tratamiento = ?, observaciones = ?, profesional = ?
         WHERE id = ?",
    )
    .bind(data.jugador_id)
    .bind(data.fecha)
    .bind(&data.motivo)
    .bind(data.tratamiento.clone().unwrap_or_default())
    .bind(data.observaciones.clone().unwrap_or_default())
    .bind(data.profesional.clone().unwrap_or_default())
    .bind(id)
    .execute(pool)
    .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(
            "Registro de kinesiología no encontrado".to_string(),
        ));
    }

    get_kinesiology_record(pool, id).await
}

#[instrument]
pub async fn delete_kinesiology_record(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting kinesiology record");
    let res = sqlx::query("DELETE FROM kinesiologia WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(
            "Registro de kinesiología no encontrado".to_string(),
        ));
    }

    Ok(())
}
