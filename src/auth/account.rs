use serde::Serialize;

use super::Role;

/// A staff account as the rest of the application sees it. The stored
/// password hash never leaves `db.rs`.
#[derive(Debug, Serialize, Clone)]
pub struct Account {
    pub id: i64,
    pub nombre: String,
    pub apellido: String,
    pub dni: String,
    pub direccion: String,
    pub telefono: String,
    pub correo: String,
    pub usuario: String,
    #[serde(skip)]
    pub rol: Role,
    pub debe_cambiar_password: bool,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbAccount {
    pub id: Option<i64>,
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub dni: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub correo: Option<String>,
    pub usuario: Option<String>,
    pub rol: Option<String>,
    pub debe_cambiar_password: Option<bool>,
}

impl From<DbAccount> for Account {
    fn from(account: DbAccount) -> Self {
        Self {
            id: account.id.unwrap_or_default(),
            nombre: account.nombre.unwrap_or_default(),
            apellido: account.apellido.unwrap_or_default(),
            dni: account.dni.unwrap_or_default(),
            direccion: account.direccion.unwrap_or_default(),
            telefono: account.telefono.unwrap_or_default(),
            correo: account.correo.unwrap_or_default(),
            usuario: account.usuario.unwrap_or_default(),
            rol: Role::from_str(&account.rol.unwrap_or_default()).unwrap(),
            debe_cambiar_password: account.debe_cambiar_password.unwrap_or_default(),
        }
    }
}

/// Everything needed to persist a new account. The password arrives in the
/// clear and is hashed inside the storage layer, never stored as given.
#[derive(Clone)]
pub struct NewAccount {
    pub nombre: String,
    pub apellido: String,
    pub dni: String,
    pub direccion: String,
    pub telefono: String,
    pub correo: String,
    pub usuario: String,
    pub password: String,
    pub rol: Role,
}

/// Staff-directory projection: no login name, no credentials.
#[derive(Debug, Serialize, Clone)]
pub struct StaffMember {
    pub id: i64,
    pub nombre: String,
    pub apellido: String,
    pub dni: String,
    pub direccion: String,
    pub telefono: String,
    pub correo: String,
    pub rol: String,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbStaffMember {
    pub id: Option<i64>,
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub dni: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub correo: Option<String>,
    pub rol: Option<String>,
}

impl From<DbStaffMember> for StaffMember {
    fn from(member: DbStaffMember) -> Self {
        Self {
            id: member.id.unwrap_or_default(),
            nombre: member.nombre.unwrap_or_default(),
            apellido: member.apellido.unwrap_or_default(),
            dni: member.dni.unwrap_or_default(),
            direccion: member.direccion.unwrap_or_default(),
            telefono: member.telefono.unwrap_or_default(),
            correo: member.correo.unwrap_or_default(),
            rol: member.rol.unwrap_or_default(),
        }
    }
}
