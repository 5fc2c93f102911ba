use anyhow::Error;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fmt;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ManageAccounts,
    EditStaff,

    ManagePlayers,
    RecordAttendance,

    ManagePayments,
    ViewLedger,

    ManageKinesiology,

    ViewPlayers,
    ViewStaff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    AdminPrincipal,
    Coach,
    Treasurer,
    Kinesiologist,
}

static COACH_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.insert(Permission::ViewPlayers);
    permissions.insert(Permission::ViewStaff);
    permissions.insert(Permission::ManagePlayers);
    permissions.insert(Permission::RecordAttendance);

    permissions
});

static TREASURER_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.insert(Permission::ViewPlayers);
    permissions.insert(Permission::ViewStaff);
    permissions.insert(Permission::ManagePayments);
    permissions.insert(Permission::ViewLedger);

    permissions
});

static KINESIOLOGIST_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.insert(Permission::ViewPlayers);
    permissions.insert(Permission::ViewStaff);
    permissions.insert(Permission::ManageKinesiology);

    permissions
});

static ADMIN_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.extend(COACH_PERMISSIONS.iter().copied());
    permissions.extend(TREASURER_PERMISSIONS.iter().copied());
    permissions.extend(KINESIOLOGIST_PERMISSIONS.iter().copied());

    permissions.insert(Permission::ManageAccounts);
    permissions.insert(Permission::EditStaff);

    permissions
});

impl Role {
    pub fn permissions(&self) -> &'static HashSet<Permission> {
        match self {
            Role::AdminPrincipal => &ADMIN_PERMISSIONS,
            Role::Coach => &COACH_PERMISSIONS,
            Role::Treasurer => &TREASURER_PERMISSIONS,
            Role::Kinesiologist => &KINESIOLOGIST_PERMISSIONS,
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    pub fn require_permission(&self, permission: Permission) -> Result<(), AppError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            tracing::warn!(
                role = %self.as_str(),
                permission = ?permission,
                "Permission denied"
            );
            Err(AppError::Authorization(
                "No tiene permisos para realizar esta acción".to_string(),
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::AdminPrincipal => "Admin Principal",
            Role::Coach => "DT",
            Role::Treasurer => "Tesorero",
            Role::Kinesiologist => "Kinesiologo",
        }
    }

    /// The stored values are the canonical Spanish club titles; the English
    /// aliases are what older web clients still send.
    pub fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "Admin Principal" => Ok(Role::AdminPrincipal),
            "DT" | "Coach" => Ok(Role::Coach),
            "Tesorero" | "Treasurer" => Ok(Role::Treasurer),
            "Kinesiologo" | "Medico" => Ok(Role::Kinesiologist),
            _ => Err(Error::msg(format!("Unknown role: {}", s))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
