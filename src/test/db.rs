#[cfg(test)]
mod tests {
    use crate::auth::{NewAccount, Role};
    use crate::db::{
        authenticate_account, create_account, delete_kinesiology_record, delete_payment,
        delete_player, create_kinesiology_record, get_all_payments, get_attendance_by_date_type,
        get_attendance_by_player, get_kinesiology_by_player, get_payment_totals, get_player,
        get_staff, get_staff_member, recover_password, submit_attendance,
        update_account_password, update_player, update_staff_member,
    };
    use crate::error::AppError;
    use crate::models::{AttendanceEntry, KinesiologyData, PlayerData, StaffUpdateData};
    use crate::test::utils::test_db::{STANDARD_PASSWORD, TestDbBuilder};

    fn player_data(nombre: &str, dni: &str) -> PlayerData {
        PlayerData {
            nombre: nombre.to_string(),
            apellido: None,
            dni: dni.to_string(),
            fecha_nacimiento: None,
            telefono: None,
            contacto_emergencia_nombre: None,
            contacto_emergencia_tel: None,
            grupo_sanguineo: None,
            alergias: None,
            lesiones: None,
            cirugias: None,
            rama: None,
        }
    }

    #[tokio::test]
    async fn test_authenticate_account_round_trip() {
        let test_db = TestDbBuilder::new()
            .account("gabriela", Role::AdminPrincipal)
            .build()
            .await
            .expect("test db");

        let account = authenticate_account(&test_db.pool, "gabriela", STANDARD_PASSWORD)
            .await
            .expect("login with the registration password");
        assert_eq!(account.usuario, "gabriela");
        assert_eq!(account.rol, Role::AdminPrincipal);
        assert!(account.debe_cambiar_password);

        let err = authenticate_account(&test_db.pool, "gabriela", "wrong-password")
            .await
            .expect_err("wrong password must fail");
        assert!(matches!(err, AppError::Authentication(_)));

        let err = authenticate_account(&test_db.pool, "nobody", STANDARD_PASSWORD)
            .await
            .expect_err("unknown login name must fail");
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_forced_password_change_clears_flag() {
        let test_db = TestDbBuilder::new()
            .account_with_password("dt_lucas", Role::Coach, "clave-inicial-1")
            .build()
            .await
            .expect("test db");
        let id = test_db.account_id("dt_lucas").unwrap();

        update_account_password(&test_db.pool, id, "nueva-clave-9")
            .await
            .expect("password change");

        let err = authenticate_account(&test_db.pool, "dt_lucas", "clave-inicial-1")
            .await
            .expect_err("old password must stop working");
        assert!(matches!(err, AppError::Authentication(_)));

        let account = authenticate_account(&test_db.pool, "dt_lucas", "nueva-clave-9")
            .await
            .expect("new password works");
        assert!(!account.debe_cambiar_password);

        let err = update_account_password(&test_db.pool, 9999, "whatever-1")
            .await
            .expect_err("unknown account id");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_recover_password_requires_both_factors() {
        let test_db = TestDbBuilder::new()
            .account("tesorera_mia", Role::Treasurer)
            .build()
            .await
            .expect("test db");

        // The builder derives correo from the login name and dni from the
        // insertion order.
        let err = recover_password(
            &test_db.pool,
            "tesorera_mia@club.test",
            "99999999",
            "clave-nueva-1",
        )
        .await
        .expect_err("correo alone must not match");
        assert!(matches!(err, AppError::NotFound(_)));

        let err = recover_password(&test_db.pool, "otra@club.test", "30000000", "clave-nueva-1")
            .await
            .expect_err("dni alone must not match");
        assert!(matches!(err, AppError::NotFound(_)));

        let usuario = recover_password(
            &test_db.pool,
            "tesorera_mia@club.test",
            "30000000",
            "clave-nueva-1",
        )
        .await
        .expect("both factors match");
        assert_eq!(usuario, "tesorera_mia");

        let account = authenticate_account(&test_db.pool, "tesorera_mia", "clave-nueva-1")
            .await
            .expect("recovered password works");
        // Recovery does not touch the force-change flag.
        assert!(account.debe_cambiar_password);
    }

    #[tokio::test]
    async fn test_create_account_duplicate_is_conflict() {
        let test_db = TestDbBuilder::new()
            .account("admin", Role::AdminPrincipal)
            .build()
            .await
            .expect("test db");

        let duplicate = NewAccount {
            nombre: "Otro".to_string(),
            apellido: "Admin".to_string(),
            dni: "30000000".to_string(),
            direccion: String::new(),
            telefono: String::new(),
            correo: "otro@club.test".to_string(),
            usuario: "otro_admin".to_string(),
            password: "segura-123".to_string(),
            rol: Role::AdminPrincipal,
        };

        let err = create_account(&test_db.pool, &duplicate)
            .await
            .expect_err("duplicate dni must conflict");
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(test_db.count("usuarios").await, 1);
    }

    #[tokio::test]
    async fn test_player_defaults_and_not_found() {
        let test_db = TestDbBuilder::new().build().await.expect("test db");

        let player = crate::db::create_player(&test_db.pool, &player_data("Ana", "111"))
            .await
            .expect("create player");
        assert_eq!(player.alergias, "Ninguna");
        assert_eq!(player.lesiones, "Ninguna");
        assert_eq!(player.cirugias, "Ninguna");
        assert_eq!(player.rama, "Masculino");
        assert_eq!(player.grupo_sanguineo, None);

        let fetched = get_player(&test_db.pool, player.id).await.expect("fetch");
        assert_eq!(fetched.nombre, "Ana");

        let err = update_player(&test_db.pool, 9999, &player_data("Nadie", "222"))
            .await
            .expect_err("unknown player id");
        assert!(matches!(err, AppError::NotFound(_)));

        let err = delete_player(&test_db.pool, 9999)
            .await
            .expect_err("unknown player id");
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(test_db.count("jugadores").await, 1);
    }

    #[tokio::test]
    async fn test_payment_totals_and_ledger() {
        let test_db = TestDbBuilder::new()
            .player("Ana", "111")
            .player("Bruno", "222")
            .payment("Ana", 5000.0, "2026-03-01", "Marzo")
            .payment("Bruno", 2500.0, "2026-03-05", "Marzo")
            .build()
            .await
            .expect("test db");

        let totals = get_payment_totals(&test_db.pool).await.expect("totals");
        assert_eq!(totals.cantidad, 2);
        assert!((totals.total - 7500.0).abs() < f64::EPSILON);

        let ledger = get_all_payments(&test_db.pool).await.expect("ledger");
        assert_eq!(ledger.len(), 2);
        // Newest first, enriched with the player's name.
        assert_eq!(ledger[0].jugador_nombre, "Bruno");
        assert_eq!(ledger[1].jugador_nombre, "Ana");

        let err = delete_payment(&test_db.pool, 9999)
            .await
            .expect_err("unknown payment id");
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(test_db.count("pagos").await, 2);
    }

    #[tokio::test]
    async fn test_empty_payment_totals() {
        let test_db = TestDbBuilder::new().build().await.expect("test db");

        let totals = get_payment_totals(&test_db.pool).await.expect("totals");
        assert_eq!(totals.cantidad, 0);
        assert_eq!(totals.total, 0.0);
    }

    #[tokio::test]
    async fn test_attendance_upsert_overwrites_status() {
        let test_db = TestDbBuilder::new()
            .player("Ana", "111")
            .attendance("Ana", "2026-03-10", "Fisico", "Presente")
            .build()
            .await
            .expect("test db");
        let jugador_id = test_db.player_id("Ana").unwrap();

        // Same (jugador, fecha, tipo) key with a different status.
        submit_attendance(
            &test_db.pool,
            &[AttendanceEntry {
                jugador_id,
                fecha: "2026-03-10".parse().unwrap(),
                tipo_entrenamiento: "Fisico".to_string(),
                estado: "Ausente".to_string(),
            }],
        )
        .await
        .expect("resubmission");

        assert_eq!(test_db.count("asistencia").await, 1);

        let history = get_attendance_by_player(&test_db.pool, jugador_id)
            .await
            .expect("history");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].estado, "Ausente");
    }

    #[tokio::test]
    async fn test_attendance_batch_is_atomic() {
        let test_db = TestDbBuilder::new()
            .player("Ana", "111")
            .build()
            .await
            .expect("test db");
        let jugador_id = test_db.player_id("Ana").unwrap();

        let entries = vec![
            AttendanceEntry {
                jugador_id,
                fecha: "2026-03-10".parse().unwrap(),
                tipo_entrenamiento: "Fisico".to_string(),
                estado: "Presente".to_string(),
            },
            AttendanceEntry {
                // Unknown player: the FK rejects the row and rolls the whole
                // sheet back.
                jugador_id: 9999,
                fecha: "2026-03-10".parse().unwrap(),
                tipo_entrenamiento: "Fisico".to_string(),
                estado: "Presente".to_string(),
            },
        ];

        let err = submit_attendance(&test_db.pool, &entries)
            .await
            .expect_err("unknown player must fail the batch");
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(test_db.count("asistencia").await, 0);
    }

    #[tokio::test]
    async fn test_attendance_sheet_by_date_and_type() {
        let test_db = TestDbBuilder::new()
            .player("Ana", "111")
            .player("Bruno", "222")
            .attendance("Ana", "2026-03-10", "Fisico", "Presente")
            .attendance("Bruno", "2026-03-10", "Fisico", "Ausente")
            .attendance("Ana", "2026-03-10", "Tecnico", "Presente")
            .attendance("Ana", "2026-03-11", "Fisico", "Justificado")
            .build()
            .await
            .expect("test db");

        let sheet = get_attendance_by_date_type(
            &test_db.pool,
            "2026-03-10".parse().unwrap(),
            "Fisico",
        )
        .await
        .expect("sheet");
        assert_eq!(sheet.len(), 2);
        assert!(sheet.iter().all(|r| r.tipo_entrenamiento == "Fisico"));
    }

    #[tokio::test]
    async fn test_kinesiology_history_and_not_found() {
        let test_db = TestDbBuilder::new()
            .player("Ana", "111")
            .build()
            .await
            .expect("test db");
        let jugador_id = test_db.player_id("Ana").unwrap();

        for (fecha, motivo) in [("2026-02-01", "Esguince de tobillo"), ("2026-03-01", "Control")] {
            create_kinesiology_record(
                &test_db.pool,
                &KinesiologyData {
                    jugador_id,
                    fecha: fecha.parse().unwrap(),
                    motivo: motivo.to_string(),
                    tratamiento: Some("Fisioterapia".to_string()),
                    observaciones: None,
                    profesional: Some("Lic. Suarez".to_string()),
                },
            )
            .await
            .expect("create record");
        }

        let history = get_kinesiology_by_player(&test_db.pool, jugador_id)
            .await
            .expect("history");
        assert_eq!(history.len(), 2);
        // Newest first.
        assert_eq!(history[0].motivo, "Control");

        let err = delete_kinesiology_record(&test_db.pool, 9999)
            .await
            .expect_err("unknown record id");
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(test_db.count("kinesiologia").await, 2);
    }

    #[tokio::test]
    async fn test_staff_projection_and_update() {
        let test_db = TestDbBuilder::new()
            .account("admin", Role::AdminPrincipal)
            .account("kine_laura", Role::Kinesiologist)
            .build()
            .await
            .expect("test db");
        let id = test_db.account_id("kine_laura").unwrap();

        let staff = get_staff(&test_db.pool).await.expect("staff list");
        assert_eq!(staff.len(), 2);

        let member = get_staff_member(&test_db.pool, id).await.expect("member");
        assert_eq!(member.rol, "Kinesiologo");

        let updated = update_staff_member(
            &test_db.pool,
            id,
            &StaffUpdateData {
                nombre: "Laura".to_string(),
                apellido: "Gimenez".to_string(),
                dni: "30000001".to_string(),
                direccion: Some("Av. Siempreviva 742".to_string()),
                telefono: None,
                correo: "kine_laura@club.test".to_string(),
            },
        )
        .await
        .expect("update member");
        assert_eq!(updated.apellido, "Gimenez");
        // Role untouched by the personal-fields update.
        assert_eq!(updated.rol, "Kinesiologo");

        let err = get_staff_member(&test_db.pool, 9999)
            .await
            .expect_err("unknown staff id");
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
