#[cfg(test)]
pub mod test_db {
    use crate::auth::{NewAccount, Role};
    use crate::db::{create_account, create_payment, create_player, submit_attendance};
    use crate::error::AppError;
    use crate::models::{AttendanceEntry, PaymentData, PlayerData};
    use crate::storage::DocumentStore;
    use chrono::NaiveDate;
    use rocket::local::asynchronous::Client;
    use sqlx::{Pool, Sqlite, sqlite::SqlitePoolOptions};
    use std::collections::HashMap;
    use std::sync::Once;
    use tracing::log::LevelFilter;
    use uuid::Uuid;

    static INIT: Once = Once::new();
    pub static STANDARD_PASSWORD: &str = "password123";

    pub struct TestAccount {
        pub usuario: String,
        pub rol: Role,
        pub password: String,
    }

    pub struct TestPlayer {
        pub nombre: String,
        pub dni: String,
    }

    pub struct TestPayment {
        pub player_nombre: String,
        pub monto: f64,
        pub fecha_pago: NaiveDate,
        pub mes_correspondiente: String,
    }

    pub struct TestAttendance {
        pub player_nombre: String,
        pub fecha: NaiveDate,
        pub tipo_entrenamiento: String,
        pub estado: String,
    }

    #[derive(Default)]
    pub struct TestDbBuilder {
        accounts: Vec<TestAccount>,
        players: Vec<TestPlayer>,
        payments: Vec<TestPayment>,
        attendance: Vec<TestAttendance>,
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn account(mut self, usuario: &str, rol: Role) -> Self {
            self.accounts.push(TestAccount {
                usuario: usuario.to_string(),
                rol,
                password: STANDARD_PASSWORD.to_string(),
            });
            self
        }

        pub fn account_with_password(mut self, usuario: &str, rol: Role, password: &str) -> Self {
            self.accounts.push(TestAccount {
                usuario: usuario.to_string(),
                rol,
                password: password.to_string(),
            });
            self
        }

        pub fn player(mut self, nombre: &str, dni: &str) -> Self {
            self.players.push(TestPlayer {
                nombre: nombre.to_string(),
                dni: dni.to_string(),
            });
            self
        }

        pub fn payment(mut self, player_nombre: &str, monto: f64, fecha: &str, mes: &str) -> Self {
            self.payments.push(TestPayment {
                player_nombre: player_nombre.to_string(),
                monto,
                fecha_pago: fecha.parse().expect("valid fecha_pago in fixture"),
                mes_correspondiente: mes.to_string(),
            });
            self
        }

        pub fn attendance(
            mut self,
            player_nombre: &str,
            fecha: &str,
            tipo_entrenamiento: &str,
            estado: &str,
        ) -> Self {
            self.attendance.push(TestAttendance {
                player_nombre: player_nombre.to_string(),
                fecha: fecha.parse().expect("valid fecha in fixture"),
                tipo_entrenamiento: tipo_entrenamiento.to_string(),
                estado: estado.to_string(),
            });
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            INIT.call_once(|| {
                let _ = env_logger::builder()
                    .filter_level(LevelFilter::Debug)
                    .is_test(true)
                    .try_init();
            });

            // One connection: pooled in-memory SQLite databases are per
            // connection, so a larger pool would migrate only one of them.
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect("sqlite::memory:")
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;

            let mut account_ids: HashMap<String, i64> = HashMap::new();
            let mut player_ids: HashMap<String, i64> = HashMap::new();

            for (index, account) in self.accounts.iter().enumerate() {
                let created = create_account(
                    &pool,
                    &NewAccount {
                        nombre: account.usuario.clone(),
                        apellido: "Test".to_string(),
                        dni: format!("3{:07}", index),
                        direccion: String::new(),
                        telefono: String::new(),
                        correo: format!("{}@club.test", account.usuario),
                        usuario: account.usuario.clone(),
                        password: account.password.clone(),
                        rol: account.rol,
                    },
                )
                .await?;

                account_ids.insert(account.usuario.clone(), created.id);
            }

            for player in &self.players {
                let created = create_player(
                    &pool,
                    &PlayerData {
                        nombre: player.nombre.clone(),
                        apellido: None,
                        dni: player.dni.clone(),
                        fecha_nacimiento: None,
                        telefono: None,
                        contacto_emergencia_nombre: None,
                        contacto_emergencia_tel: None,
                        grupo_sanguineo: None,
                        alergias: None,
                        lesiones: None,
                        cirugias: None,
                        rama: None,
                    },
                )
                .await?;

                player_ids.insert(player.nombre.clone(), created.id);
            }

            for payment in &self.payments {
                let jugador_id = player_ids[&payment.player_nombre];
                create_payment(
                    &pool,
                    &PaymentData {
                        jugador_id,
                        fecha_pago: payment.fecha_pago,
                        mes_correspondiente: payment.mes_correspondiente.clone(),
                        monto: payment.monto,
                        metodo: None,
                        observaciones: None,
                    },
                )
                .await?;
            }

            if !self.attendance.is_empty() {
                let entries: Vec<AttendanceEntry> = self
                    .attendance
                    .iter()
                    .map(|a| AttendanceEntry {
                        jugador_id: player_ids[&a.player_nombre],
                        fecha: a.fecha,
                        tipo_entrenamiento: a.tipo_entrenamiento.clone(),
                        estado: a.estado.clone(),
                    })
                    .collect();

                submit_attendance(&pool, &entries).await?;
            }

            Ok(TestDb {
                pool,
                account_ids,
                player_ids,
            })
        }
    }

    pub struct TestDb {
        pub pool: Pool<Sqlite>,
        pub account_ids: HashMap<String, i64>,
        pub player_ids: HashMap<String, i64>,
    }

    impl TestDb {
        pub fn account_id(&self, usuario: &str) -> Option<i64> {
            self.account_ids.get(usuario).copied()
        }

        pub fn player_id(&self, nombre: &str) -> Option<i64> {
            self.player_ids.get(nombre).copied()
        }

        pub async fn count(&self, table: &str) -> i64 {
            let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
                .fetch_one(&self.pool)
                .await
                .expect("count query");
            row.0
        }
    }

    pub fn temp_document_store() -> DocumentStore {
        let root = std::env::temp_dir().join(format!("club-admin-test-{}", Uuid::new_v4().simple()));
        DocumentStore::new(root).expect("temp uploads dir")
    }

    pub async fn setup_test_client(test_db: &TestDb) -> Client {
        let rocket = crate::init_rocket(test_db.pool.clone(), temp_document_store()).await;

        Client::tracked(rocket).await.expect("valid rocket instance")
    }
}
