use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::db::queries;
use crate::models::Appointment;

pub trait AppointmentStore: Send + Sync {
    fn create(&self, appointment: &Appointment) -> anyhow::Result<Appointment>;
    fn list(&self) -> anyhow::Result<Vec<Appointment>>;
    fn get(&self, id: i64) -> anyhow::Result<Option<Appointment>>;
    fn update(&self, appointment: &Appointment) -> anyhow::Result<bool>;
    fn delete(&self, id: i64) -> anyhow::Result<bool>;
}

pub struct SqliteAppointmentStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAppointmentStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn db(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))
    }
}

impl AppointmentStore for SqliteAppointmentStore {
    fn create(&self, appointment: &Appointment) -> anyhow::Result<Appointment> {
        queries::create_appointment(&*self.db()?, appointment)
    }

    fn list(&self) -> anyhow::Result<Vec<Appointment>> {
        queries::list_appointments(&*self.db()?)
    }

    fn get(&self, id: i64) -> anyhow::Result<Option<Appointment>> {
        queries::get_appointment(&*self.db()?, id)
    }

    fn update(&self, appointment: &Appointment) -> anyhow::Result<bool> {
        queries::update_appointment(&*self.db()?, appointment)
    }

    fn delete(&self, id: i64) -> anyhow::Result<bool> {
        queries::delete_appointment(&*self.db()?, id)
    }
}
