use chrono::{Days, Local, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Appointment, AppointmentStatus};

const APPOINTMENT_COLUMNS: &str =
    "id, patient_name, doctor, date, time, reason, status, created_at, updated_at";

fn now_string() -> String {
    Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string()
}

// ── Appointments ──

pub fn create_appointment(conn: &Connection, appointment: &Appointment) -> anyhow::Result<Appointment> {
    let now = now_string();
    conn.execute(
        "INSERT INTO appointments (patient_name, doctor, date, time, reason, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            appointment.patient_name,
            appointment.doctor,
            appointment.date,
            appointment.time,
            appointment.reason,
            appointment.status.as_str(),
            now,
        ],
    )?;

    Ok(Appointment {
        id: conn.last_insert_rowid(),
        created_at: now.clone(),
        updated_at: now,
        ..appointment.clone()
    })
}

pub fn list_appointments(conn: &Connection) -> anyhow::Result<Vec<Appointment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments ORDER BY created_at DESC, id DESC"
    ))?;

    let rows = stmt.query_map([], parse_appointment_row)?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row?);
    }
    Ok(appointments)
}

pub fn get_appointment(conn: &Connection, id: i64) -> anyhow::Result<Option<Appointment>> {
    let appointment = conn
        .query_row(
            &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
            params![id],
            parse_appointment_row,
        )
        .optional()?;
    Ok(appointment)
}

pub fn update_appointment(conn: &Connection, appointment: &Appointment) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE appointments
         SET patient_name = ?1, doctor = ?2, date = ?3, time = ?4, reason = ?5, status = ?6, updated_at = ?7
         WHERE id = ?8",
        params![
            appointment.patient_name,
            appointment.doctor,
            appointment.date,
            appointment.time,
            appointment.reason,
            appointment.status.as_str(),
            now_string(),
            appointment.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_appointment(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM appointments WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn count_appointments(conn: &Connection) -> anyhow::Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))?;
    Ok(count)
}

pub fn seed_sample_data(conn: &Connection) -> anyhow::Result<usize> {
    if count_appointments(conn)? > 0 {
        return Ok(0);
    }

    let today = Local::now().date_naive();
    let day = |offset: u64| {
        today
            .checked_add_days(Days::new(offset))
            .unwrap_or(today)
            .format("%Y-%m-%d")
            .to_string()
    };

    let samples = [
        ("John Doe", "Dr. Kim", day(0), "10:00", "checkup", AppointmentStatus::Confirmed),
        ("Jane Smith", "Dr. Mercy", day(1), "11:00", "consultation", AppointmentStatus::Pending),
        ("Alex Johnson", "Dr. Lee", day(2), "15:30", "follow-up", AppointmentStatus::Pending),
    ];

    for (patient_name, doctor, date, time, reason, status) in &samples {
        create_appointment(
            conn,
            &Appointment {
                id: 0,
                patient_name: patient_name.to_string(),
                doctor: doctor.to_string(),
                date: date.clone(),
                time: time.to_string(),
                reason: reason.to_string(),
                status: status.clone(),
                created_at: String::new(),
                updated_at: String::new(),
            },
        )?;
    }

    Ok(samples.len())
}

fn parse_appointment_row(row: &rusqlite::Row) -> rusqlite::Result<Appointment> {
    let status: String = row.get(6)?;
    Ok(Appointment {
        id: row.get(0)?,
        patient_name: row.get(1)?,
        doctor: row.get(2)?,
        date: row.get(3)?,
        time: row.get(4)?,
        reason: row.get(5)?,
        status: AppointmentStatus::parse(&status),
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn sample(name: &str) -> Appointment {
        Appointment {
            id: 0,
            patient_name: name.to_string(),
            doctor: "Dr. Kim".to_string(),
            date: "2025-11-04".to_string(),
            time: "16:00".to_string(),
            reason: "checkup".to_string(),
            status: AppointmentStatus::Pending,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_create_and_get() {
        let conn = db::init_db(":memory:").unwrap();
        let saved = create_appointment(&conn, &sample("John Doe")).unwrap();
        assert!(saved.id > 0);
        assert!(!saved.created_at.is_empty());

        let loaded = get_appointment(&conn, saved.id).unwrap().unwrap();
        assert_eq!(loaded.patient_name, "John Doe");
        assert_eq!(loaded.status, AppointmentStatus::Pending);
        assert!(get_appointment(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn test_list_newest_first() {
        let conn = db::init_db(":memory:").unwrap();
        create_appointment(&conn, &sample("First")).unwrap();
        create_appointment(&conn, &sample("Second")).unwrap();
        let all = list_appointments(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].patient_name, "Second");
    }

    #[test]
    fn test_update_and_delete() {
        let conn = db::init_db(":memory:").unwrap();
        let mut saved = create_appointment(&conn, &sample("John Doe")).unwrap();
        saved.status = AppointmentStatus::Confirmed;
        saved.time = "09:00".to_string();
        assert!(update_appointment(&conn, &saved).unwrap());

        let loaded = get_appointment(&conn, saved.id).unwrap().unwrap();
        assert_eq!(loaded.status, AppointmentStatus::Confirmed);
        assert_eq!(loaded.time, "09:00");

        assert!(delete_appointment(&conn, saved.id).unwrap());
        assert!(!delete_appointment(&conn, saved.id).unwrap());
        assert_eq!(count_appointments(&conn).unwrap(), 0);
    }

    #[test]
    fn test_seed_only_when_empty() {
        let conn = db::init_db(":memory:").unwrap();
        assert_eq!(seed_sample_data(&conn).unwrap(), 3);
        assert_eq!(seed_sample_data(&conn).unwrap(), 0);
        assert_eq!(count_appointments(&conn).unwrap(), 3);
    }
}
