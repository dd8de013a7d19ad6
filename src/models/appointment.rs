use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    #[serde(default)]
    pub id: i64,
    pub patient_name: String,
    pub doctor: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Appointment {
    pub fn from_draft(draft: &Draft) -> Self {
        Self {
            id: 0,
            patient_name: draft.patient_name.clone(),
            doctor: draft.doctor.clone(),
            date: draft.date.clone(),
            time: draft.time.clone(),
            reason: draft.reason.clone(),
            status: AppointmentStatus::Pending,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "confirmed" => AppointmentStatus::Confirmed,
            "cancelled" => AppointmentStatus::Cancelled,
            _ => AppointmentStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Draft {
    pub patient_name: String,
    pub doctor: String,
    pub date: String,
    pub time: String,
    pub reason: String,
}

impl Draft {
    pub fn is_empty(&self) -> bool {
        self.patient_name.is_empty()
            && self.doctor.is_empty()
            && self.date.is_empty()
            && self.time.is_empty()
            && self.reason.is_empty()
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Doctor => &self.doctor,
            Field::Date => &self.date,
            Field::Time => &self.time,
            Field::PatientName => &self.patient_name,
            Field::Reason => &self.reason,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Doctor => self.doctor = value,
            Field::Date => self.date = value,
            Field::Time => self.time = value,
            Field::PatientName => self.patient_name = value,
            Field::Reason => self.reason = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Doctor,
    Date,
    Time,
    PatientName,
    Reason,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Doctor,
        Field::Date,
        Field::Time,
        Field::PatientName,
        Field::Reason,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Doctor => "doctor",
            Field::Date => "date",
            Field::Time => "time",
            Field::PatientName => "patient name",
            Field::Reason => "reason",
        }
    }
}
