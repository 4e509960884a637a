use std::cmp::Ordering;

use chrono::{NaiveDate, Utc};
use serde_json::json;
use tracing::{debug, info};

use doctor_cell::models::{DaySlots, Doctor, WeeklyAvailability};
use doctor_cell::services::doctor::DoctorService;
use doctor_cell::services::slots::{available_slots, canonical_label, ClockTime};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_utils::validation::{is_blank, is_valid_email};

use crate::models::{
    parse_appointment_date, Appointment, AppointmentError, AppointmentStatus,
    BookAppointmentRequest, DoctorSummary, PatientAppointment,
};

/// Validated booking ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub doctor_id: String,
    pub date: NaiveDate,
    pub time: ClockTime,
    pub reason: String,
    pub notes: String,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
}

pub fn validate_booking(request: &BookAppointmentRequest) -> Result<NewAppointment, AppointmentError> {
    let required = |value: &Option<String>, message: &str| -> Result<String, AppointmentError> {
        if is_blank(value.as_deref()) {
            Err(AppointmentError::Validation(message.to_string()))
        } else {
            Ok(value.as_deref().unwrap_or_default().trim().to_string())
        }
    };

    let doctor_id = required(&request.doctor_id, "Doctor ID is required")?;
    let date = request
        .appointment_date
        .as_deref()
        .and_then(parse_appointment_date)
        .ok_or_else(|| AppointmentError::Validation("Appointment date is required".to_string()))?;
    let raw_time = required(&request.appointment_time, "Appointment time is required")?;
    let reason = required(&request.reason, "Reason is required")?;
    let patient_name = required(&request.patient_name, "Patient name is required")?;

    let patient_email = request.patient_email.as_deref().unwrap_or_default().trim().to_string();
    if !is_valid_email(&patient_email) {
        return Err(AppointmentError::Validation("Valid email is required".to_string()));
    }

    let time = ClockTime::parse(&raw_time)
        .map_err(|_| AppointmentError::Validation(format!("Invalid appointment time: {}", raw_time)))?;

    Ok(NewAppointment {
        doctor_id,
        date,
        time,
        reason,
        notes: request.notes.clone().unwrap_or_default(),
        patient_name,
        patient_email,
        patient_phone: request.patient_phone.clone().unwrap_or_default(),
    })
}

/// Date first, then time of day. Unparseable times sort after parseable ones.
pub fn compare_appointments(a: &Appointment, b: &Appointment) -> Ordering {
    let time_key = |appt: &Appointment| ClockTime::parse(&appt.appointment_time).ok();

    a.appointment_date
        .cmp(&b.appointment_date)
        .then_with(|| match (time_key(a), time_key(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.appointment_time.cmp(&b.appointment_time),
        })
}

/// The store's unique index on live bookings rejects a slot claimed since the check.
fn booking_insert_error(e: anyhow::Error) -> AppointmentError {
    if e.to_string().starts_with("Conflict") {
        AppointmentError::SlotTaken
    } else {
        AppointmentError::from(e)
    }
}

pub struct AppointmentService {
    supabase: SupabaseClient,
    doctors: DoctorService,
}

impl AppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            doctors: DoctorService::new(config),
        }
    }

    pub async fn book(&self, request: &BookAppointmentRequest) -> Result<Appointment, AppointmentError> {
        let booking = validate_booking(request)?;
        self.doctors.get_doctor(&booking.doctor_id).await?;

        let label = booking.time.label();
        let booked = self.booked_labels(&booking.doctor_id, booking.date).await?;
        if booked.contains(&label) {
            debug!("Slot {} on {} already taken for doctor {}", label, booking.date, booking.doctor_id);
            return Err(AppointmentError::SlotTaken);
        }

        let row = json!({
            "doctor_id": booking.doctor_id,
            "patient_name": booking.patient_name,
            "patient_email": booking.patient_email,
            "patient_phone": booking.patient_phone,
            "appointment_date": booking.date,
            "appointment_time": label,
            "reason": booking.reason,
            "notes": booking.notes,
            "status": AppointmentStatus::Scheduled,
            "created_at": Utc::now().to_rfc3339()
        });

        let appointment: Appointment = self.supabase
            .insert("appointments", row)
            .await
            .map_err(booking_insert_error)?;
        info!("Appointment {} booked with doctor {}", appointment.id, appointment.doctor_id);

        Ok(appointment)
    }

    /// Canonical labels of the non-cancelled bookings for a doctor on one date.
    pub async fn booked_labels(&self, doctor_id: &str, date: NaiveDate) -> Result<Vec<String>, AppointmentError> {
        let query = format!(
            "doctor_id=eq.{}&appointment_date=eq.{}&status=neq.cancelled",
            urlencoding::encode(doctor_id),
            date
        );
        let appointments: Vec<Appointment> = self.supabase.select("appointments", &query).await?;

        Ok(appointments
            .iter()
            .map(|a| canonical_label(&a.appointment_time))
            .collect())
    }

    pub async fn available_slots(&self, doctor_id: &str, date: &str) -> Result<DaySlots, AppointmentError> {
        let date = parse_appointment_date(date).ok_or(AppointmentError::InvalidDate)?;
        let doctor = self.doctors.get_doctor(doctor_id).await?;

        let Some(weekly) = stored_availability(&doctor) else {
            debug!("Doctor {} has no availability set", doctor_id);
            return Ok(DaySlots::default());
        };

        let booked = self.booked_labels(doctor_id, date).await?;
        Ok(available_slots(&weekly, date, &booked))
    }

    pub async fn is_slot_free(&self, doctor_id: &str, date: &str, time: &str) -> Result<bool, AppointmentError> {
        let date = parse_appointment_date(date).ok_or(AppointmentError::InvalidDate)?;
        let booked = self.booked_labels(doctor_id, date).await?;
        Ok(!booked.contains(&canonical_label(time)))
    }

    pub async fn doctor_appointments(&self, doctor_id: &str) -> Result<Vec<Appointment>, AppointmentError> {
        self.doctors.get_doctor(doctor_id).await?;

        let query = format!("doctor_id=eq.{}", urlencoding::encode(doctor_id));
        let mut appointments: Vec<Appointment> = self.supabase.select("appointments", &query).await?;
        appointments.sort_by(compare_appointments);

        Ok(appointments)
    }

    pub async fn patient_appointments(&self, patient_email: &str) -> Result<Vec<PatientAppointment>, AppointmentError> {
        let query = format!("patient_email=eq.{}", urlencoding::encode(patient_email));
        let mut appointments: Vec<Appointment> = self.supabase.select("appointments", &query).await?;
        appointments.sort_by(compare_appointments);

        let doctors = self.doctor_summaries(&appointments).await?;

        Ok(appointments
            .into_iter()
            .map(|appointment| {
                let doctor = doctors.iter().find(|d| d.id == appointment.doctor_id).cloned();
                PatientAppointment { appointment, doctor }
            })
            .collect())
    }

    pub async fn get_appointment(&self, appointment_id: &str) -> Result<Appointment, AppointmentError> {
        let query = format!("id=eq.{}", urlencoding::encode(appointment_id));
        self.supabase
            .select_one("appointments", &query)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn update_status(&self, appointment_id: &str, status: Option<&str>) -> Result<Appointment, AppointmentError> {
        let status = status
            .and_then(AppointmentStatus::parse)
            .ok_or(AppointmentError::InvalidStatus)?;

        self.get_appointment(appointment_id).await?;

        let filter = format!("id=eq.{}", urlencoding::encode(appointment_id));
        let updated = self
            .supabase
            .update("appointments", &filter, json!({ "status": status }))
            .await?
            .ok_or(AppointmentError::NotFound)?;

        info!("Appointment {} status set to {}", appointment_id, status);
        Ok(updated)
    }

    /// Appointment together with the doctor it was booked with.
    pub async fn appointment_with_doctor(&self, appointment_id: &str) -> Result<(Appointment, Doctor), AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;
        let doctor = self.doctors.get_doctor(&appointment.doctor_id).await?;
        Ok((appointment, doctor))
    }

    async fn doctor_summaries(&self, appointments: &[Appointment]) -> Result<Vec<DoctorSummary>, AppointmentError> {
        let mut ids: Vec<&str> = appointments.iter().map(|a| a.doctor_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let id_list = ids
            .iter()
            .map(|id| format!("\"{}\"", id))
            .collect::<Vec<_>>()
            .join(",");
        let query = format!(
            "select=id,name,specialization,profile&id=in.({})",
            urlencoding::encode(&id_list)
        );

        Ok(self.supabase.select("doctors", &query).await?)
    }
}

fn stored_availability(doctor: &Doctor) -> Option<WeeklyAvailability> {
    doctor
        .availability
        .as_ref()
        .filter(|value| value.is_object())
        .map(WeeklyAvailability::normalize)
}
