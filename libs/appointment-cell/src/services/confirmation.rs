use doctor_cell::models::Doctor;

use crate::models::{Appointment, Confirmation};

/// `AP` followed by the last eight characters of the appointment id, so
/// repeated downloads of one appointment carry the same reference.
pub fn reference_for(appointment_id: &str) -> String {
    let compact: Vec<char> = appointment_id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let tail: String = compact[compact.len().saturating_sub(8)..].iter().collect();
    format!("AP{}", tail)
}

pub fn build_confirmation(appointment: &Appointment, doctor: &Doctor) -> Confirmation {
    Confirmation {
        reference: reference_for(&appointment.id),
        doctor_name: doctor.name.clone(),
        doctor_specialty: doctor.specialization.clone(),
        patient_name: appointment.patient_name.clone(),
        patient_email: appointment.patient_email.clone(),
        patient_phone: appointment.patient_phone.clone(),
        appointment_date: appointment.appointment_date,
        formatted_date: appointment.appointment_date.format("%A, %B %-d, %Y").to_string(),
        time: appointment.appointment_time.clone(),
        reason: appointment.reason.clone(),
        status: appointment.status,
        fee: doctor.fee,
        clinic_address: doctor.clinic_address.clone(),
        notes: appointment.notes.clone().filter(|n| !n.trim().is_empty()),
    }
}

pub fn attachment_filename(patient_name: &str) -> String {
    let joined = patient_name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("HealthLink_Appointment_{}.txt", joined)
}

fn display_doctor_name(name: &str) -> String {
    let bare = name.trim().trim_start_matches("Dr.").trim();
    if bare.is_empty() {
        "Not specified".to_string()
    } else {
        format!("Dr. {}", bare)
    }
}

fn or_unspecified(value: &str) -> &str {
    if value.trim().is_empty() {
        "Not specified"
    } else {
        value
    }
}

pub fn render_text(confirmation: &Confirmation) -> String {
    let mut lines = vec![
        "HealthLink".to_string(),
        "Appointment Confirmation".to_string(),
        format!("Appointment ID: {}", confirmation.reference),
        String::new(),
        "Doctor Information".to_string(),
        format!("Doctor:    {}", display_doctor_name(&confirmation.doctor_name)),
        format!("Specialty: {}", or_unspecified(&confirmation.doctor_specialty)),
        String::new(),
        "Patient Information".to_string(),
        format!("Name:  {}", or_unspecified(&confirmation.patient_name)),
        format!("Email: {}", or_unspecified(&confirmation.patient_email)),
        format!("Phone: {}", or_unspecified(&confirmation.patient_phone)),
        String::new(),
        "Appointment Details".to_string(),
        format!("Date:   {}", confirmation.formatted_date),
        format!("Time:   {}", or_unspecified(&confirmation.time)),
        format!("Reason: {}", or_unspecified(&confirmation.reason)),
        format!("Fee:    Rs. {}", confirmation.fee),
    ];

    if let Some(address) = &confirmation.clinic_address {
        lines.push(format!("Clinic: {}", address));
    }
    if let Some(notes) = &confirmation.notes {
        lines.push(format!("Notes:  {}", notes));
    }

    lines.push(String::new());
    lines.push("Please arrive 15 minutes before your scheduled appointment time.".to_string());
    lines.push("To reschedule or cancel, contact us at least 24 hours in advance.".to_string());

    lines.join("\n")
}
