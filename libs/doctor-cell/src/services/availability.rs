use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_models::auth::User;

use crate::models::{DayAvailability, Doctor, DoctorError, WeeklyAvailability, WEEKDAYS};
use crate::services::doctor::DoctorService;
use crate::services::profile::ensure_owner;

const INVALID_AVAILABILITY: &str =
    "Invalid availability format. Each day must have isAvailable (boolean) and slots (array).";

impl WeeklyAvailability {
    /// Weekday mornings and evenings, Saturday morning, Sunday off.
    pub fn default_schedule() -> Self {
        let weekday = DayAvailability::with_slots(&["09:00 AM - 12:00 PM", "05:00 PM - 08:00 PM"]);
        Self {
            monday: weekday.clone(),
            tuesday: weekday.clone(),
            wednesday: weekday.clone(),
            thursday: weekday.clone(),
            friday: weekday,
            saturday: DayAvailability::with_slots(&["09:00 AM - 12:00 PM"]),
            sunday: DayAvailability::unavailable(),
        }
    }

    /// Lenient read of a stored value. Missing or malformed days become unavailable.
    pub fn normalize(value: &Value) -> Self {
        let day = |key: &str| -> DayAvailability {
            let Some(entry) = value.get(key).filter(|v| v.is_object()) else {
                return DayAvailability::unavailable();
            };

            let slots = entry
                .get("slots")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|s| s.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();

            DayAvailability {
                is_available: entry.get("isAvailable").and_then(Value::as_bool).unwrap_or(false),
                slots,
            }
        };

        Self {
            monday: day("monday"),
            tuesday: day("tuesday"),
            wednesday: day("wednesday"),
            thursday: day("thursday"),
            friday: day("friday"),
            saturday: day("saturday"),
            sunday: day("sunday"),
        }
    }

    /// Strict read of client input: all seven days with a boolean flag and a slot array.
    pub fn parse_strict(value: &Value) -> Result<Self, DoctorError> {
        let well_formed = WEEKDAYS.iter().all(|key| {
            value.get(*key).is_some_and(|day| {
                day.get("isAvailable").is_some_and(Value::is_boolean)
                    && day.get("slots").is_some_and(Value::is_array)
            })
        });

        if !well_formed {
            return Err(DoctorError::Validation(INVALID_AVAILABILITY.to_string()));
        }

        serde_json::from_value(value.clone())
            .map_err(|_| DoctorError::Validation(INVALID_AVAILABILITY.to_string()))
    }
}

/// Stored schedule of a doctor, or the default one when nothing is stored.
pub fn effective_availability(doctor: &Doctor) -> WeeklyAvailability {
    match &doctor.availability {
        Some(value) if !value.is_null() => WeeklyAvailability::normalize(value),
        _ => WeeklyAvailability::default_schedule(),
    }
}

pub struct AvailabilityService {
    doctors: DoctorService,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            doctors: DoctorService::new(config),
        }
    }

    pub async fn get_availability(&self, doctor_id: &str) -> Result<WeeklyAvailability, DoctorError> {
        let doctor = self.doctors.get_doctor(doctor_id).await?;
        debug!("Availability requested for doctor {}", doctor.id);
        Ok(effective_availability(&doctor))
    }

    pub async fn update_availability(
        &self,
        doctor_id: &str,
        user: &User,
        availability: Option<&Value>,
    ) -> Result<WeeklyAvailability, DoctorError> {
        let raw = availability
            .ok_or_else(|| DoctorError::Validation("Availability data is required".to_string()))?;
        let weekly = WeeklyAvailability::parse_strict(raw)?;

        let doctor = self.doctors.get_doctor(doctor_id).await?;
        ensure_owner(&doctor, user, "Access denied. You can only update your own availability.")?;

        let updated = self
            .doctors
            .update_doctor(doctor_id, json!({ "availability": weekly }))
            .await?;

        info!("Availability updated for doctor {}", doctor_id);

        match &updated.availability {
            Some(value) => Ok(WeeklyAvailability::normalize(value)),
            None => {
                warn!("Store returned doctor {} without availability", doctor_id);
                Ok(weekly)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_shape() {
        let weekly = WeeklyAvailability::default_schedule();
        assert_eq!(weekly.monday.slots, vec!["09:00 AM - 12:00 PM", "05:00 PM - 08:00 PM"]);
        assert_eq!(weekly.saturday.slots, vec!["09:00 AM - 12:00 PM"]);
        assert!(!weekly.sunday.is_available);
    }

    #[test]
    fn normalize_fills_missing_days() {
        let weekly = WeeklyAvailability::normalize(&json!({
            "monday": { "isAvailable": true, "slots": ["09:00 AM - 10:00 AM"] },
            "tuesday": "garbage",
            "wednesday": { "isAvailable": true, "slots": "not an array" }
        }));

        assert_eq!(weekly.monday, DayAvailability::with_slots(&["09:00 AM - 10:00 AM"]));
        assert_eq!(weekly.tuesday, DayAvailability::unavailable());
        assert_eq!(weekly.wednesday, DayAvailability { is_available: true, slots: vec![] });
        assert_eq!(weekly.sunday, DayAvailability::unavailable());
    }

    #[test]
    fn strict_parse_requires_every_day() {
        let mut value = serde_json::to_value(WeeklyAvailability::default_schedule()).unwrap();
        assert!(WeeklyAvailability::parse_strict(&value).is_ok());

        value["friday"]["isAvailable"] = json!("yes");
        assert!(matches!(
            WeeklyAvailability::parse_strict(&value),
            Err(DoctorError::Validation(msg)) if msg == INVALID_AVAILABILITY
        ));

        let mut missing = serde_json::to_value(WeeklyAvailability::default_schedule()).unwrap();
        missing.as_object_mut().unwrap().remove("sunday");
        assert!(WeeklyAvailability::parse_strict(&missing).is_err());
    }

    #[test]
    fn serializes_with_camel_case_flag() {
        let value = serde_json::to_value(WeeklyAvailability::default_schedule()).unwrap();
        assert_eq!(value["sunday"], json!({ "isAvailable": false, "slots": [] }));
    }
}
