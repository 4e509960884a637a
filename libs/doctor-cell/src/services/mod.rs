pub mod availability;
pub mod doctor;
pub mod profile;
pub mod slots;
