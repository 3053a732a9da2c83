//! Calendar view model for appointments (`Termine`).

use serde::Serialize;

use crate::api::types::{Appointment, Contact, non_blank};

/// Title used when an appointment has neither `title` nor `name`.
pub const DEFAULT_EVENT_TITLE: &str = "Termin";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("appointment title is required")]
    MissingTitle,
    #[error("appointment date is required")]
    MissingDate,
}

/// An appointment shaped for a month view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

#[must_use]
pub fn normalize(appointment: &Appointment) -> CalendarEvent {
    let title = non_blank(appointment.title.as_deref())
        .or_else(|| non_blank(appointment.name.as_deref()))
        .unwrap_or(DEFAULT_EVENT_TITLE);
    let date = non_blank(appointment.date.as_deref());

    CalendarEvent {
        id: appointment.id,
        title: title.to_owned(),
        start: non_blank(appointment.start.as_deref()).or(date).map(str::to_owned),
        end: non_blank(appointment.end.as_deref()).or(date).map(str::to_owned),
    }
}

/// Title and date must be present before an appointment is created.
///
/// # Errors
///
/// The first missing field.
pub fn validate(appointment: &Appointment) -> Result<(), CalendarError> {
    if non_blank(appointment.title.as_deref()).is_none() {
        return Err(CalendarError::MissingTitle);
    }
    if non_blank(appointment.date.as_deref()).is_none() {
        return Err(CalendarError::MissingDate);
    }
    Ok(())
}

/// Draft appointment for a contact dropped on a day: titled with the
/// contact's name and linked back by id.
#[must_use]
pub fn appointment_for_contact(contact: &Contact, date: &str) -> Appointment {
    let name = contact.full_name();
    let name = (!name.is_empty()).then_some(name);
    Appointment {
        title: name.clone(),
        date: Some(date.to_owned()),
        contact: name,
        contact_id: contact.id.map(|id| id.to_string()),
        ..Appointment::default()
    }
}

#[cfg(test)]
#[path = "calendar_test.rs"]
mod tests;
