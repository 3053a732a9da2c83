//! Calendar appointments (`Termine`).

use super::client::{HelpToolClient, decode_record};
use super::types::{ApiError, Appointment};
use crate::calendar::{self, CalendarEvent};

const APPOINTMENTS_PATH: &str = "/api/termine";

impl HelpToolClient {
    /// # Errors
    ///
    /// Returns the request or parse error.
    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        self.get(APPOINTMENTS_PATH).await
    }

    /// Create an appointment. Title and date are required.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when title or date is missing, or the
    /// request error.
    pub async fn create_appointment(&self, appointment: &Appointment) -> Result<Appointment, ApiError> {
        calendar::validate(appointment).map_err(|e| ApiError::Validation(e.to_string()))?;
        let body = serde_json::to_value(appointment).map_err(|e| ApiError::Parse(e.to_string()))?;
        decode_record(self.post(APPOINTMENTS_PATH, body).await?, "termin")
    }

    /// Calendar events from the phonebook calendar, falling back to
    /// `/api/termine` when that endpoint fails.
    ///
    /// # Errors
    ///
    /// Returns the fallback's error when both endpoints fail.
    pub async fn calendar_events(&self) -> Result<Vec<CalendarEvent>, ApiError> {
        let appointments = match self.phonebook_appointments().await {
            Ok(appointments) => appointments,
            Err(e) => {
                tracing::warn!(error = %e, "phonebook appointments failed, using /api/termine");
                self.list_appointments().await?
            }
        };
        Ok(appointments.iter().map(calendar::normalize).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{MockTransport, client_with};
    use reqwest::Method;
    use serde_json::json;

    #[tokio::test]
    async fn create_appointment_posts_bare_record() {
        let mock = MockTransport::new();
        mock.respond(
            Method::POST,
            "/api/termine",
            201,
            json!({ "id": 5, "title": "Wartung", "date": "2026-11-02", "created_at": "2026-10-18T09:00:00Z" }),
        );
        let client = client_with(&mock);

        let draft = Appointment {
            title: Some("Wartung".into()),
            date: Some("2026-11-02".into()),
            contact: Some("Max Meier".into()),
            ..Appointment::default()
        };
        let stored = client.create_appointment(&draft).await.unwrap();

        assert_eq!(stored.id, Some(5));
        assert_eq!(
            mock.last_body(),
            Some(json!({ "title": "Wartung", "date": "2026-11-02", "contact": "Max Meier" }))
        );
    }

    #[tokio::test]
    async fn create_appointment_requires_date() {
        let mock = MockTransport::new();
        let client = client_with(&mock);

        let draft = Appointment { title: Some("Wartung".into()), ..Appointment::default() };
        assert!(matches!(client.create_appointment(&draft).await, Err(ApiError::Validation(_))));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn calendar_events_fall_back_to_termine() {
        let mock = MockTransport::new();
        mock.respond(Method::GET, "/api/telefonbuch/termine", 500, json!({ "error": "db locked" }));
        mock.respond(
            Method::GET,
            "/api/termine",
            200,
            json!([{ "id": 1, "name": "Rückruf", "date": "2026-11-02" }]),
        );
        let client = client_with(&mock);

        let events = client.calendar_events().await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Rückruf");
        assert_eq!(events[0].end.as_deref(), Some("2026-11-02"));
    }
}
