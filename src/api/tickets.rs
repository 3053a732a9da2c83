//! Helpdesk tickets.

use serde_json::Value;

use super::client::{HelpToolClient, decode_record};
use super::types::{ApiError, DEFAULT_TICKET_STATUS, Ticket};

const TICKETS_PATH: &str = "/api/tickets";

impl HelpToolClient {
    /// # Errors
    ///
    /// Returns the request or parse error.
    pub async fn list_tickets(&self) -> Result<Vec<Ticket>, ApiError> {
        self.get(TICKETS_PATH).await
    }

    /// Create a ticket. A missing status is sent as `Offen`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a ticket without title, or the
    /// request error.
    pub async fn create_ticket(&self, ticket: &Ticket) -> Result<Ticket, ApiError> {
        if ticket.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
            return Err(ApiError::Validation("ticket title is required".to_owned()));
        }
        let mut ticket = ticket.clone();
        if ticket.status.is_none() {
            ticket.status = Some(DEFAULT_TICKET_STATUS.to_owned());
        }
        let body = serde_json::to_value(&ticket).map_err(|e| ApiError::Parse(e.to_string()))?;
        decode_record(self.post(TICKETS_PATH, body).await?, "ticket")
    }

    /// Merge `changes` into an existing ticket.
    ///
    /// # Errors
    ///
    /// Returns the request error, e.g. 404 for an unknown ticket.
    pub async fn update_ticket(&self, ticket_id: i64, changes: Value) -> Result<Ticket, ApiError> {
        let path = format!("{TICKETS_PATH}/{ticket_id}");
        decode_record(self.put(&path, changes).await?, "ticket")
    }

    /// Delete a ticket and return the removed record when the backend echoes it.
    ///
    /// # Errors
    ///
    /// Returns the request error, e.g. 404 for an unknown ticket.
    pub async fn delete_ticket(&self, ticket_id: i64) -> Result<Option<Ticket>, ApiError> {
        let path = format!("{TICKETS_PATH}/{ticket_id}");
        let mut body = self.delete(&path).await?;
        match body.get_mut("deleted_ticket") {
            Some(deleted) if deleted.is_object() => decode_record(deleted.take(), "ticket").map(Some),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "tickets_test.rs"]
mod tests;
