//! Phonebook contacts.

use serde_json::Value;

use super::client::{HelpToolClient, decode_record};
use super::types::{ApiError, Appointment, Contact};
use crate::contacts::directory;

const CONTACTS_PATH: &str = "/api/contacts";
const PHONEBOOK_PATH: &str = "/api/telefonbuch";
const PHONEBOOK_APPOINTMENTS_PATH: &str = "/api/telefonbuch/termine";

impl HelpToolClient {
    /// Contacts via the legacy `/api/contacts` alias.
    ///
    /// # Errors
    ///
    /// Returns the request or parse error.
    pub async fn list_contacts(&self) -> Result<Vec<Contact>, ApiError> {
        self.get(CONTACTS_PATH).await
    }

    /// # Errors
    ///
    /// Returns the request or parse error.
    pub async fn phonebook(&self) -> Result<Vec<Contact>, ApiError> {
        self.get(PHONEBOOK_PATH).await
    }

    /// Appointments linked to the phonebook calendar.
    ///
    /// # Errors
    ///
    /// Returns the request or parse error.
    pub async fn phonebook_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        self.get(PHONEBOOK_APPOINTMENTS_PATH).await
    }

    /// Add a manually entered contact. Last name and phone are required.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an incomplete contact, or the
    /// request error.
    pub async fn add_contact(&self, contact: &Contact) -> Result<Contact, ApiError> {
        directory::validate_manual(contact).map_err(|e| ApiError::Validation(e.to_string()))?;
        self.post_contact(contact).await
    }

    /// Add contacts one by one, stopping at the first failure.
    ///
    /// Returns the stored records. Contacts are expected to have passed
    /// [`crate::contacts::sniff::importable`] already.
    ///
    /// # Errors
    ///
    /// Returns the first request error; contacts before it stay stored.
    pub async fn import_contacts(&self, contacts: &[Contact]) -> Result<Vec<Contact>, ApiError> {
        let mut stored = Vec::with_capacity(contacts.len());
        for contact in contacts {
            stored.push(self.post_contact(contact).await?);
        }
        tracing::info!(count = stored.len(), "contacts imported");
        Ok(stored)
    }

    async fn post_contact(&self, contact: &Contact) -> Result<Contact, ApiError> {
        let body = serde_json::to_value(contact).map_err(|e| ApiError::Parse(e.to_string()))?;
        decode_record(self.post(PHONEBOOK_PATH, body).await?, "contact")
    }

    /// Merge `changes` into an existing contact.
    ///
    /// # Errors
    ///
    /// Returns the request error, e.g. 404 for an unknown contact.
    pub async fn update_contact(&self, contact_id: i64, changes: Value) -> Result<Contact, ApiError> {
        let path = format!("{PHONEBOOK_PATH}/{contact_id}");
        decode_record(self.put(&path, changes).await?, "contact")
    }

    /// # Errors
    ///
    /// Returns the request error, e.g. 404 for an unknown contact.
    pub async fn delete_contact(&self, contact_id: i64) -> Result<Contact, ApiError> {
        let path = format!("{PHONEBOOK_PATH}/{contact_id}");
        decode_record(self.delete(&path).await?, "contact")
    }
}

#[cfg(test)]
#[path = "contacts_test.rs"]
mod tests;
