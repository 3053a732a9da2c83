//! Phonebook list operations: filter, sort, page, validate.

use std::borrow::Borrow;

use crate::api::types::{Contact, non_blank};

/// Contacts shown per page in the phonebook list.
pub const CONTACTS_PER_PAGE: usize = 8;

/// Favorites shown above the list.
pub const MAX_FAVORITES: usize = 10;

/// Why a manually entered contact was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactValidationError {
    #[error("last name is required")]
    MissingLastName,
    #[error("phone number is required")]
    MissingPhone,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// One page of a list plus where it sits.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based, clamped into `1..=total_pages`.
    pub page: usize,
    pub total_pages: usize,
}

/// Contacts matching a free-text query and an optional exact department.
///
/// The query is matched case-insensitively against "first last", phone,
/// email and department. A blank query matches everything.
#[must_use]
pub fn filter<'a>(contacts: &'a [Contact], query: &str, department: Option<&str>) -> Vec<&'a Contact> {
    let query = query.trim().to_lowercase();
    let department = department.filter(|d| !d.is_empty());

    contacts
        .iter()
        .filter(|contact| department.is_none_or(|d| contact.department.as_deref() == Some(d)))
        .filter(|contact| query.is_empty() || matches_query(contact, &query))
        .collect()
}

fn matches_query(contact: &Contact, query: &str) -> bool {
    if contact.full_name().to_lowercase().contains(query) {
        return true;
    }
    [&contact.phone, &contact.email, &contact.department]
        .into_iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(query))
}

fn sort_key(contact: &Contact) -> String {
    let last = contact.last_name.as_deref().unwrap_or("");
    let first = contact.first_name.as_deref().unwrap_or("");
    format!("{last}, {first}").to_lowercase()
}

/// Sort by `"last, first"`, case-insensitive.
pub fn sort_by_name<C: Borrow<Contact>>(contacts: &mut [C], direction: SortDirection) {
    contacts.sort_by_cached_key(|c| sort_key(c.borrow()));
    if direction == SortDirection::Descending {
        contacts.reverse();
    }
}

/// Unique non-blank departments in first-seen order.
#[must_use]
pub fn departments(contacts: &[Contact]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for department in contacts.iter().filter_map(|c| non_blank(c.department.as_deref())) {
        if !seen.contains(&department) {
            seen.push(department);
        }
    }
    seen
}

/// Favorites (at most [`MAX_FAVORITES`]) and everyone else.
#[must_use]
pub fn split_favorites(contacts: &[Contact]) -> (Vec<&Contact>, Vec<&Contact>) {
    let (mut favorites, rest): (Vec<&Contact>, Vec<&Contact>) =
        contacts.iter().partition(|c| c.favorite == Some(true));
    favorites.truncate(MAX_FAVORITES);
    (favorites, rest)
}

/// Slice out a 1-based page. Out-of-range pages are clamped; an empty list
/// still has one (empty) page.
#[must_use]
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let per_page = per_page.max(1);
    let total_pages = items.len().div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * per_page;
    let end = (start + per_page).min(items.len());
    Page {
        items: &items[start.min(end)..end],
        page,
        total_pages,
    }
}

/// Check a manually entered contact before it is sent.
///
/// # Errors
///
/// Missing last name or missing phone (mobile does not count here).
pub fn validate_manual(contact: &Contact) -> Result<(), ContactValidationError> {
    if non_blank(contact.last_name.as_deref()).is_none() {
        return Err(ContactValidationError::MissingLastName);
    }
    if non_blank(contact.phone.as_deref()).is_none() {
        return Err(ContactValidationError::MissingPhone);
    }
    Ok(())
}

/// Contacts whose "first last" contains `query`, for the appointment
/// contact picker. Blank queries suggest nothing.
#[must_use]
pub fn autocomplete<'a>(contacts: &'a [Contact], query: &str, limit: usize) -> Vec<&'a Contact> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    contacts
        .iter()
        .filter(|c| c.full_name().to_lowercase().contains(&query))
        .take(limit)
        .collect()
}

#[cfg(test)]
#[path = "directory_test.rs"]
mod tests;
