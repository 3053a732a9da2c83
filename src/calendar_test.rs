use super::*;

#[test]
fn normalize_prefers_title_then_name() {
    let titled = Appointment {
        title: Some("Wartung".into()),
        name: Some("ignored".into()),
        ..Appointment::default()
    };
    assert_eq!(normalize(&titled).title, "Wartung");

    let named = Appointment { name: Some("Rückruf".into()), ..Appointment::default() };
    assert_eq!(normalize(&named).title, "Rückruf");

    assert_eq!(normalize(&Appointment::default()).title, DEFAULT_EVENT_TITLE);
}

#[test]
fn normalize_falls_back_to_date() {
    let appointment = Appointment {
        id: Some(3),
        date: Some("2026-11-02".into()),
        end: Some("2026-11-03".into()),
        ..Appointment::default()
    };
    let event = normalize(&appointment);
    assert_eq!(event.id, Some(3));
    assert_eq!(event.start.as_deref(), Some("2026-11-02"));
    assert_eq!(event.end.as_deref(), Some("2026-11-03"));
}

#[test]
fn normalize_without_any_date() {
    let event = normalize(&Appointment::default());
    assert!(event.start.is_none() && event.end.is_none());
}

#[test]
fn validate_requires_title_and_date() {
    let mut appointment = Appointment { date: Some("2026-11-02".into()), ..Appointment::default() };
    assert_eq!(validate(&appointment), Err(CalendarError::MissingTitle));

    appointment.title = Some("Wartung".into());
    assert_eq!(validate(&appointment), Ok(()));

    appointment.date = Some(String::new());
    assert_eq!(validate(&appointment), Err(CalendarError::MissingDate));
}

#[test]
fn dropped_contact_becomes_draft() {
    let contact = Contact {
        id: Some(12),
        first_name: Some("Max".into()),
        last_name: Some("Meier".into()),
        ..Contact::default()
    };
    let draft = appointment_for_contact(&contact, "2026-11-02");

    assert_eq!(draft.title.as_deref(), Some("Max Meier"));
    assert_eq!(draft.contact.as_deref(), Some("Max Meier"));
    assert_eq!(draft.contact_id.as_deref(), Some("12"));
    assert_eq!(validate(&draft), Ok(()));
}
