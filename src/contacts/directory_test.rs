use super::*;

fn contact(first: &str, last: &str, phone: &str, department: &str) -> Contact {
    let field = |v: &str| (!v.is_empty()).then(|| v.to_owned());
    Contact {
        first_name: field(first),
        last_name: field(last),
        phone: field(phone),
        department: field(department),
        ..Contact::default()
    }
}

fn sample() -> Vec<Contact> {
    vec![
        contact("Max", "Meier", "030 111", "IT"),
        contact("Anna", "schulz", "030 222", "Einkauf"),
        contact("Tom", "Krause", "", "IT"),
        contact("Eva", "Albers", "040 333", ""),
    ]
}

fn last_names(contacts: &[&Contact]) -> Vec<String> {
    contacts.iter().filter_map(|c| c.last_name.clone()).collect()
}

#[test]
fn filter_matches_name_phone_and_department() {
    let contacts = sample();
    assert_eq!(last_names(&filter(&contacts, "max m", None)), ["Meier"]);
    assert_eq!(last_names(&filter(&contacts, "222", None)), ["schulz"]);
    assert_eq!(last_names(&filter(&contacts, "einKAUF", None)), ["schulz"]);
    assert_eq!(filter(&contacts, "  ", None).len(), 4);
}

#[test]
fn filter_department_is_exact() {
    let contacts = sample();
    assert_eq!(last_names(&filter(&contacts, "", Some("IT"))), ["Meier", "Krause"]);
    assert_eq!(last_names(&filter(&contacts, "tom", Some("IT"))), ["Krause"]);
    assert!(filter(&contacts, "", Some("it")).is_empty());
    assert_eq!(filter(&contacts, "", Some("")).len(), 4);
}

#[test]
fn sort_is_case_insensitive_last_then_first() {
    let mut contacts = sample();
    contacts.push(contact("Anton", "Meier", "", ""));

    sort_by_name(&mut contacts, SortDirection::Ascending);
    let order: Vec<String> = contacts.iter().map(Contact::full_name).collect();
    assert_eq!(order, ["Eva Albers", "Tom Krause", "Anton Meier", "Max Meier", "Anna schulz"]);

    sort_by_name(&mut contacts, SortDirection::Ascending.toggle());
    assert_eq!(contacts[0].full_name(), "Anna schulz");
}

#[test]
fn sort_works_on_references() {
    let contacts = sample();
    let mut hits = filter(&contacts, "", Some("IT"));
    sort_by_name(&mut hits, SortDirection::Ascending);
    assert_eq!(last_names(&hits), ["Krause", "Meier"]);
}

#[test]
fn departments_unique_in_first_seen_order() {
    assert_eq!(departments(&sample()), ["IT", "Einkauf"]);
}

#[test]
fn favorites_are_capped() {
    let mut contacts: Vec<Contact> = (0..12)
        .map(|i| Contact {
            id: Some(i),
            favorite: Some(true),
            ..Contact::default()
        })
        .collect();
    contacts.push(Contact::default());

    let (favorites, rest) = split_favorites(&contacts);
    assert_eq!(favorites.len(), MAX_FAVORITES);
    assert_eq!(rest.len(), 1);
}

#[test]
fn paginate_clamps_page() {
    let items: Vec<u32> = (1..=17).collect();

    let first = paginate(&items, 1, CONTACTS_PER_PAGE);
    assert_eq!(first.items, &items[..8]);
    assert_eq!(first.total_pages, 3);

    let last = paginate(&items, 9, CONTACTS_PER_PAGE);
    assert_eq!(last.page, 3);
    assert_eq!(last.items, [17]);

    assert_eq!(paginate(&items, 0, CONTACTS_PER_PAGE).page, 1);
}

#[test]
fn paginate_empty_list_has_one_page() {
    let items: Vec<u32> = Vec::new();
    let page = paginate(&items, 4, CONTACTS_PER_PAGE);
    assert_eq!(page.page, 1);
    assert_eq!(page.total_pages, 1);
    assert!(page.items.is_empty());
}

#[test]
fn manual_contact_needs_last_name_and_phone() {
    assert_eq!(validate_manual(&contact("Max", "Meier", "030", "")), Ok(()));
    assert_eq!(
        validate_manual(&contact("Max", " ", "030", "")),
        Err(ContactValidationError::MissingLastName)
    );

    let mobile_only = Contact {
        mobile: Some("0171".into()),
        ..contact("", "Meier", "", "")
    };
    assert_eq!(validate_manual(&mobile_only), Err(ContactValidationError::MissingPhone));
}

#[test]
fn autocomplete_limits_and_ignores_blank() {
    let contacts = sample();
    assert!(autocomplete(&contacts, " ", 5).is_empty());
    assert_eq!(last_names(&autocomplete(&contacts, "a", 2)), ["Meier", "schulz"]);
}
