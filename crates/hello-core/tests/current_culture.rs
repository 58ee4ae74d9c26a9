//! Installing the process culture. Kept in its own test binary because the
//! culture can be set only once per process.

use std::cmp::Ordering;

use hello_core::{Culture, DisplayModel, Error};

#[test]
fn test_installed_culture_drives_model_ordering() {
    Culture::set_current(Culture::with_locale("sv-SE")).unwrap();
    assert_eq!(Culture::current().name(), "sv-SE");

    let apple = DisplayModel::new("äpple");
    let zebra = DisplayModel::new("zebra");
    assert_eq!(apple.cmp(&zebra), Ordering::Greater);
    assert_eq!(apple.compare_in(&zebra, &Culture::with_locale("de-DE")), Ordering::Less);

    let mut models = vec![apple.clone(), zebra.clone(), DisplayModel::new("banan")];
    models.sort();
    let sorted: Vec<String> = models.iter().map(String::from).collect();
    assert_eq!(sorted, vec!["banan", "zebra", "äpple"]);

    let err = Culture::set_current(Culture::invariant()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperation(_)));
    assert_eq!(Culture::current().name(), "sv-SE");
    assert_eq!(apple.cmp(&zebra), Ordering::Greater);
}
