use bookshelf::ShelfError;
use bookshelf::config::Config;
use bookshelf::db::sqlite::contains_pattern;
use bookshelf::service::validation::{validate_book, validate_genre, validate_login};
use bookshelf::types::{BookForm, GenreForm, LoginForm};

#[test]
fn book_fields_are_trimmed() {
    let form = BookForm {
        title: "  Emma ".into(),
        author: " Jane Austen".into(),
        genre: " 1 ".into(),
        year: "1815".into(),
    };
    let book = validate_book(&form).expect("valid");
    assert_eq!(book.title, "Emma");
    assert_eq!(book.author, "Jane Austen");
    assert_eq!(book.genre_id, 1);
    assert_eq!(book.year, 1815);
}

#[test]
fn over_long_fields_are_rejected() {
    let Err(ShelfError::Validation(errors)) = validate_genre(&GenreForm {
        name: "x".repeat(31),
    }) else {
        panic!("expected validation error");
    };
    assert_eq!(
        errors.for_field("name").collect::<Vec<_>>(),
        vec!["Field cannot be longer than 30 characters."]
    );

    let form = BookForm {
        title: "t".repeat(81),
        author: "a".repeat(51),
        genre: "1".into(),
        year: "2000".into(),
    };
    let Err(ShelfError::Validation(errors)) = validate_book(&form) else {
        panic!("expected validation error");
    };
    assert!(errors.has("title"));
    assert!(errors.has("author"));
    assert!(!errors.has("year"));
}

#[test]
fn login_keeps_the_password_verbatim() {
    let creds = validate_login(&LoginForm {
        username: " alice ".into(),
        password: " spaced pw ".into(),
    })
    .expect("valid");
    assert_eq!(creds.username, "alice");
    assert_eq!(creds.password, " spaced pw ");
}

#[test]
fn like_pattern_escapes_wildcards() {
    assert_eq!(contains_pattern("King"), "%King%");
    assert_eq!(contains_pattern("100%"), "%100\\%%");
    assert_eq!(contains_pattern("a_b\\c"), "%a\\_b\\\\c%");
}

#[test]
fn default_config_is_valid() {
    Config::default().validate().expect("defaults validate");
}

#[test]
fn short_session_secret_is_rejected() {
    let mut cfg = Config::default();
    cfg.basic.session_secret = Some("too-short".into());
    assert!(matches!(cfg.validate(), Err(ShelfError::Config(_))));

    cfg.basic.session_secret = Some("s".repeat(64));
    cfg.validate().expect("64 bytes is enough");

    cfg.auth.bcrypt_cost = 2;
    assert!(matches!(cfg.validate(), Err(ShelfError::Config(_))));
}

#[test]
fn login_throttle_settings_must_be_positive() {
    let mut cfg = Config::default();
    cfg.auth.login_attempts = 0;
    assert!(matches!(cfg.validate(), Err(ShelfError::Config(_))));

    let mut cfg = Config::default();
    cfg.auth.login_window_secs = 0;
    assert!(matches!(cfg.validate(), Err(ShelfError::Config(_))));
}
