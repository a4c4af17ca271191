mod common;

use axum::http::StatusCode;
use common::{TestClient, spawn_app};

#[tokio::test]
async fn anonymous_index_redirects_to_login_with_message() {
    let (_db, app) = spawn_app("http-anon").await;
    let mut client = TestClient::new(app);

    let resp = client.get("/").await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location.as_deref(), Some("/auth/login"));

    let page = client.get("/auth/login").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("You must be logged in to view the book list"));
    assert!(page.body.contains(r#"class="flash error""#));

    // flashes are shown once
    let again = client.get("/auth/login").await;
    assert!(!again.body.contains("You must be logged in"));
}

#[tokio::test]
async fn register_login_and_browse() {
    let (_db, app) = spawn_app("http-login").await;
    let mut client = TestClient::new(app);

    let resp = client
        .post_form("/auth/register", "username=alice&password=pw&password2=pw")
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location.as_deref(), Some("/auth/login"));

    let resp = client
        .post_form("/auth/login", "username=alice&password=pw")
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location.as_deref(), Some("/"));

    let page = client.get("/").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("You are now logged in"));
    assert!(page.body.contains(r#"<a href="/add">Add book</a>"#));
}

#[tokio::test]
async fn bad_login_uses_the_generic_message() {
    let (_db, app) = spawn_app("http-bad-login").await;
    let mut client = TestClient::new(app);
    client
        .post_form("/auth/register", "username=alice&password=pw&password2=pw")
        .await;

    for body in [
        "username=alice&password=wrong",
        "username=nobody&password=pw",
    ] {
        let resp = client.post_form("/auth/login", body).await;
        assert_eq!(resp.status, StatusCode::SEE_OTHER);
        assert_eq!(resp.location.as_deref(), Some("/auth/login"));
        let page = client.get("/auth/login").await;
        assert!(page.body.contains("Invalid username or password"));
    }

    // still anonymous
    let resp = client.get("/").await;
    assert_eq!(resp.location.as_deref(), Some("/auth/login"));
}

#[tokio::test]
async fn registration_errors_rerender_the_form() {
    let (_db, app) = spawn_app("http-reg-errors").await;
    let mut client = TestClient::new(app);

    let resp = client
        .post_form("/auth/register", "username=alice&password=one&password2=two")
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Field must be equal to password."));
    assert!(resp.body.contains(r#"value="alice""#));
}

#[tokio::test]
async fn non_admin_cannot_add_books() {
    let (db, app) = spawn_app("http-non-admin").await;
    let mut admin = TestClient::new(app.clone());
    admin.sign_in("alice").await;
    let mut user = TestClient::new(app);
    user.sign_in("bob").await;

    let resp = user
        .post_form("/add", "title=Sneaky&author=Bob&genre=1&year=2020")
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location.as_deref(), Some("/"));
    assert!(db.storage.list_books().await.expect("books").is_empty());

    let page = user.get("/").await;
    assert!(page.body.contains("You must be an administrator to add a book"));

    let resp = user.get("/genres").await;
    assert_eq!(resp.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn admin_book_lifecycle() {
    let (db, app) = spawn_app("http-books").await;
    let mut client = TestClient::new(app);
    client.sign_in("alice").await;

    let form = client.get("/add").await;
    assert_eq!(form.status, StatusCode::OK);
    assert!(form.body.contains(">Science Fiction</option>"));

    let resp = client
        .post_form("/add", "title=Dune&author=Frank+Herbert&genre=3&year=1965")
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location.as_deref(), Some("/"));

    let books = db.storage.list_books().await.expect("books");
    assert_eq!(books.len(), 1);
    let id = books[0].book.id;

    let page = client.get("/").await;
    assert!(page.body.contains("Book added successfully!"));
    assert!(page.body.contains("<td>Dune</td><td>Frank Herbert</td><td>1965</td><td>Science Fiction</td>"));

    let edit = client.get(&format!("/update/{id}")).await;
    assert_eq!(edit.status, StatusCode::OK);
    assert!(edit.body.contains(r#"value="Dune""#));

    let resp = client
        .post_form(
            &format!("/update/{id}"),
            "title=Dune+Messiah&author=Frank+Herbert&genre=3&year=1969",
        )
        .await;
    assert_eq!(resp.location.as_deref(), Some("/"));
    let updated = db.storage.get_book(id).await.expect("book");
    assert_eq!(updated.title, "Dune Messiah");
    assert_eq!(updated.year, 1969);

    let resp = client.post_form(&format!("/delete/{id}"), "").await;
    assert_eq!(resp.location.as_deref(), Some("/"));
    assert!(db.storage.list_books().await.expect("books").is_empty());
}

#[tokio::test]
async fn invalid_book_form_is_rerendered_with_errors() {
    let (db, app) = spawn_app("http-book-errors").await;
    let mut client = TestClient::new(app);
    client.sign_in("alice").await;

    let resp = client
        .post_form("/add", "title=&author=Someone&genre=1&year=soon")
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("This field is required."));
    assert!(resp.body.contains("Not a valid integer value."));
    assert!(resp.body.contains(r#"value="Someone""#));
    assert!(db.storage.list_books().await.expect("books").is_empty());
}

#[tokio::test]
async fn unknown_ids_return_404() {
    let (_db, app) = spawn_app("http-404").await;
    let mut client = TestClient::new(app);
    client.sign_in("alice").await;

    let missing = client.get("/update/999").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    // the error page keeps the signed-in navigation
    assert!(missing.body.contains(r#"<a href="/auth/logout">Log out</a>"#));
    assert!(missing.body.contains(r#"<a href="/genres">Genres</a>"#));
    assert!(!missing.body.contains(r#"<a href="/auth/login">Log in</a>"#));
    assert_eq!(
        client.post_form("/delete/999", "").await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        client.get("/update_genre/999").await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        client.post_form("/delete_genre/999", "").await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn referenced_genre_delete_redirects_with_conflict() {
    let (db, app) = spawn_app("http-genre-guard").await;
    let mut client = TestClient::new(app);
    client.sign_in("alice").await;

    let resp = client.post_form("/add_genre", "name=Horror").await;
    assert_eq!(resp.location.as_deref(), Some("/add_genre"));
    let horror = db
        .storage
        .list_genres()
        .await
        .expect("genres")
        .into_iter()
        .find(|g| g.name == "Horror")
        .expect("horror exists");

    client
        .post_form(
            "/add",
            &format!("title=It&author=Stephen+King&genre={}&year=1986", horror.id),
        )
        .await;

    let resp = client
        .post_form(&format!("/delete_genre/{}", horror.id), "")
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location.as_deref(), Some("/genres"));
    let page = client.get("/genres").await;
    assert!(page.body.contains("Cannot delete genre with associated books"));
    assert!(db.storage.get_genre(horror.id).await.is_ok());

    let duplicate = client.post_form("/add_genre", "name=Horror").await;
    assert_eq!(duplicate.location.as_deref(), Some("/add_genre"));
    let page = client.get("/add_genre").await;
    assert!(page.body.contains("Genre &#x27;Horror&#x27; already exists"));
}

#[tokio::test]
async fn search_requires_login_and_shows_results() {
    let (_db, app) = spawn_app("http-search").await;
    let mut client = TestClient::new(app);

    let resp = client.get("/search").await;
    assert_eq!(resp.location.as_deref(), Some("/auth/login"));

    client.sign_in("alice").await;
    client
        .post_form("/add", "title=It&author=Stephen+King&genre=1&year=1986")
        .await;

    let empty = client.get("/search").await;
    assert_eq!(empty.status, StatusCode::OK);
    assert!(!empty.body.contains("<table>"));
    assert!(!empty.body.contains("No books found"));

    let hit = client.post_form("/search", "search_query=King").await;
    assert!(hit.body.contains("<td>It</td>"));

    let miss = client.get("/search?search_query=Tolkien").await;
    assert!(miss.body.contains("No books found matching"));
}

#[tokio::test]
async fn logout_ends_the_session() {
    let (_db, app) = spawn_app("http-logout").await;
    let mut client = TestClient::new(app);
    client.sign_in("alice").await;
    assert_eq!(client.get("/").await.status, StatusCode::OK);

    let resp = client.get("/auth/logout").await;
    assert_eq!(resp.location.as_deref(), Some("/"));

    let resp = client.get("/").await;
    assert_eq!(resp.location.as_deref(), Some("/auth/login"));

    // logging out again is harmless
    let resp = client.get("/auth/logout").await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn forged_session_cookie_is_treated_as_anonymous() {
    let (_db, app) = spawn_app("http-forged").await;
    let mut client = TestClient::new(app);
    client.sign_in("alice").await;

    client.clear_cookies();
    client.set_cookie("bookshelf_session", "eyJ1c2VyX2lkIjoxLCJyb2xlIjoiYWRtaW4ifQ");
    let resp = client.get("/").await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location.as_deref(), Some("/auth/login"));
}
