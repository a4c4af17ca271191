pub mod forms;
pub mod session;

pub use forms::{BookForm, GenreForm, LoginForm, RegistrationForm, SearchForm};
pub use session::{Flash, FlashCategory, Role, Session};
