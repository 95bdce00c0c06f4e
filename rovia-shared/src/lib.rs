pub mod models;
pub mod pii;

pub use pii::Contact;
