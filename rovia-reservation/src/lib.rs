pub mod confirm;
pub mod dispatcher;
pub mod machine;
pub mod memory;
pub mod models;
pub mod repository;

pub use confirm::ConfirmationOrchestrator;
pub use dispatcher::NotificationDispatcher;
pub use machine::{ReservationError, ReservationFlow};
pub use memory::MemoryReservationStore;
pub use models::{IdentityDetails, Reservation, ReservationStatus, Step, TripDetails};
pub use repository::ReservationRepository;
