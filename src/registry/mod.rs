//! Process-wide registries of tracked cities and users.
//!
//! Each registry owns its state behind its own async mutex and persists to
//! its own JSON document after every mutation. Registries are constructed
//! once at startup and handed to the HTTP layer and the background
//! refresher via `Arc` — no ambient globals.

pub mod cities;
pub mod users;

pub use cities::{AddCityOutcome, CityRegistry};
pub use users::{UserError, UserRegistry};
