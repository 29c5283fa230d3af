pub mod address;
pub mod models;
pub mod serde_primitives;
pub mod traits;
