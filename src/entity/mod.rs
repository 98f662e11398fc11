pub mod events;
pub mod readings;
pub mod settings;
