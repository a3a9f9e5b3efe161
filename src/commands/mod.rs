pub mod db;
pub mod feedback;
pub mod health;
pub mod logging;
pub mod settings;
