pub mod display;
pub mod health;
