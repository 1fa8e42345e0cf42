pub mod board;
pub mod health;
