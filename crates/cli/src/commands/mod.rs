pub mod health;
pub mod options;
pub mod predict;
