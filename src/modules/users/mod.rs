pub mod admin_controller;
pub mod controller;
pub mod model;
pub mod router;
pub mod service;
