//! Repositories for database operations

pub mod city;
pub mod default_city;
pub mod user;

pub use city::CityRepository;
pub use default_city::DefaultCityRepository;
pub use user::UserRepository;
