pub mod certificates;
pub mod courses;
pub mod progress;
pub mod users;
pub mod verification;
