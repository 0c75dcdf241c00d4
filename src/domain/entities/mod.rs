pub mod mini_program_user;
pub mod profile_delta;
pub mod subject;
pub mod user;
