pub mod abstracts;
pub mod event;
pub mod file;
pub mod log;
pub mod review;
pub mod track;
pub mod user;
