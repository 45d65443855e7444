pub mod fs;
#[cfg(feature = "ssr")]
pub mod session;
