pub mod loader;
pub mod record;
