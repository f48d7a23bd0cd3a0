pub mod backdate;
pub mod date;
pub mod load;
pub mod record;
pub mod summary;
