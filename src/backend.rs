#[derive(Debug)]
pub enum FindError {
    NotFound,
    Internal,
}

#[derive(Debug)]
pub enum InsertError {
    Exists,
    Internal,
}

#[cfg(feature = "backend-sql")]
mod backend_sql;
#[cfg(feature = "backend-sql")]
pub use backend_sql::*;

#[cfg(all(feature = "backend-file", not(feature = "backend-sql")))]
mod backend_file;
#[cfg(all(feature = "backend-file", not(feature = "backend-sql")))]
pub use backend_file::*;

#[cfg(not(any(feature = "backend-file", feature = "backend-sql")))]
compile_error!("enable one of the `backend-file` or `backend-sql` features");
