//! Warehouse access layer.

pub mod db {
    pub use crate::db::*;
}

pub mod loan_storage {
    pub use crate::loan_storage::*;
}
