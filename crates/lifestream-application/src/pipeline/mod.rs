//! Pure pipeline logic, free of ports and I/O.

pub mod blocks;
pub mod chunking;
pub mod markdown;
pub mod synchronize;
