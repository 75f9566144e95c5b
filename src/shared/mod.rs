//! Layout helpers shared by CLI commands.

pub mod table;
