//! Small shared helpers with no workflow semantics of their own.

pub mod ids;
