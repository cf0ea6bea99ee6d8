//! Mock actors for running the bridge without external collaborators.

pub mod session;
