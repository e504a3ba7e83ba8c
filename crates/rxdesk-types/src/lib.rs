//! Data types shared by the rxdesk client and its front ends.

pub mod session;
pub mod wire;

pub use session::{Role, Session};
