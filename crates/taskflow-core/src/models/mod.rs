//! Wire types exchanged with the TaskFlow backend.
//!
//! - `Task`, `TaskCreate`, `TaskUpdate`: the task board payloads
//! - `User`, `SessionInfo`: profile snapshots
//! - `AuthResponse`, `LoginRequest`, `RegisterRequest`: auth endpoint shapes

pub mod task;
pub mod user;

pub use task::{Task, TaskCreate, TaskUpdate};
pub use user::{AuthResponse, LoginRequest, RegisterRequest, SessionInfo, User};
