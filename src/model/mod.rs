//! Domain entities: users, tasks and their input shapes.

mod task;
mod user;

pub use task::{Status, Task, TaskDraft, TaskQuery};
pub use user::{User, UserDraft};
