//! Client-side session and task-state synchronization for a REST task backend.
pub mod api;
pub mod app;
pub mod notification;
pub mod session;
pub mod storage;
pub mod store;
pub mod task;

pub use api::{ApiError, Credentials, HttpTaskApi, TaskApi};
pub use app::{AppState, Command, Form, TaskManager};
pub use notification::{Notification, NotificationKind};
pub use session::{Session, SessionController, SessionError};
pub use storage::{ClientStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{Confirmer, StoreError, TaskCache, TaskStoreController};
pub use task::{Priority, Task, TaskDraft, TaskFields, TaskId};
