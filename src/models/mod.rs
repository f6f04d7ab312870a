mod user;
mod forms;
mod project;

pub use user::{PasswordSecret, UserRecord};
pub use forms::{LoginForm, RegisterForm, ProjectForm, ProgressForm, Notice};
pub use project::{NewProject, ProjectRecord};
