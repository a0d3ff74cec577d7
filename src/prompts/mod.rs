pub mod portrait;

pub use portrait::{build_system_prompt, build_user_prompt, render_template, TemplateError};
