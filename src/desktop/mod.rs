pub mod backend;
pub mod mock;
pub mod types;
pub mod xdotool;

pub use backend::DesktopBackend;
pub use mock::MockDesktop;
pub use types::{DesktopError, DesktopResult, ScreenCapture, WindowRef};
pub use xdotool::XdotoolBackend;
