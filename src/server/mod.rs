pub mod router;

pub use router::{ConsoleState, console_router};
