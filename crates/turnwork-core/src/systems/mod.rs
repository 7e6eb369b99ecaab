//! Systems - logic that operates on components

mod assistants;
mod progress;
mod resume;
mod speed;
mod turn;

pub use assistants::*;
pub use progress::*;
pub use resume::*;
pub use speed::*;
pub use turn::*;
