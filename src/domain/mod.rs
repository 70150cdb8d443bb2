pub mod donor;
pub mod pledge;
pub mod donation;
pub mod cycle;
pub mod overview;
pub mod impact_story;

pub use donor::*;
pub use pledge::*;
pub use donation::*;
pub use cycle::*;
pub use overview::*;
pub use impact_story::*;
