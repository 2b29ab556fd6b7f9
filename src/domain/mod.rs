//! Domain types for regexcraft.
//! Plain data: specifications, drafts, refinement logs, match results and rules.

pub mod conversion;
pub mod draft;
pub mod error;
pub mod matching;
pub mod rule;
pub mod session;
pub mod specification;

pub use conversion::*;
pub use draft::*;
pub use error::*;
pub use matching::*;
pub use rule::*;
pub use session::*;
pub use specification::*;
