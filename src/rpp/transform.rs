//! Transform scripts
//!
//!     A transform script is Rhai code that reads the projection of a source project (`source`)
//!     and of every other loaded project (`others`) and evaluates to the projects it wants to
//!     produce:
//!
//!         let out = source;
//!         out.params[0] = "0.1";
//!         [#{ name: "copy", data: out }]
//!
//!     See [`engine`] for the sandbox and limits, [`helpers`] for the functions scripts can call
//!     and [`catalog`] for the scripts that ship with the crate.

pub mod catalog;
pub mod convert;
pub mod engine;
pub mod helpers;

pub use catalog::TransformScript;
pub use engine::{EngineLimits, TransformEngine, TransformResult, TransformedDocument};
