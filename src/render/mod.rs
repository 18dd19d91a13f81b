//! Rendering: From raw log chunks to safely-displayed markup.
//!
//! The pipeline has three stages, each total and order-preserving:
//!
//! 1. [`markup::escape`] — HTML-significant characters become entities
//! 2. [`markup::colorize`] — recognized color markers become span tags
//! 3. [`LogView::render`] — append to a [`Surface`], sticking to the
//!    bottom only if the viewer was already there
//!
//! [`Transcript`] is the bundled in-memory surface; applications with a
//! real view implement [`Surface`] themselves.

pub mod markup;
mod surface;
mod transcript;
mod view;

pub use surface::Surface;
pub use transcript::Transcript;
pub use view::LogView;
