//! Log view: Applies the markup pipeline and the stick-to-bottom policy.
//!
//! The view is the single entry point for log content. Each chunk is
//! escaped, colorized, and appended to the surface; the scroll position
//! follows the new bottom only when the viewer was already there, so a
//! reader who has scrolled up into history is never yanked back down.

use super::markup;
use super::surface::Surface;

/// Tolerance, in pixels, for deciding the viewer is at the bottom.
///
/// Fractional layout heights round unevenly; anything within one pixel of
/// the maximum offset counts as bottom.
const SCROLL_SLOP: u32 = 1;

/// Streaming log display over an arbitrary [`Surface`].
#[derive(Debug)]
pub struct LogView<S> {
    /// The surface receiving rendered markup.
    surface: S,
}

impl<S: Surface> LogView<S> {
    /// Create a view over the given surface.
    pub const fn new(surface: S) -> Self {
        Self { surface }
    }

    /// Render one raw log chunk.
    ///
    /// The chunk is escaped and colorized, then appended. An empty chunk
    /// appends nothing visible and leaves the scroll position untouched.
    pub fn render(&mut self, chunk: &str) {
        let markup = markup::to_markup(chunk);

        let was_at_bottom =
            self.surface.max_scroll().saturating_sub(self.surface.scroll_top()) <= SCROLL_SLOP;

        self.surface.append(&markup);

        if was_at_bottom {
            let bottom = self.surface.max_scroll();
            self.surface.scroll_to(bottom);
        }
    }

    /// Get a reference to the underlying surface.
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Get a mutable reference to the underlying surface.
    pub const fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Consume the view, returning the surface.
    pub fn into_surface(self) -> S {
        self.surface
    }
}
