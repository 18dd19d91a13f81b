//! Render demo: Push a canned log sequence through the view and print
//! the resulting transcript.
//!
//! Run with: `cargo run --example render_demo`

use taillight::{LogView, Surface, Transcript};

fn main() {
    // Forty-pixel viewport over ten-pixel lines: four lines visible.
    let mut view = LogView::new(Transcript::new(100, 10, 40));

    let chunks = [
        "starting worker pool\n",
        "\x1b[32mready\x1b[0m listening on :8080\n",
        "\x1b[33mwarn\x1b[0m slow request: GET /search?q=<script>\n",
        "\x1b[31merror\x1b[0m upstream timed out & will retry\n",
        "retrying in 2s\n",
        "\x1b[36mdebug\x1b[0m cache warm, 312 entries\n",
    ];

    for chunk in chunks {
        view.render(chunk);
    }

    for line in view.surface().lines() {
        println!("{line}");
    }

    println!(
        "-- {} lines, scrolled to {}px of {}px --",
        view.surface().len(),
        view.surface().scroll_top(),
        view.surface().max_scroll(),
    );
}
