// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drives the engine crates directly, without the provider layer.
//!
//! Shows the raw contracts a host framework integrates against: a
//! `PageLoader` feeding the pager's window, the settle/tick cycle, and the
//! per-page pan arbitration of a zoomable surface.
//!
//! Run:
//! - `cargo run -p understory_pager_demos --example engine_walkthrough`

use kurbo::{Insets, Size, Vec2};
use understory_pager::{EngineParams, PageLoader, PagerEngine, PagerEvent};
use understory_zoomable::{SurfaceParams, ZoomPolicy, ZoomableSurface};

/// Loads "pages" that are just labels; a real host loads rendered views.
struct Labels {
    len: usize,
}

impl PageLoader for Labels {
    type Page = String;

    fn load_page(&mut self, index: usize) -> Option<String> {
        (index < self.len).then(|| format!("page #{index}"))
    }
}

fn main() {
    let mut loader = Labels { len: 30 };
    let mut pager: PagerEngine<String> = PagerEngine::new(EngineParams::default(), 4);
    pager.set_data_len(30);
    pager.set_viewport(320.0, &mut loader);
    drain(&mut pager, &mut loader);

    println!("window around page 4: {:?}", indices(&pager));

    // Drag most of a page forward, flick, settle.
    pager.on_drag_begin();
    pager.on_scroll(pager.scroll_offset() + 230.0);
    let target = pager.on_drag_end(0.9);
    println!("flick released: deceleration targets offset {target}");
    pager.on_scroll(target);
    let settle = pager.scrolling_finished(&mut loader);
    println!(
        "settled on {:?}; window {:?}",
        settle.page_changed,
        indices(&pager)
    );
    drain(&mut pager, &mut loader);

    // One zoomable surface, to show the pan arbitration table.
    let params = SurfaceParams {
        dismiss_enabled: true,
        ..SurfaceParams::default()
    };
    let mut surface = ZoomableSurface::new(5, "element", "rendered", params);
    surface.set_viewport(Size::new(320.0, 690.0), Insets::ZERO);
    surface.update_zoom_policy(ZoomPolicy::Enabled {
        min: 1.0,
        max: 4.0,
        double_tap: understory_zoomable::DoubleTap::Scale(0.5),
    });

    let horizontal = Vec2::new(-14.0, 2.0);
    let vertical = Vec2::new(1.0, -18.0);
    println!(
        "unzoomed: paging-axis pan -> surface keeps it? {} (pager wins); cross-axis -> {}",
        surface.pan_should_begin(horizontal),
        surface.pan_should_begin(vertical),
    );

    surface.on_zoom_begin();
    surface.on_zoom_end(2.0);
    surface.update_state(Vec2::new(160.0, 0.0));
    println!(
        "zoomed mid-content: paging-axis pan stays with the surface? {}",
        surface.pan_should_begin(horizontal),
    );
    surface.update_state(Vec2::new(320.0, 0.0));
    println!(
        "zoomed at the trailing edge: forward pan hands off to the pager? {}",
        !surface.pan_should_begin(horizontal),
    );
}

fn indices(pager: &PagerEngine<String>) -> Vec<usize> {
    pager.window().indices().collect()
}

fn drain(pager: &mut PagerEngine<String>, loader: &mut Labels) {
    for event in pager.tick(loader) {
        match event {
            PagerEvent::PageSettled(index) => println!("  binding write: page {index}"),
            PagerEvent::LoadMore => println!("  load-more requested"),
        }
    }
}
