// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless walkthrough of the media pager: swipe, zoom, load-more, dismiss.
//!
//! This drives the viewer core the way a platform integration layer would,
//! printing the window and callback activity after each interaction.
//!
//! Run:
//! - `cargo run -p understory_pager_demos --example gallery_sim`

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kurbo::{Insets, Point, Size, Vec2};
use understory_media_pager::{LoadMore, PagerBuilder, ViewProvider};

/// Stand-in for a decoded image.
#[derive(Clone, Debug)]
struct Photo {
    name: String,
}

fn main() {
    let photos: Vec<Photo> = (0..12)
        .map(|i| Photo {
            name: format!("photo-{i:02}"),
        })
        .collect();

    let current_page = Rc::new(Cell::new(0_usize));
    let needs_more = Rc::new(Cell::new(false));
    let background = Rc::new(Cell::new(1.0_f64));
    let log = Rc::new(RefCell::new(Vec::<String>::new()));

    let page_binding = current_page.clone();
    let load_flag = needs_more.clone();
    let opacity = background.clone();
    let dismiss_log = log.clone();
    let tap_log = log.clone();

    let config = PagerBuilder::new()
        .zoomable(1.0, 4.0)
        .page_binding(move |page| page_binding.set(page))
        .should_load_more(LoadMore::LastElement { minus: 3 }, move || {
            load_flag.set(true);
        })
        .background_opacity(move |value| opacity.set(value))
        .on_dismiss(move |dismissal| {
            dismiss_log
                .borrow_mut()
                .push(format!("dismissed (suppress host animations: {})", dismissal.suppress_host_animations));
        })
        .on_tap(move || tap_log.borrow_mut().push("tapped".into()))
        .finish();

    let mut viewer = ViewProvider::new(photos, 0, config, |photo: &Photo| {
        format!("<rendered {}>", photo.name)
    });
    viewer.set_viewport(Size::new(390.0, 844.0), Insets::new(0.0, 47.0, 0.0, 34.0));
    let mut clock = 0_u64;
    viewer.tick(clock);

    println!("materialized after first layout: {:?}", window(&viewer));

    // Swipe forward a few pages with decisive flicks.
    for _ in 0..3 {
        clock += 400;
        viewer.pager_drag_begin();
        let offset = viewer.engine().scroll_offset();
        viewer.pager_scroll(offset + 250.0);
        let target = viewer.pager_drag_end(0.8);
        viewer.pager_scroll(target);
        viewer.pager_settled();
        viewer.tick(clock);
        println!(
            "settled on page {} -> window {:?}",
            current_page.get(),
            window(&viewer)
        );
    }

    // Double-tap to zoom in, then toggle back out.
    clock += 400;
    let _ = viewer.surface_tap(Point::new(195.0, 400.0), clock);
    let _ = viewer.surface_tap(Point::new(195.0, 400.0), clock + 120);
    println!(
        "double-tapped: page {} now at scale {:.2}",
        current_page.get(),
        viewer.current_surface().map(|s| s.scale()).unwrap_or(1.0)
    );
    let _ = viewer.surface_tap(Point::new(10.0, 10.0), clock + 600);
    let _ = viewer.surface_tap(Point::new(10.0, 10.0), clock + 720);
    clock += 2_000;
    viewer.tick(clock);

    // Jump near the end; the load-more signal asks for more photos.
    viewer.go_to_page(10, false);
    clock += 16;
    viewer.tick(clock);
    println!(
        "jumped to page {} -> window {:?}",
        current_page.get(),
        window(&viewer)
    );
    if needs_more.get() {
        println!("load-more fired; appending 6 more photos");
        let next = viewer.data().len();
        viewer
            .data_mut()
            .extend((next..next + 6).map(|i| Photo {
                name: format!("photo-{i:02}"),
            }));
        viewer.reload_views();
        clock += 16;
        viewer.tick(clock);
        println!("window after growth: {:?}", window(&viewer));
    }

    // Drag the page down and release hard: commit the dismiss.
    viewer.surface_pan_begin();
    for step in 1..=5 {
        viewer.surface_scroll(Vec2::new(0.0, -30.0 * f64::from(step)));
        println!("dragging down: background opacity {:.2}", background.get());
    }
    if let Some(animation) = viewer.surface_release(-1.6) {
        println!("dismiss committed; host animates for {}ms", animation.duration_ms);
        viewer.finish_dismiss();
    }
    for line in log.borrow().iter() {
        println!("callback: {line}");
    }
}

fn window(
    viewer: &ViewProvider<Vec<Photo>, String, impl FnMut(&Photo) -> String>,
) -> Vec<usize> {
    viewer.engine().window().indices().collect()
}
