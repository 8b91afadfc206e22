// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end behavior of the provider over the pager and zoom crates.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kurbo::{Insets, Point, Size, Vec2};

use understory_media_pager::{
    Axis, Edge, LoadMore, PagerBuilder, PagerConfig, ViewProvider,
};

type Viewer = ViewProvider<Vec<usize>, usize, Box<dyn FnMut(&usize) -> usize>>;

/// 300pt-wide pages, 600pt tall viewport, no spacing.
fn viewer(len: usize, initial: usize, config: PagerConfig<usize>) -> Viewer {
    let data: Vec<usize> = (0..len).collect();
    let render: Box<dyn FnMut(&usize) -> usize> = Box::new(|element| element * 10);
    let mut viewer = ViewProvider::new(data, initial, config, render);
    viewer.set_viewport(Size::new(300.0, 600.0), Insets::ZERO);
    viewer.tick(0);
    viewer
}

fn window_indices(viewer: &Viewer) -> Vec<usize> {
    viewer.engine().window().indices().collect()
}

fn swipe_to_neighbor(viewer: &mut Viewer, forward: bool) {
    viewer.pager_drag_begin();
    let offset = viewer.engine().scroll_offset();
    let delta = if forward { 200.0 } else { -200.0 };
    viewer.pager_scroll(offset + delta);
    let velocity = if forward { 0.7 } else { -0.7 };
    let target = viewer.pager_drag_end(velocity);
    viewer.pager_scroll(target);
    viewer.pager_settled();
    viewer.tick(16);
}

#[test]
fn window_is_exactly_the_preload_range() {
    let mut viewer = viewer(100, 50, PagerConfig::default());
    assert_eq!(window_indices(&viewer), [47, 48, 49, 50, 51, 52, 53]);

    swipe_to_neighbor(&mut viewer, true);
    assert_eq!(viewer.current_index(), 51);
    assert_eq!(window_indices(&viewer), [48, 49, 50, 51, 52, 53, 54]);

    swipe_to_neighbor(&mut viewer, false);
    assert_eq!(viewer.current_index(), 50);
    assert_eq!(window_indices(&viewer), [47, 48, 49, 50, 51, 52, 53]);
}

#[test]
fn go_to_page_updates_index_and_binding() {
    let reported = Rc::new(Cell::new(usize::MAX));
    let binding = reported.clone();
    let config = PagerBuilder::new()
        .page_binding(move |page| binding.set(page))
        .finish();
    let mut viewer = viewer(100, 0, config);

    viewer.go_to_page(70, false);
    viewer.tick(16);
    assert_eq!(viewer.current_index(), 70);
    assert_eq!(reported.get(), 70);
    assert_eq!(window_indices(&viewer), [67, 68, 69, 70, 71, 72, 73]);
}

#[test]
fn out_of_range_jumps_are_clamped() {
    let mut viewer = viewer(10, 5, PagerConfig::default());

    viewer.go_to_page(-5, false);
    viewer.tick(16);
    assert_eq!(viewer.current_index(), 0);

    viewer.go_to_page(15, false);
    viewer.tick(16);
    assert_eq!(viewer.current_index(), 9);
}

#[test]
fn overscroll_end_fires_exactly_once_per_gesture() {
    let ends = Rc::new(Cell::new(0_u32));
    let counter = ends.clone();
    let config = PagerBuilder::new()
        .overscroll(move |edge| {
            if edge == Edge::End {
                counter.set(counter.get() + 1);
            }
        })
        .finish();
    let mut viewer = viewer(10, 9, config);
    let resting = viewer.engine().scroll_offset();

    viewer.pager_drag_begin();
    viewer.pager_scroll(resting + 20.0); // under the 0.15 * 300 threshold
    assert_eq!(ends.get(), 0);
    viewer.pager_scroll(resting + 60.0);
    assert_eq!(ends.get(), 1);
    viewer.pager_scroll(resting + 90.0); // still the same gesture
    assert_eq!(ends.get(), 1);

    viewer.pager_drag_begin();
    viewer.pager_scroll(resting + 60.0);
    assert_eq!(ends.get(), 2);
}

#[test]
fn dismiss_requires_both_offset_and_velocity() {
    let dismissed = Rc::new(Cell::new(0_u32));
    let opacity = Rc::new(Cell::new(1.0_f64));
    let dismiss_counter = dismissed.clone();
    let opacity_binding = opacity.clone();
    let config = PagerBuilder::new()
        .on_dismiss(move |_| dismiss_counter.set(dismiss_counter.get() + 1))
        .background_opacity(move |value| opacity_binding.set(value))
        .finish();
    let mut viewer = viewer(10, 5, config);

    // Below the trigger offset: never dismisses, regardless of speed.
    viewer.surface_pan_begin();
    viewer.surface_scroll(Vec2::new(0.0, -30.0)); // -0.05 of the 600pt page
    assert_eq!(viewer.surface_release(-1.5), None);
    assert_eq!(dismissed.get(), 0);

    // Past both thresholds: dismisses exactly once, opacity driven to 0.
    viewer.surface_pan_begin();
    viewer.surface_scroll(Vec2::new(0.0, -90.0)); // -0.15
    let animation = viewer.surface_release(-1.5).expect("dismiss should commit");
    assert_eq!(animation.duration_ms, 200);
    viewer.finish_dismiss();
    assert_eq!(dismissed.get(), 1);
    assert_eq!(opacity.get(), 0.0);

    // Terminal: nothing re-fires.
    viewer.finish_dismiss();
    assert_eq!(viewer.surface_release(-3.0), None);
    assert_eq!(dismissed.get(), 1);
}

#[test]
fn fade_binding_tracks_the_dismiss_drag() {
    let opacity = Rc::new(Cell::new(1.0_f64));
    let binding = opacity.clone();
    let config = PagerBuilder::new()
        .on_dismiss(|_| {})
        .background_opacity(move |value| binding.set(value))
        .finish();
    let mut viewer = viewer(10, 5, config);

    viewer.surface_pan_begin();
    viewer.surface_scroll(Vec2::new(0.0, -60.0)); // 10% dragged, full fade at 20%
    assert!((opacity.get() - 0.5).abs() < 1e-9);
    viewer.surface_scroll(Vec2::new(0.0, 5.0));
    assert_eq!(opacity.get(), 1.0);
}

#[test]
fn snap_targets_match_release_velocity() {
    let mut viewer = viewer(10, 0, PagerConfig::default());

    viewer.pager_drag_begin();
    viewer.pager_scroll(320.0);
    // Velocity 0.6 (above the 0.5 threshold): floor(1.067 + 1) = page 2.
    assert_eq!(viewer.pager_drag_end(0.6), 600.0);

    viewer.pager_drag_begin();
    viewer.pager_scroll(320.0);
    // Velocity 0.1 (below threshold): round(1.067) = page 1.
    assert_eq!(viewer.pager_drag_end(0.1), 300.0);
}

#[test]
fn load_more_fires_at_the_configured_distance() {
    for (settle_at, expected) in [(7, 1_u32), (6, 0)] {
        let calls = Rc::new(Cell::new(0_u32));
        let counter = calls.clone();
        let config = PagerBuilder::new()
            .should_load_more(LoadMore::LastElement { minus: 2 }, move || {
                counter.set(counter.get() + 1);
            })
            .finish();
        let mut viewer = viewer(10, 0, config);
        viewer.go_to_page(settle_at, false);
        viewer.tick(16);
        assert_eq!(calls.get(), expected, "settling at {settle_at}");
    }
}

#[test]
fn growth_after_load_more_extends_the_window() {
    let config = PagerBuilder::new()
        .should_load_more(LoadMore::LastElement { minus: 3 }, || {})
        .finish();
    let mut viewer = viewer(10, 0, config);
    viewer.go_to_page(8, false);
    viewer.tick(16);
    assert_eq!(window_indices(&viewer), [5, 6, 7, 8, 9]);

    // The embedding layer appends more data and reloads.
    viewer.data_mut().extend(10..20);
    viewer.reload_views();
    viewer.tick(32);
    assert_eq!(window_indices(&viewer), [5, 6, 7, 8, 9, 10, 11]);
}

#[test]
fn element_replacement_updates_in_place() {
    let config = PagerBuilder::new().zoomable(1.0, 4.0).finish();
    let mut viewer = viewer(100, 5, config);

    // Zoom the current page so we can prove it survives the reload.
    viewer.surface_zoom_begin();
    viewer.surface_zoom_end(3.0);

    viewer.data_mut()[6] = 99;
    viewer.reload_views();
    viewer.tick(16);

    // Same window, same indices, content re-rendered in place.
    assert_eq!(window_indices(&viewer), [2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(viewer.engine().window().get(6).map(|s| *s.content()), Some(990));
    let current = viewer.current_surface().expect("page 5 is materialized");
    assert_eq!(current.index(), 5);
    assert_eq!(current.scale(), 3.0);
}

#[test]
fn evicted_pages_come_back_fresh() {
    let config = PagerBuilder::new().zoomable(1.0, 4.0).finish();
    let mut viewer = viewer(100, 5, config);
    viewer.surface_zoom_begin();
    viewer.surface_zoom_end(3.0);
    assert_eq!(viewer.current_surface().unwrap().scale(), 3.0);

    // Page 5 falls outside the window and is torn down...
    viewer.go_to_page(50, false);
    viewer.tick(16);
    assert!(!viewer.engine().window().contains(5));

    // ...so re-entering materializes a fresh page at baseline scale.
    viewer.go_to_page(5, false);
    viewer.tick(32);
    assert_eq!(viewer.current_surface().unwrap().scale(), 1.0);
}

#[test]
fn scrolled_away_pages_reset_their_zoom() {
    let config = PagerBuilder::new().zoomable(1.0, 4.0).finish();
    let mut viewer = viewer(100, 5, config);
    viewer.surface_zoom_begin();
    viewer.surface_zoom_end(3.0);

    swipe_to_neighbor(&mut viewer, true);
    assert_eq!(viewer.current_index(), 6);
    // Page 5 is still materialized but offscreen: zoom went back to 1.
    let page5 = viewer.engine().window().get(5).expect("still in the window");
    assert_eq!(page5.scale(), 1.0);
}

#[test]
fn absolute_position_is_written_continuously() {
    let position = Rc::new(Cell::new(f64::NAN));
    let binding = position.clone();
    let config = PagerBuilder::new()
        .absolute_content_position(move |value| binding.set(value))
        .finish();
    let mut viewer = viewer(10, 0, config);

    viewer.pager_drag_begin();
    viewer.pager_scroll(150.0);
    assert_eq!(position.get(), 0.5);
    viewer.pager_scroll(450.0);
    assert_eq!(position.get(), 1.5);
}

#[test]
fn single_tap_waits_for_double_tap_failure() {
    let taps = Rc::new(Cell::new(0_u32));
    let doubles = Rc::new(Cell::new(0_u32));
    let tap_counter = taps.clone();
    let double_counter = doubles.clone();
    let config = PagerBuilder::new()
        .zoomable(1.0, 4.0)
        .on_tap(move || tap_counter.set(tap_counter.get() + 1))
        .on_double_tap(move || double_counter.set(double_counter.get() + 1))
        .finish();
    let mut viewer = viewer(10, 5, config);

    // A lone tap resolves only after the double-tap window lapses.
    assert!(viewer.surface_tap(Point::new(100.0, 100.0), 1_000).is_none());
    viewer.tick(1_100);
    assert_eq!(taps.get(), 0);
    viewer.tick(1_400);
    assert_eq!(taps.get(), 1);
    assert_eq!(doubles.get(), 0);
}

#[test]
fn double_tap_zooms_and_fires_the_callback() {
    let doubles = Rc::new(Cell::new(0_u32));
    let counter = doubles.clone();
    let config = PagerBuilder::new()
        .zoomable(1.0, 4.0)
        .on_double_tap(move || counter.set(counter.get() + 1))
        .finish();
    let mut viewer = viewer(10, 5, config);

    assert!(viewer.surface_tap(Point::new(150.0, 300.0), 1_000).is_none());
    let target = viewer.surface_tap(Point::new(150.0, 300.0), 1_150);
    // The double-tap callback and the zoom toggle co-fire.
    assert_eq!(doubles.get(), 1);
    assert!(target.is_some());
    // mid = lerp(1, 4, 0.5) = 2.5.
    let scale = viewer.current_surface().unwrap().scale();
    assert!((scale - 2.5).abs() < 1e-9);

    // Toggling back to minimum.
    assert!(viewer.surface_tap(Point::new(10.0, 10.0), 2_000).is_none());
    let target = viewer.surface_tap(Point::new(10.0, 10.0), 2_100);
    assert!(target.is_some());
    assert_eq!(viewer.current_surface().unwrap().scale(), 1.0);
}

#[test]
fn vertical_pager_has_no_dismiss() {
    let dismissed = Rc::new(Cell::new(0_u32));
    let counter = dismissed.clone();
    let config = PagerBuilder::new()
        .on_dismiss(move |_| counter.set(counter.get() + 1))
        .axis(Axis::Vertical)
        .finish();
    let data: Vec<usize> = (0..10).collect();
    let render: Box<dyn FnMut(&usize) -> usize> = Box::new(|element| *element);
    let mut viewer = ViewProvider::new(data, 5, config, render);
    viewer.set_viewport(Size::new(300.0, 600.0), Insets::ZERO);
    viewer.tick(0);

    // A hard cross-axis (horizontal) drag-release never dismisses.
    viewer.surface_pan_begin();
    viewer.surface_scroll(Vec2::new(-90.0, 0.0));
    assert_eq!(viewer.surface_release(-3.0), None);
    viewer.finish_dismiss();
    assert_eq!(dismissed.get(), 0);

    // Paging still works along the vertical axis (600pt page extent).
    viewer.pager_drag_begin();
    let offset = viewer.engine().scroll_offset();
    viewer.pager_scroll(offset + 400.0);
    let target = viewer.pager_drag_end(0.7);
    viewer.pager_scroll(target);
    viewer.pager_settled();
    viewer.tick(16);
    assert_eq!(viewer.current_index(), 6);
}

#[test]
fn empty_data_is_inert() {
    let mut viewer = viewer(0, 0, PagerConfig::default());
    assert!(viewer.current_surface().is_none());
    assert_eq!(window_indices(&viewer), Vec::<usize>::new());

    // Every operation is a silent no-op.
    viewer.go_to_page(3, false);
    viewer.pager_drag_begin();
    viewer.pager_scroll(100.0);
    viewer.pager_settled();
    viewer.surface_pan_begin();
    assert_eq!(viewer.surface_release(-9.0), None);
    viewer.tick(16);
    assert!(viewer.current_surface().is_none());
}

#[test]
fn renderer_runs_once_per_materialized_page() {
    let renders = Rc::new(RefCell::new(Vec::new()));
    let log = renders.clone();
    let data: Vec<usize> = (0..100).collect();
    let render: Box<dyn FnMut(&usize) -> usize> = Box::new(move |element| {
        log.borrow_mut().push(*element);
        *element
    });
    let mut viewer = ViewProvider::new(data, 50, PagerConfig::default(), render);
    viewer.set_viewport(Size::new(300.0, 600.0), Insets::ZERO);
    viewer.tick(0);

    let mut seen = renders.borrow().clone();
    seen.sort_unstable();
    assert_eq!(seen, [47, 48, 49, 50, 51, 52, 53]);
}

#[test]
fn rotation_keeps_the_current_page_anchored() {
    let mut viewer = viewer(100, 50, PagerConfig::default());
    assert_eq!(viewer.engine().scroll_offset(), 900.0);

    viewer.set_viewport(Size::new(600.0, 300.0), Insets::ZERO);
    viewer.tick(16);
    assert_eq!(viewer.current_index(), 50);
    assert_eq!(viewer.engine().scroll_offset(), 1_800.0);
    assert_eq!(viewer.engine().absolute_position(), 50.0);
}
