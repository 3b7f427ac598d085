// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Behavioral tests for the scene graph: tree mutation, bounds caching,
//! change notification, hit testing, and the paint traversal.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Affine, Point, Rect, Size, Vec2};
use vellum_scene::{
    BlendMode, BoundsKind, BoundsPosition, ChangeFlags, DrawParams, EventHooks, EventKind,
    HitKind, HitOptions, ItemFlags, NodeId, RemoveOnMask, Scene, Style, Surface,
};

fn approx(a: Rect, b: Rect) -> bool {
    (a.x0 - b.x0).abs() < 1e-9
        && (a.y0 - b.y0).abs() < 1e-9
        && (a.x1 - b.x1).abs() < 1e-9
        && (a.y1 - b.y1).abs() < 1e-9
}

// --- tree structure ---

#[test]
fn default_insertion_creates_active_layer() {
    let mut scene = Scene::new();
    assert!(scene.active_layer().is_none());

    let raster = scene.insert_raster(None, Size::new(10.0, 10.0));
    let layer = scene.active_layer().expect("layer auto-created");
    assert_eq!(scene.layers(), [layer]);
    assert_eq!(scene.parent_of(raster), Some(layer));
    assert_eq!(scene.children_of(layer), [raster]);
}

#[test]
fn child_indices_stay_dense() {
    let mut scene = Scene::new();
    let layer = scene.insert_layer();
    let a = scene.insert_group(Some(layer));
    let b = scene.insert_group(Some(layer));
    let c = scene.insert_group(Some(layer));
    assert_eq!(scene.index_of(b), Some(1));

    // Move c to the front.
    assert!(scene.insert_child(layer, 0, c));
    assert_eq!(scene.children_of(layer), [c, a, b]);
    assert_eq!(scene.index_of(c), Some(0));
    assert_eq!(scene.index_of(a), Some(1));
    assert_eq!(scene.index_of(b), Some(2));

    assert!(scene.remove(a));
    assert_eq!(scene.children_of(layer), [c, b]);
    assert_eq!(scene.index_of(b), Some(1));
}

#[test]
fn sibling_navigation() {
    let mut scene = Scene::new();
    let layer = scene.insert_layer();
    let a = scene.insert_group(Some(layer));
    let b = scene.insert_group(Some(layer));

    assert_eq!(scene.next_sibling(a), Some(b));
    assert_eq!(scene.prev_sibling(b), Some(a));
    assert_eq!(scene.prev_sibling(a), None);
    assert_eq!(scene.next_sibling(b), None);
}

#[test]
fn reparenting_into_own_subtree_is_rejected() {
    let mut scene = Scene::new();
    let layer = scene.insert_layer();
    let outer = scene.insert_group(Some(layer));
    let inner = scene.insert_group(Some(outer));

    assert!(!scene.insert_child(inner, 0, outer));
    assert!(!scene.insert_child(outer, 0, outer));
    // Structure unchanged.
    assert_eq!(scene.parent_of(inner), Some(outer));
    assert_eq!(scene.parent_of(outer), Some(layer));
}

#[test]
fn leaf_parents_reject_children() {
    let mut scene = Scene::new();
    let raster = scene.insert_raster(None, Size::new(4.0, 4.0));
    let group = scene.insert_group(None);
    assert!(!scene.insert_child(raster, 0, group));
}

#[test]
fn removal_invalidates_ids_and_recycles_slots() {
    let mut scene = Scene::new();
    let layer = scene.insert_layer();
    let group = scene.insert_group(Some(layer));
    let child = scene.insert_raster(Some(group), Size::new(4.0, 4.0));

    assert!(scene.remove(group));
    assert!(!scene.is_alive(group));
    assert!(!scene.is_alive(child));
    assert!(scene.kind(child).is_none());
    assert!(scene.children_of(layer).is_empty());

    // A recycled slot yields a distinct id.
    let next = scene.insert_group(Some(layer));
    assert!(scene.is_alive(next));
    assert!(!scene.is_alive(group));
    assert_ne!(next, group);
}

#[test]
fn removing_a_detached_node_reports_not_removed() {
    let mut scene = Scene::new();
    let detached = scene.new_detached_group();
    assert!(!scene.remove(detached));
    assert!(scene.is_alive(detached));
}

#[test]
fn remove_children_range() {
    let mut scene = Scene::new();
    let layer = scene.insert_layer();
    let kept_front = scene.insert_group(Some(layer));
    let a = scene.insert_group(Some(layer));
    let b = scene.insert_group(Some(layer));
    let kept_back = scene.insert_group(Some(layer));

    assert_eq!(scene.remove_children(layer, 1, 3), 2);
    assert_eq!(scene.children_of(layer), [kept_front, kept_back]);
    assert!(!scene.is_alive(a));
    assert!(!scene.is_alive(b));
    assert_eq!(scene.index_of(kept_back), Some(1));
}

// --- layers ---

#[test]
fn layer_reordering_and_activation() {
    let mut scene = Scene::new();
    let bottom = scene.insert_layer();
    let middle = scene.insert_layer();
    let top = scene.insert_layer();
    assert_eq!(scene.active_layer(), Some(bottom));

    assert!(scene.move_layer_above(bottom, top));
    assert_eq!(scene.layers(), [middle, top, bottom]);
    assert_eq!(scene.index_of(middle), Some(0));
    assert_eq!(scene.index_of(bottom), Some(2));

    assert!(scene.activate_layer(top));
    assert_eq!(scene.active_layer(), Some(top));

    assert!(scene.move_layer_below(top, middle));
    assert_eq!(scene.layers(), [top, middle, bottom]);
}

#[test]
fn removing_the_active_layer_falls_back() {
    let mut scene = Scene::new();
    let first = scene.insert_layer();
    let second = scene.insert_layer();
    assert!(scene.activate_layer(first));
    assert!(scene.remove(first));
    assert_eq!(scene.active_layer(), Some(second));
}

// --- bounds ---

#[test]
fn raster_bounds_follow_the_matrix() {
    let mut scene = Scene::new();
    let raster = scene.insert_raster(None, Size::new(100.0, 50.0));
    assert!(approx(
        scene.bounds(raster, BoundsKind::Bounds).unwrap(),
        Rect::new(0.0, 0.0, 100.0, 50.0)
    ));

    scene.translate(raster, Vec2::new(10.0, 20.0));
    assert!(approx(
        scene.bounds(raster, BoundsKind::Bounds).unwrap(),
        Rect::new(10.0, 20.0, 110.0, 70.0)
    ));

    scene.scale_about(raster, 2.0, 2.0, Point::new(10.0, 20.0));
    assert!(approx(
        scene.bounds(raster, BoundsKind::Bounds).unwrap(),
        Rect::new(10.0, 20.0, 210.0, 120.0)
    ));
}

#[test]
fn rotated_bounds_are_the_enclosing_box() {
    let mut scene = Scene::new();
    let raster = scene.insert_raster(None, Size::new(10.0, 10.0));
    scene.rotate_about(raster, std::f64::consts::FRAC_PI_4, Point::new(5.0, 5.0));
    let b = scene.bounds(raster, BoundsKind::Bounds).unwrap();
    let half_diag = 5.0 * std::f64::consts::SQRT_2;
    assert!((b.width() - 2.0 * half_diag).abs() < 1e-9);
    assert!((b.height() - 2.0 * half_diag).abs() < 1e-9);
}

#[test]
fn group_bounds_union_visible_children() {
    let mut scene = Scene::new();
    let group = scene.insert_group(None);
    let a = scene.insert_raster(Some(group), Size::new(10.0, 10.0));
    let b = scene.insert_raster(Some(group), Size::new(10.0, 10.0));
    scene.translate(b, Vec2::new(40.0, 0.0));

    assert!(approx(
        scene.bounds(group, BoundsKind::Bounds).unwrap(),
        Rect::new(0.0, 0.0, 50.0, 10.0)
    ));

    // Invisible children drop out of the union.
    scene.set_visible(b, false);
    assert!(approx(
        scene.bounds(group, BoundsKind::Bounds).unwrap(),
        Rect::new(0.0, 0.0, 10.0, 10.0)
    ));
    let _ = a;
}

#[test]
fn empty_group_bounds_are_zero() {
    let mut scene = Scene::new();
    let group = scene.insert_group(None);
    assert_eq!(scene.bounds(group, BoundsKind::Bounds), Some(Rect::ZERO));
}

#[test]
fn stroke_bounds_pad_by_half_width() {
    let mut scene = Scene::new();
    let raster = scene.insert_raster(None, Size::new(10.0, 10.0));
    scene.set_style(
        raster,
        Style {
            stroke_width: 4.0,
            stroked: true,
        },
    );

    assert!(approx(
        scene.bounds(raster, BoundsKind::Bounds).unwrap(),
        Rect::new(0.0, 0.0, 10.0, 10.0)
    ));
    assert!(approx(
        scene.bounds(raster, BoundsKind::Stroke).unwrap(),
        Rect::new(-2.0, -2.0, 12.0, 12.0)
    ));
    // Rough bounds enclose stroke bounds.
    let rough = scene.bounds(raster, BoundsKind::Rough).unwrap();
    let stroke = scene.bounds(raster, BoundsKind::Stroke).unwrap();
    assert!(rough.contains_rect(stroke));
}

#[test]
fn ancestor_bounds_track_deep_mutation() {
    let mut scene = Scene::new();
    let layer = scene.insert_layer();
    let group = scene.insert_group(Some(layer));
    let raster = scene.insert_raster(Some(group), Size::new(10.0, 10.0));

    // Prime the caches through the whole chain.
    assert!(approx(
        scene.bounds(layer, BoundsKind::Bounds).unwrap(),
        Rect::new(0.0, 0.0, 10.0, 10.0)
    ));

    scene.translate(raster, Vec2::new(100.0, 0.0));
    assert!(approx(
        scene.bounds(layer, BoundsKind::Bounds).unwrap(),
        Rect::new(100.0, 0.0, 110.0, 10.0)
    ));

    // Stroke width growth must also surface at the ancestors.
    let _ = scene.bounds(layer, BoundsKind::Stroke);
    scene.set_style(
        raster,
        Style {
            stroke_width: 8.0,
            stroked: true,
        },
    );
    assert!(approx(
        scene.bounds(layer, BoundsKind::Stroke).unwrap(),
        Rect::new(96.0, -4.0, 114.0, 14.0)
    ));
}

#[test]
fn hierarchy_changes_invalidate_composite_bounds() {
    let mut scene = Scene::new();
    let group = scene.insert_group(None);
    let _a = scene.insert_raster(Some(group), Size::new(10.0, 10.0));
    assert!(approx(
        scene.bounds(group, BoundsKind::Bounds).unwrap(),
        Rect::new(0.0, 0.0, 10.0, 10.0)
    ));

    let b = scene.insert_raster(Some(group), Size::new(10.0, 10.0));
    scene.translate(b, Vec2::new(20.0, 0.0));
    assert!(approx(
        scene.bounds(group, BoundsKind::Bounds).unwrap(),
        Rect::new(0.0, 0.0, 30.0, 10.0)
    ));

    assert!(scene.remove(b));
    assert!(approx(
        scene.bounds(group, BoundsKind::Bounds).unwrap(),
        Rect::new(0.0, 0.0, 10.0, 10.0)
    ));
}

#[test]
fn position_is_the_bounds_center() {
    let mut scene = Scene::new();
    let raster = scene.insert_raster(None, Size::new(10.0, 20.0));
    assert_eq!(scene.position(raster), Some(Point::new(5.0, 10.0)));

    assert!(scene.set_position(raster, Point::new(50.0, 50.0)));
    assert_eq!(scene.position(raster), Some(Point::new(50.0, 50.0)));
    assert!(approx(
        scene.bounds(raster, BoundsKind::Bounds).unwrap(),
        Rect::new(45.0, 40.0, 55.0, 60.0)
    ));
}

#[test]
fn transforms_pre_concatenate() {
    let mut scene = Scene::new();
    let raster = scene.insert_raster(None, Size::new(10.0, 10.0));
    let a = Affine::translate(Vec2::new(3.0, 0.0));
    let b = Affine::scale(2.0);

    scene.transform(raster, a);
    scene.transform(raster, b);
    // Applying A then B composes as B * A.
    assert_eq!(scene.matrix(raster), Some(b * a));
}

#[test]
fn quadrant_rotation_keeps_cached_bounds_exact() {
    let mut scene = Scene::new();
    let primed = scene.insert_raster(None, Size::new(10.0, 20.0));
    let cold = scene.insert_raster(None, Size::new(10.0, 20.0));
    // A quarter turn with exactly-zero diagonal coefficients, so the cached
    // rectangles survive the transform instead of being recomputed.
    let quarter = Affine::new([0.0, 1.0, -1.0, 0.0, 0.0, 0.0]);

    let _ = scene.bounds(primed, BoundsKind::Bounds);
    let _ = scene.bounds(primed, BoundsKind::Stroke);
    let _ = scene.bounds(primed, BoundsKind::Rough);
    let _ = scene.position(primed);
    scene.transform(primed, quarter);
    scene.transform(cold, quarter);

    for kind in [BoundsKind::Bounds, BoundsKind::Stroke, BoundsKind::Rough] {
        let carried = scene.bounds(primed, kind).unwrap();
        let fresh = scene.bounds(cold, kind).unwrap();
        assert!(approx(carried, fresh));
    }
    assert_eq!(scene.position(primed), scene.position(cold));
    assert!(approx(
        scene.bounds(primed, BoundsKind::Bounds).unwrap(),
        Rect::new(-20.0, 0.0, 0.0, 10.0)
    ));
}

#[test]
fn apply_matrix_pushes_transforms_into_leaves() {
    let mut scene = Scene::new();
    let group = scene.insert_group(None);
    let raster = scene.insert_raster(Some(group), Size::new(10.0, 10.0));

    scene.transform_with(group, Affine::translate(Vec2::new(5.0, 5.0)), true);
    assert_eq!(scene.matrix(group), Some(Affine::IDENTITY));
    assert_eq!(
        scene.matrix(raster),
        Some(Affine::translate(Vec2::new(5.0, 5.0)))
    );
    assert!(approx(
        scene.bounds(group, BoundsKind::Bounds).unwrap(),
        Rect::new(5.0, 5.0, 15.0, 15.0)
    ));
}

// --- change notification ---

#[test]
fn changes_coalesce_per_node() {
    let mut scene = Scene::new();
    let raster = scene.insert_raster(None, Size::new(10.0, 10.0));
    let _ = scene.drain_changes();
    let _ = scene.take_redraw_needed();

    scene.translate(raster, Vec2::new(1.0, 0.0));
    scene.set_opacity(raster, 0.5);

    let changes = scene.drain_changes();
    let entry = changes
        .iter()
        .find(|(id, _)| *id == raster)
        .map(|(_, flags)| *flags)
        .expect("change recorded");
    assert!(entry.contains(ChangeFlags::GEOMETRY));
    assert!(entry.contains(ChangeFlags::ATTRIBUTE));
    assert!(entry.contains(ChangeFlags::APPEARANCE));
    assert!(scene.take_redraw_needed());
    assert!(!scene.take_redraw_needed());
}

#[test]
fn name_changes_do_not_demand_redraw() {
    let mut scene = Scene::new();
    let raster = scene.insert_raster(None, Size::new(10.0, 10.0));
    let _ = scene.take_redraw_needed();

    assert!(scene.set_name(raster, Some("hero")));
    assert!(!scene.redraw_needed());
}

#[test]
fn no_op_setters_record_nothing() {
    let mut scene = Scene::new();
    let raster = scene.insert_raster(None, Size::new(10.0, 10.0));
    let _ = scene.drain_changes();

    scene.set_visible(raster, true);
    scene.set_opacity(raster, 1.0);
    scene.set_blend_mode(raster, BlendMode::Normal);
    assert!(scene.drain_changes().is_empty());
}

// --- naming ---

#[test]
fn name_lookup_prefers_latest_holder() {
    let mut scene = Scene::new();
    let layer = scene.insert_layer();
    let a = scene.insert_group(Some(layer));
    let b = scene.insert_group(Some(layer));

    assert!(scene.set_name(a, Some("shape")));
    assert!(scene.set_name(b, Some("shape")));
    assert_eq!(scene.child_by_name(layer, "shape"), Some(b));
    assert_eq!(scene.children_named(layer, "shape"), [a, b]);

    assert!(scene.set_name(b, None));
    assert_eq!(scene.child_by_name(layer, "shape"), Some(a));
}

#[test]
fn names_travel_with_reparenting() {
    let mut scene = Scene::new();
    let layer = scene.insert_layer();
    let group = scene.insert_group(Some(layer));
    let item = scene.insert_group(Some(layer));
    assert!(scene.set_name(item, Some("badge")));
    assert_eq!(scene.child_by_name(layer, "badge"), Some(item));

    assert!(scene.add_child(group, item));
    assert_eq!(scene.child_by_name(layer, "badge"), None);
    assert_eq!(scene.child_by_name(group, "badge"), Some(item));
}

// --- selection ---

#[test]
fn selection_recurses_and_aggregates() {
    let mut scene = Scene::new();
    let group = scene.insert_group(None);
    let child = scene.insert_raster(Some(group), Size::new(4.0, 4.0));

    scene.set_selected(group, true);
    assert!(scene.flags(child).unwrap().contains(ItemFlags::SELECTED));
    assert_eq!(scene.selected_items().count(), 2);

    scene.set_selected_with(group, false, false);
    // A selected descendant keeps the ancestor reporting selected.
    assert!(scene.is_selected(group));
    assert_eq!(scene.selected_items().count(), 1);

    scene.set_selected(group, false);
    assert!(!scene.is_selected(group));
    assert_eq!(scene.selected_items().count(), 0);
}

#[test]
fn removal_deselects() {
    let mut scene = Scene::new();
    let raster = scene.insert_raster(None, Size::new(4.0, 4.0));
    scene.set_selected(raster, true);
    assert_eq!(scene.selected_items().count(), 1);
    assert!(scene.remove(raster));
    assert_eq!(scene.selected_items().count(), 0);
}

// --- clipping ---

#[test]
fn clip_mask_shapes_bounds_and_hits() {
    let mut scene = Scene::new();
    let group = scene.insert_group(None);
    let mask = scene.insert_raster(Some(group), Size::new(50.0, 50.0));
    let content = scene.insert_raster(Some(group), Size::new(100.0, 100.0));
    scene.set_clip_mask(mask, true);

    // A clipped group's bounds are the mask's bounds.
    assert!(approx(
        scene.bounds(group, BoundsKind::Bounds).unwrap(),
        Rect::new(0.0, 0.0, 50.0, 50.0)
    ));

    let options = HitOptions::default();
    let inside = scene.hit_test(Point::new(25.0, 25.0), &options);
    assert_eq!(inside.map(|h| h.node), Some(content));
    // Content exists at (80, 80) but the mask gates it off.
    assert!(scene.hit_test(Point::new(80.0, 80.0), &options).is_none());
}

#[test]
fn clearing_the_clip_flag_restores_the_union() {
    let mut scene = Scene::new();
    let group = scene.insert_group(None);
    let mask = scene.insert_raster(Some(group), Size::new(50.0, 50.0));
    let content = scene.insert_raster(Some(group), Size::new(100.0, 100.0));
    scene.set_clip_mask(mask, true);
    let _ = scene.bounds(group, BoundsKind::Bounds);

    scene.set_clip_mask(mask, false);
    assert!(approx(
        scene.bounds(group, BoundsKind::Bounds).unwrap(),
        Rect::new(0.0, 0.0, 100.0, 100.0)
    ));
    let _ = content;
}

// --- hit testing ---

#[test]
fn hit_test_returns_topmost() {
    let mut scene = Scene::new();
    let below = scene.insert_raster(None, Size::new(50.0, 50.0));
    let above = scene.insert_raster(None, Size::new(50.0, 50.0));

    let hit = scene
        .hit_test(Point::new(25.0, 25.0), &HitOptions::default())
        .expect("hit");
    assert_eq!(hit.node, above);
    assert_eq!(hit.kind, HitKind::Pixel);

    // Layer order beats child order.
    let top_layer = scene.insert_layer();
    let topmost = scene.insert_raster(Some(top_layer), Size::new(50.0, 50.0));
    let hit = scene
        .hit_test(Point::new(25.0, 25.0), &HitOptions::default())
        .expect("hit");
    assert_eq!(hit.node, topmost);
    let _ = below;
}

#[test]
fn hit_test_skips_invisible_and_locked() {
    let mut scene = Scene::new();
    let lower = scene.insert_raster(None, Size::new(50.0, 50.0));
    let upper = scene.insert_raster(None, Size::new(50.0, 50.0));
    let options = HitOptions::default();
    let p = Point::new(10.0, 10.0);

    scene.set_visible(upper, false);
    assert_eq!(scene.hit_test(p, &options).map(|h| h.node), Some(lower));

    scene.set_visible(upper, true);
    scene.set_locked(upper, true);
    assert_eq!(scene.hit_test(p, &options).map(|h| h.node), Some(lower));
}

#[test]
fn hit_test_filters_apply_to_every_node() {
    let mut scene = Scene::new();
    let guide = scene.insert_raster(None, Size::new(50.0, 50.0));
    scene.set_guide(guide, true);
    let p = Point::new(10.0, 10.0);

    assert!(scene.hit_test(p, &HitOptions::default()).is_none());
    let with_guides = HitOptions {
        guides: true,
        ..HitOptions::default()
    };
    assert_eq!(
        scene.hit_test(p, &with_guides).map(|h| h.node),
        Some(guide)
    );

    // A guide layer is filtered exactly like any other guide node.
    let layer = scene.active_layer().unwrap();
    scene.set_guide(guide, false);
    scene.set_guide(layer, true);
    assert_eq!(scene.hit_test(p, &HitOptions::default()).map(|h| h.node), Some(guide));
}

#[test]
fn hit_test_selected_only() {
    let mut scene = Scene::new();
    let plain = scene.insert_raster(None, Size::new(50.0, 50.0));
    let chosen = scene.insert_raster(None, Size::new(50.0, 50.0));
    scene.translate(chosen, Vec2::new(100.0, 0.0));
    scene.set_selected(chosen, true);

    let options = HitOptions {
        selected_only: true,
        ..HitOptions::default()
    };
    assert!(scene.hit_test(Point::new(10.0, 10.0), &options).is_none());
    assert_eq!(
        scene.hit_test(Point::new(110.0, 10.0), &options).map(|h| h.node),
        Some(chosen)
    );
    let _ = plain;
}

#[test]
fn hit_test_tolerance_reaches_past_the_edge() {
    let mut scene = Scene::new();
    let raster = scene.insert_raster(None, Size::new(10.0, 10.0));

    let tight = HitOptions {
        tolerance: 0.0,
        ..HitOptions::default()
    };
    assert!(scene.hit_test(Point::new(11.0, 5.0), &tight).is_none());

    let loose = HitOptions {
        tolerance: 2.0,
        ..HitOptions::default()
    };
    assert_eq!(
        scene.hit_test(Point::new(11.0, 5.0), &loose).map(|h| h.node),
        Some(raster)
    );
}

#[test]
fn hit_test_stroke_beats_fill_at_the_edge() {
    let mut scene = Scene::new();
    let raster = scene.insert_raster(None, Size::new(10.0, 10.0));
    scene.set_style(
        raster,
        Style {
            stroke_width: 2.0,
            stroked: true,
        },
    );

    let options = HitOptions::default();
    let edge = scene
        .hit_test(Point::new(10.0, 5.0), &options)
        .expect("edge hit");
    assert_eq!(edge.kind, HitKind::Stroke);

    let interior = scene
        .hit_test(Point::new(5.0, 5.0), &options)
        .expect("interior hit");
    assert_eq!(interior.kind, HitKind::Pixel);
}

#[test]
fn bounds_hits_report_center_then_positions() {
    let mut scene = Scene::new();
    let raster = scene.insert_raster(None, Size::new(10.0, 10.0));
    let options = HitOptions {
        fill: false,
        stroke: false,
        bounds: true,
        center: true,
        tolerance: 1.0,
        ..HitOptions::default()
    };

    let center = scene
        .hit_test(Point::new(5.0, 5.0), &options)
        .expect("center hit");
    assert_eq!(center.kind, HitKind::Center);
    assert_eq!(center.point, Point::new(5.0, 5.0));
    assert_eq!(center.bounds_position, None);
    assert_eq!(center.node, raster);

    let corner = scene
        .hit_test(Point::new(0.3, 0.3), &options)
        .expect("corner hit");
    assert_eq!(corner.kind, HitKind::Bounds);
    assert_eq!(corner.bounds_position, Some(BoundsPosition::TopLeft));
    assert_eq!(corner.point, Point::new(0.0, 0.0));
}

// --- symbols ---

#[test]
fn symbol_instances_share_the_definition() {
    let mut scene = Scene::new();
    let def = scene.new_detached_group();
    let def_content = scene.insert_raster(Some(def), Size::new(10.0, 10.0));
    assert!(scene.define_symbol(def));

    let first = scene.insert_symbol(None, def).expect("instance");
    let second = scene.insert_symbol(None, def).expect("instance");
    scene.translate(second, Vec2::new(100.0, 0.0));
    assert_eq!(scene.instances_of(def), [first, second]);

    assert!(approx(
        scene.bounds(first, BoundsKind::Bounds).unwrap(),
        Rect::new(0.0, 0.0, 10.0, 10.0)
    ));
    assert!(approx(
        scene.bounds(second, BoundsKind::Bounds).unwrap(),
        Rect::new(100.0, 0.0, 110.0, 10.0)
    ));

    // Editing definition content reaches every instance.
    scene.translate(def_content, Vec2::new(0.0, 50.0));
    assert!(approx(
        scene.bounds(second, BoundsKind::Bounds).unwrap(),
        Rect::new(100.0, 50.0, 110.0, 60.0)
    ));
}

#[test]
fn definition_edits_mark_instances_changed() {
    let mut scene = Scene::new();
    let def = scene.new_detached_group();
    let def_content = scene.insert_raster(Some(def), Size::new(10.0, 10.0));
    assert!(scene.define_symbol(def));
    let instance = scene.insert_symbol(None, def).expect("instance");
    let _ = scene.drain_changes();

    scene.translate(def_content, Vec2::new(5.0, 0.0));
    let changes = scene.drain_changes();
    assert!(changes.iter().any(|(id, flags)| {
        *id == instance && flags.contains(ChangeFlags::GEOMETRY)
    }));
}

#[test]
fn symbol_hits_report_the_instance() {
    let mut scene = Scene::new();
    let def = scene.new_detached_group();
    let _ = scene.insert_raster(Some(def), Size::new(10.0, 10.0));
    assert!(scene.define_symbol(def));
    let instance = scene.insert_symbol(None, def).expect("instance");
    scene.translate(instance, Vec2::new(30.0, 0.0));

    let hit = scene
        .hit_test(Point::new(35.0, 5.0), &HitOptions::default())
        .expect("hit");
    assert_eq!(hit.node, instance);
    assert_eq!(hit.kind, HitKind::Pixel);
}

#[test]
fn recursive_symbol_placement_is_rejected() {
    let mut scene = Scene::new();
    let def = scene.new_detached_group();
    let inner = scene.insert_group(Some(def));
    assert!(scene.define_symbol(def));

    assert!(scene.insert_symbol(Some(def), def).is_none());
    assert!(scene.insert_symbol(Some(inner), def).is_none());
}

#[test]
fn reparenting_an_instance_into_its_definition_is_rejected() {
    let mut scene = Scene::new();
    let def = scene.new_detached_group();
    let inner = scene.insert_group(Some(def));
    assert!(scene.define_symbol(def));
    let instance = scene.insert_symbol(None, def).expect("instance");
    let layer = scene.active_layer().expect("layer");

    assert!(!scene.add_child(def, instance));
    assert!(!scene.insert_child(inner, 0, instance));
    // The instance stays where it was and the scene keeps answering.
    assert_eq!(scene.parent_of(instance), Some(layer));
    assert!(scene.bounds(instance, BoundsKind::Bounds).is_some());

    // Hiding the instance inside a staged group does not defeat the guard.
    let wrapper = scene.new_detached_group();
    assert!(scene.add_child(wrapper, instance));
    assert!(!scene.insert_child(inner, 0, wrapper));
    assert_eq!(scene.parent_of(wrapper), None);
}

#[test]
fn mutually_nested_definitions_are_rejected() {
    let mut scene = Scene::new();
    let def_a = scene.new_detached_group();
    let def_b = scene.new_detached_group();
    let inner_b = scene.insert_group(Some(def_b));
    assert!(scene.define_symbol(def_a));
    assert!(scene.define_symbol(def_b));

    // One definition may place instances of another.
    assert!(scene.insert_symbol(Some(def_a), def_b).is_some());
    // Closing the loop back into it is refused, directly or nested.
    assert!(scene.insert_symbol(Some(def_b), def_a).is_none());
    assert!(scene.insert_symbol(Some(inner_b), def_a).is_none());

    // Edits inside either subtree still settle.
    let instance = scene.insert_symbol(None, def_b).expect("instance");
    scene.translate(inner_b, Vec2::new(3.0, 0.0));
    let changes = scene.drain_changes();
    assert!(changes.iter().any(|(id, _)| *id == instance));
}

// --- events ---

#[test]
fn scene_handler_transitions_fire_hooks() {
    let mut scene = Scene::new();
    let raster = scene.insert_raster(None, Size::new(4.0, 4.0));

    let log: Rc<RefCell<Vec<(&str, NodeId)>>> = Rc::new(RefCell::new(Vec::new()));
    let l1 = Rc::clone(&log);
    let l2 = Rc::clone(&log);
    scene.set_event_hooks(
        EventKind::PointerDown,
        EventHooks::new(
            move |n| l1.borrow_mut().push(("install", n)),
            move |n| l2.borrow_mut().push(("uninstall", n)),
        ),
    );

    assert!(scene.add_handler(raster, EventKind::PointerDown));
    assert!(scene.add_handler(raster, EventKind::PointerDown));
    assert_eq!(scene.handler_count(raster, EventKind::PointerDown), 2);

    // Destroying the node tears down the remaining capability.
    assert!(scene.remove(raster));
    assert_eq!(
        &*log.borrow(),
        &[("install", raster), ("uninstall", raster)]
    );
}

#[test]
fn frame_subscribers_enumerate() {
    let mut scene = Scene::new();
    let a = scene.insert_raster(None, Size::new(4.0, 4.0));
    let b = scene.insert_raster(None, Size::new(4.0, 4.0));
    assert!(scene.add_handler(a, EventKind::Frame));
    assert!(scene.add_handler(b, EventKind::Frame));
    assert!(scene.remove_handler(a, EventKind::Frame));

    let subscribers: Vec<NodeId> = scene.frame_subscribers().collect();
    assert_eq!(subscribers, [b]);
}

#[test]
fn remove_on_schedules_and_drains() {
    let mut scene = Scene::new();
    let raster = scene.insert_raster(None, Size::new(4.0, 4.0));
    assert!(scene.remove_on(raster, RemoveOnMask::UP));

    let drained = scene.drain_remove_on(RemoveOnMask::UP | RemoveOnMask::DOWN);
    assert_eq!(drained, [raster]);
    assert!(scene.drain_remove_on(RemoveOnMask::UP).is_empty());
}

// --- drawing ---

#[derive(Default)]
struct RecordingSurface {
    ops: Vec<String>,
}

impl Surface for RecordingSurface {
    fn push_group(&mut self, params: &DrawParams) {
        self.ops.push(format!("group({:?})", params.blend_mode));
    }

    fn pop_group(&mut self) {
        self.ops.push("pop_group".into());
    }

    fn push_clip(&mut self, rect: Rect, _transform: Affine) {
        self.ops.push(format!("clip({}x{})", rect.width(), rect.height()));
    }

    fn pop_clip(&mut self) {
        self.ops.push("pop_clip".into());
    }

    fn draw_raster(&mut self, _node: NodeId, size: Size, params: &DrawParams) {
        self.ops
            .push(format!("raster({}x{}@{})", size.width, size.height, params.opacity));
    }
}

#[test]
fn draw_emits_paint_order() {
    let mut scene = Scene::new();
    let back = scene.insert_raster(None, Size::new(1.0, 1.0));
    let front = scene.insert_raster(None, Size::new(2.0, 2.0));
    scene.set_visible(back, false);
    let _ = front;

    let mut surface = RecordingSurface::default();
    scene.draw(&mut surface);
    assert_eq!(surface.ops, ["raster(2x2@1)"]);
}

#[test]
fn draw_opacity_accumulates_and_blend_isolates() {
    let mut scene = Scene::new();
    let group = scene.insert_group(None);
    scene.set_opacity(group, 0.5);
    scene.set_blend_mode(group, BlendMode::Multiply);
    let _ = scene.insert_raster(Some(group), Size::new(1.0, 1.0));

    let mut surface = RecordingSurface::default();
    scene.draw(&mut surface);
    assert_eq!(
        surface.ops,
        ["group(Multiply)", "raster(1x1@0.5)", "pop_group"]
    );
}

#[test]
fn draw_clips_around_content() {
    let mut scene = Scene::new();
    let group = scene.insert_group(None);
    let mask = scene.insert_raster(Some(group), Size::new(5.0, 5.0));
    let _ = scene.insert_raster(Some(group), Size::new(9.0, 9.0));
    scene.set_clip_mask(mask, true);

    let mut surface = RecordingSurface::default();
    scene.draw(&mut surface);
    assert_eq!(surface.ops, ["clip(5x5)", "raster(9x9@1)", "pop_clip"]);
}

#[test]
fn draw_skips_zero_opacity_subtrees() {
    let mut scene = Scene::new();
    let group = scene.insert_group(None);
    let _ = scene.insert_raster(Some(group), Size::new(1.0, 1.0));
    scene.set_opacity(group, 0.0);

    let mut surface = RecordingSurface::default();
    scene.draw(&mut surface);
    assert!(surface.ops.is_empty());
}
