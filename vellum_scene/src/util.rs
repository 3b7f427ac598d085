// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, Rect};

/// Transform an axis-aligned `Rect` by an `Affine` and return a conservative
/// axis-aligned bounding box in the target space.
///
/// Exact for axis-aligned transforms; conservative under rotation or shear.
pub(crate) fn transform_rect_bbox(affine: Affine, rect: Rect) -> Rect {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    let min_x = (a * rect.x0).min(a * rect.x1) + (c * rect.y0).min(c * rect.y1);
    let max_x = (a * rect.x0).max(a * rect.x1) + (c * rect.y0).max(c * rect.y1);
    let min_y = (b * rect.x0).min(b * rect.x1) + (d * rect.y0).min(d * rect.y1);
    let max_y = (b * rect.x0).max(b * rect.x1) + (d * rect.y0).max(d * rect.y1);
    Rect::new(min_x + e, min_y + f, max_x + e, max_y + f)
}

/// Whether `affine` maps axis-aligned rectangles to axis-aligned rectangles:
/// a pure combination of translation, scaling, and quadrant (90°-multiple)
/// rotation. For such transforms [`transform_rect_bbox`] is exact, which is
/// what permits the cached-bounds fast path.
pub(crate) fn is_axis_aligned(affine: Affine) -> bool {
    let [a, b, c, d, _, _] = affine.as_coeffs();
    (b == 0.0 && c == 0.0) || (a == 0.0 && d == 0.0)
}
