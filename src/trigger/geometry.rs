//! Viewport geometry: rectangles, root margins, intersection ratios

use crate::error::{MotionError, MotionResult};

/// Axis-aligned rectangle in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Overlap of two rectangles; edge-adjacent rectangles yield an empty
    /// (zero-area) overlap rather than `None`
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

/// One side of a root margin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f64),
    /// Percentage of the viewport's width (left/right) or height (top/bottom)
    Percent(f64),
}

impl Length {
    fn parse(token: &str) -> MotionResult<Self> {
        let bad = || MotionError::configuration(format!("invalid margin length '{}'", token));
        let (number, unit): (&str, fn(f64) -> Length) = if let Some(n) = token.strip_suffix("px") {
            (n, Length::Px)
        } else if let Some(n) = token.strip_suffix('%') {
            (n, Length::Percent)
        } else if token == "0" {
            ("0", Length::Px)
        } else {
            return Err(bad());
        };
        let value: f64 = number.parse().map_err(|_| bad())?;
        if !value.is_finite() {
            return Err(bad());
        }
        Ok(unit(value))
    }

    fn resolve(&self, basis: f64) -> f64 {
        match *self {
            Length::Px(v) => v,
            Length::Percent(p) => basis * p / 100.0,
        }
    }
}

/// CSS margin shorthand grown (or, when negative, shrunk) around the
/// viewport before intersections are computed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl Default for RootMargin {
    fn default() -> Self {
        Self {
            top: Length::Px(0.0),
            right: Length::Px(0.0),
            bottom: Length::Px(0.0),
            left: Length::Px(0.0),
        }
    }
}

impl RootMargin {
    /// Parse 1 to 4 whitespace-separated `px`/`%` values, CSS order
    pub fn parse(text: &str) -> MotionResult<Self> {
        let values = text
            .split_whitespace()
            .map(Length::parse)
            .collect::<MotionResult<Vec<_>>>()?;

        let (top, right, bottom, left) = match values.as_slice() {
            [a] => (*a, *a, *a, *a),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            _ => {
                return Err(MotionError::configuration(format!(
                    "root margin needs 1 to 4 values, got '{}'",
                    text
                )))
            }
        };
        Ok(Self { top, right, bottom, left })
    }

    /// The viewport rectangle with this margin applied
    pub fn apply(&self, viewport: &Rect) -> Rect {
        let top = self.top.resolve(viewport.height);
        let right = self.right.resolve(viewport.width);
        let bottom = self.bottom.resolve(viewport.height);
        let left = self.left.resolve(viewport.width);
        Rect::new(
            viewport.x - left,
            viewport.y - top,
            viewport.width + left + right,
            viewport.height + top + bottom,
        )
    }
}

/// Fraction of `element` visible inside the margin-adjusted viewport,
/// plus whether the two touch at all
pub fn intersection_ratio(element: &Rect, viewport: &Rect, margin: &RootMargin) -> (f64, bool) {
    let root = margin.apply(viewport);
    match element.intersection(&root) {
        None => (0.0, false),
        Some(overlap) => {
            let area = element.area();
            if area == 0.0 {
                (1.0, true)
            } else {
                ((overlap.area() / area).clamp(0.0, 1.0), true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shorthand() {
        let m = RootMargin::parse("0px 0px -50px 0px").unwrap();
        assert_eq!(m.bottom, Length::Px(-50.0));
        assert_eq!(m.top, Length::Px(0.0));

        let m = RootMargin::parse("10% 5px").unwrap();
        assert_eq!(m.top, Length::Percent(10.0));
        assert_eq!(m.bottom, Length::Percent(10.0));
        assert_eq!(m.left, Length::Px(5.0));

        let m = RootMargin::parse("1px 2px 3px").unwrap();
        assert_eq!(m.left, Length::Px(2.0));
        assert_eq!(m.bottom, Length::Px(3.0));

        assert_eq!(RootMargin::parse("0").unwrap(), RootMargin::default());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(RootMargin::parse("").is_err());
        assert!(RootMargin::parse("10em").is_err());
        assert!(RootMargin::parse("1px 2px 3px 4px 5px").is_err());
        assert!(RootMargin::parse("NaNpx").is_err());
    }

    #[test]
    fn test_negative_bottom_margin_shrinks_viewport() {
        let viewport = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let root = RootMargin::parse("0px 0px -50px 0px").unwrap().apply(&viewport);
        assert_eq!(root, Rect::new(0.0, 0.0, 1000.0, 750.0));
    }

    #[test]
    fn test_ratio_with_margin_bias() {
        let viewport = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let margin = RootMargin::parse("0px 0px -50px 0px").unwrap();

        // 100px tall element poking 60px into the viewport: 10px counted
        let element = Rect::new(0.0, 740.0, 200.0, 100.0);
        let (ratio, intersecting) = intersection_ratio(&element, &viewport, &margin);
        assert!(intersecting);
        assert!((ratio - 0.1).abs() < 1e-9);

        let below = Rect::new(0.0, 760.0, 200.0, 100.0);
        assert_eq!(intersection_ratio(&below, &viewport, &margin), (0.0, false));
    }

    #[test]
    fn test_percent_margin() {
        let viewport = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let root = RootMargin::parse("10%").unwrap().apply(&viewport);
        assert_eq!(root, Rect::new(-100.0, -80.0, 1200.0, 960.0));
    }

    #[test]
    fn test_zero_area_element() {
        let viewport = Rect::new(0.0, 0.0, 100.0, 100.0);
        let dot = Rect::new(50.0, 50.0, 0.0, 0.0);
        assert_eq!(intersection_ratio(&dot, &viewport, &RootMargin::default()), (1.0, true));
    }
}
