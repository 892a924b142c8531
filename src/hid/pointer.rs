//! Pointer position tracking for backends that can only emit relative motion.

/// Tracks the pointer a backend drives, clamped to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerTracker {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl PointerTracker {
    /// Starts at the center of a `width` x `height` screen.
    ///
    /// # Examples
    ///
    /// ```
    /// use nunchuk_receiver::hid::pointer::PointerTracker;
    ///
    /// let tracker = PointerTracker::centered(1920, 1080);
    /// assert_eq!(tracker.position(), (960, 540));
    /// ```
    #[must_use]
    pub fn centered(width: i32, height: i32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            x: width / 2,
            y: height / 2,
            width,
            height,
        }
    }

    #[must_use]
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Clamp a target onto the screen.
    #[must_use]
    pub fn clamp(&self, x: i32, y: i32) -> (i32, i32) {
        (x.clamp(0, self.width - 1), y.clamp(0, self.height - 1))
    }

    /// Move towards `(x, y)` in `steps` increments.
    ///
    /// Returns the relative offset of each increment; the offsets sum to the
    /// full (clamped) displacement. Zero-length increments are dropped.
    pub fn glide_to(&mut self, x: i32, y: i32, steps: u32) -> Vec<(i32, i32)> {
        let (tx, ty) = self.clamp(x, y);
        let (sx, sy) = (self.x, self.y);
        let steps = steps.max(1) as i32;

        let mut increments = Vec::with_capacity(steps as usize);
        let (mut px, mut py) = (sx, sy);
        for i in 1..=steps {
            let nx = sx + (tx - sx) * i / steps;
            let ny = sy + (ty - sy) * i / steps;
            if (nx, ny) != (px, py) {
                increments.push((nx - px, ny - py));
            }
            px = nx;
            py = ny;
        }

        self.x = tx;
        self.y = ty;
        increments
    }
}
