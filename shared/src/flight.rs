//! Smooth zoom-and-pan flights between two viewports.
//!
//! Follows van Wijk & Nuij's optimal path: long hops zoom out, travel, then zoom back in.

use crate::geo::{Point, project, unproject};
use crate::viewport::{ScreenSize, Viewport};

const RHO: f64 = 1.42;
const RHO2: f64 = RHO * RHO;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightFrame {
    pub viewport: Viewport,
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct Flight {
    target: Viewport,
    start_zoom: f64,
    from: Point,
    to: Point,
    w0: f64,
    u1: f64,
    r0: f64,
    total_s: f64,
    start_ms: f64,
    duration_ms: f64,
    stationary: bool,
}

fn ease_out(t: f64) -> f64 {
    1.0 - (1.0 - t).powf(1.5)
}

impl Flight {
    pub fn new(
        from: Viewport,
        target: Viewport,
        size: ScreenSize,
        start_ms: f64,
        duration_secs: f64,
    ) -> Self {
        let start_zoom = from.zoom;
        let from_px = project(from.center, start_zoom);
        let to_px = project(target.center, start_zoom);

        let w0 = size.width.max(size.height).max(1.0);
        let w1 = w0 * (start_zoom - target.zoom).exp2();
        let dist = from_px.distance_to(to_px);
        let u1 = if dist > 0.0 { dist } else { 1.0 };

        let r = |second: bool| {
            let s1 = if second { -1.0 } else { 1.0 };
            let s2 = if second { w1 } else { w0 };
            let t1 = w1 * w1 - w0 * w0 + s1 * RHO2 * RHO2 * u1 * u1;
            let b1 = 2.0 * s2 * RHO2 * u1;
            let b = t1 / b1;
            let sq = (b * b + 1.0).sqrt() - b;
            if sq < 1e-9 { -18.0 } else { sq.ln() }
        };
        let r0 = r(false);
        let total_s = (r(true) - r0) / RHO;

        Self {
            target,
            start_zoom,
            from: from_px,
            to: to_px,
            w0,
            u1,
            r0,
            total_s,
            start_ms,
            duration_ms: (duration_secs * 1000.0).max(1.0),
            stationary: dist < 0.5 && (start_zoom - target.zoom).abs() < 1e-6,
        }
    }

    pub fn target(&self) -> Viewport {
        self.target
    }

    fn w(&self, s: f64) -> f64 {
        self.w0 * (self.r0.cosh() / (self.r0 + RHO * s).cosh())
    }

    fn u(&self, s: f64) -> f64 {
        self.w0 * (self.r0.cosh() * (self.r0 + RHO * s).tanh() - self.r0.sinh()) / RHO2
    }

    pub fn sample(&self, now_ms: f64) -> FlightFrame {
        let t = (now_ms - self.start_ms) / self.duration_ms;
        if self.stationary || t > 1.0 {
            return FlightFrame {
                viewport: self.target,
                finished: true,
            };
        }
        let t = t.max(0.0);
        let s = ease_out(t) * self.total_s;
        let k = self.u(s) / self.u1;
        let px = Point::new(
            self.from.x + (self.to.x - self.from.x) * k,
            self.from.y + (self.to.y - self.from.y) * k,
        );
        let zoom = self.start_zoom + (self.w0 / self.w(s)).log2();
        FlightFrame {
            viewport: Viewport {
                center: unproject(px, self.start_zoom),
                zoom,
            },
            finished: false,
        }
    }
}
