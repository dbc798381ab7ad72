use crate::{
    animation::spring::{Spring, SpringParams},
    foundation::{
        core::{Point, Vec2},
        error::{RevealError, RevealResult},
    },
};

/// Tunables for the pointer-following sprite.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CursorConfig {
    pub position_spring: SpringParams,
    /// Lower stiffness than position so the sprite turns with a lag.
    pub angle_spring: SpringParams,
    /// Heavy and overdamped; drives the exhaust flame.
    pub speed_spring: SpringParams,
    /// Square sprite edge in pixels; the sprite is centered on the pointer.
    pub size_px: f64,
    /// Added to the smoothed heading so the artwork faces forward.
    pub rotation_offset_deg: f64,
    /// Largest heading change accepted from one pointer sample.
    pub max_angle_delta_deg: f64,
    /// Pointer travel (px per sample) that maps to full flame.
    pub speed_scale_px: f64,
    /// Parking spot when the pointer leaves the window.
    pub offscreen: Point,
    /// Narrower viewports do not render the sprite.
    pub min_viewport_width: f64,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            position_spring: SpringParams::new(120.0, 18.0, 0.9),
            angle_spring: SpringParams::new(180.0, 26.0, 0.9),
            speed_spring: SpringParams::new(190.0, 118.0, 10.8),
            size_px: 48.0,
            rotation_offset_deg: 45.0,
            max_angle_delta_deg: 45.0,
            speed_scale_px: 60.0,
            offscreen: Point::new(-1000.0, -1000.0),
            min_viewport_width: 700.0,
        }
    }
}

impl CursorConfig {
    pub fn validate(&self) -> RevealResult<()> {
        self.position_spring.validate()?;
        self.angle_spring.validate()?;
        self.speed_spring.validate()?;
        if !self.size_px.is_finite() || self.size_px < 0.0 {
            return Err(RevealError::config("cursor size_px must be finite and >= 0"));
        }
        if !self.max_angle_delta_deg.is_finite() || self.max_angle_delta_deg <= 0.0 {
            return Err(RevealError::config(
                "cursor max_angle_delta_deg must be finite and > 0",
            ));
        }
        if !self.speed_scale_px.is_finite() || self.speed_scale_px <= 0.0 {
            return Err(RevealError::config(
                "cursor speed_scale_px must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// Host facts that decide whether the follower runs at all.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorEnvironment {
    pub touch: bool,
    pub reduced_motion: bool,
    pub viewport_width: f64,
}

impl Default for CursorEnvironment {
    fn default() -> Self {
        Self {
            touch: false,
            reduced_motion: false,
            viewport_width: 1280.0,
        }
    }
}

/// Where and how to draw the sprite this frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CursorPose {
    /// Top-left corner of the sprite.
    pub origin: Point,
    pub rotation_deg: f64,
    /// Flame intensity, `0..=1`.
    pub flame: f64,
    pub visible: bool,
}

#[derive(Clone, Copy, Debug)]
struct LastSample {
    pos: Point,
    heading_deg: Option<f64>,
}

/// A sprite that chases the pointer, turning toward its direction of travel.
///
/// Heading is unwrapped (it may exceed ±180°) so the angle spring always takes the short
/// way round.
#[derive(Clone, Debug)]
pub struct CursorFollower {
    config: CursorConfig,
    env: CursorEnvironment,
    x: Spring,
    y: Spring,
    heading: Spring,
    speed: Spring,
    last: LastSample,
}

impl CursorFollower {
    pub fn new(config: CursorConfig, env: CursorEnvironment) -> RevealResult<Self> {
        config.validate()?;
        let park = config.offscreen;
        Ok(Self {
            x: Spring::new(config.position_spring, park.x),
            y: Spring::new(config.position_spring, park.y),
            heading: Spring::new(config.angle_spring, 0.0),
            speed: Spring::new(config.speed_spring, 0.0),
            last: LastSample {
                pos: park,
                heading_deg: None,
            },
            config,
            env,
        })
    }

    /// Touch devices and reduced-motion users get the native pointer only.
    pub fn is_enabled(&self) -> bool {
        !self.env.touch && !self.env.reduced_motion
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        self.env.viewport_width = width;
    }

    pub fn pointer_moved(&mut self, pos: Point) {
        if !self.is_enabled() {
            return;
        }
        let half = self.config.size_px / 2.0;
        self.x.set_target(pos.x - half);
        self.y.set_target(pos.y - half);

        let d: Vec2 = pos - self.last.pos;
        let raw = d.y.atan2(d.x).to_degrees();
        let prev = self.last.heading_deg.unwrap_or(raw);
        let max = self.config.max_angle_delta_deg;
        let delta = wrap_degrees(raw - prev).clamp(-max, max);
        let heading = prev + delta;

        self.heading.set_target(heading);
        self.speed
            .set_target((d.hypot() / self.config.speed_scale_px).min(1.0));
        self.last = LastSample {
            pos,
            heading_deg: Some(heading),
        };
    }

    pub fn pointer_left(&mut self) {
        if !self.is_enabled() {
            return;
        }
        self.x.set_target(self.config.offscreen.x);
        self.y.set_target(self.config.offscreen.y);
        self.heading.set_target(0.0);
        self.speed.set_target(0.0);
    }

    pub fn step(&mut self, dt_secs: f64) {
        self.x.step(dt_secs);
        self.y.step(dt_secs);
        self.heading.step(dt_secs);
        self.speed.step(dt_secs);
    }

    /// Current pose; `pointer_hidden` is the shared hide-pointer flag.
    pub fn pose(&self, pointer_hidden: bool) -> CursorPose {
        let visible = self.is_enabled()
            && self.env.viewport_width >= self.config.min_viewport_width
            && !pointer_hidden;
        CursorPose {
            origin: Point::new(self.x.value(), self.y.value()),
            rotation_deg: self.heading.value() + self.config.rotation_offset_deg,
            flame: self.speed.value().clamp(0.0, 1.0),
            visible,
        }
    }

    /// Heading target after the latest sample, before smoothing.
    pub fn target_heading_deg(&self) -> f64 {
        self.heading.target()
    }

    pub fn target_flame(&self) -> f64 {
        self.speed.target()
    }
}

/// Map an angle difference into `[-180, 180]`. An exact half turn keeps its direction.
pub fn wrap_degrees(d: f64) -> f64 {
    let w = d.rem_euclid(360.0);
    if w > 180.0 || (w == 180.0 && d < 0.0) {
        w - 360.0
    } else {
        w
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cursor/follower.rs"]
mod tests;
