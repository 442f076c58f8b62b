use crate::{input::Input, math::uv};

/// A perspective projection determining the area of space to draw.
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveCamera {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// World-space position, driven by [`OrbitControls`] every frame.
    pub position: uv::Vec3,
}

impl PerspectiveCamera {
    pub fn new(fov_y_degrees: f32, viewport_size: (u32, u32), z_near: f32, z_far: f32) -> Self {
        Self {
            fov_y: fov_y_degrees.to_radians(),
            aspect: viewport_size.0 as f32 / viewport_size.1 as f32,
            z_near,
            z_far,
            position: uv::Vec3::zero(),
        }
    }

    /// Recompute the aspect ratio for a new viewport size.
    /// Repeated calls with the same size are no-ops.
    pub fn set_viewport_size(&mut self, viewport_size: (u32, u32)) {
        self.aspect = viewport_size.0 as f32 / viewport_size.1 as f32;
    }

    pub fn projection_matrix(&self) -> uv::Mat4 {
        uv::projection::perspective_wgpu_dx(self.fov_y, self.aspect, self.z_near, self.z_far)
    }

    pub fn view_matrix(&self, target: uv::Vec3) -> uv::Mat4 {
        uv::Mat4::look_at(self.position, target, uv::Vec3::unit_y())
    }

    /// The full camera matrix used for rendering.
    pub fn view_proj_matrix(&self, target: uv::Vec3) -> uv::Mat4 {
        self.projection_matrix() * self.view_matrix(target)
    }
}

// pitch is kept away from straight up/down
// where the orbit's up vector would degenerate
const PITCH_LIMIT: f32 = 0.01;

/// Interactive camera manipulation pivoting around a target point.
///
/// Pointer input moves a goal state (left drag orbits, right drag pans,
/// scroll zooms); the visible state approaches the goal with exponential
/// damping every frame, like the controls the scene originally shipped with.
#[derive(Debug, Clone, Copy)]
pub struct OrbitControls {
    /// Point the camera orbits around and looks at.
    pub target: uv::Vec3,
    yaw: f32,
    pitch: f32,
    radius: f32,
    goal_target: uv::Vec3,
    goal_yaw: f32,
    goal_pitch: f32,
    goal_radius: f32,
    /// Fraction of the remaining distance to the goal state
    /// covered per 60 Hz step.
    pub damping: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_radius: f32,
    pub max_radius: f32,
}

impl OrbitControls {
    /// Create controls positioning the camera at `position`,
    /// orbiting around `target`.
    pub fn new(position: uv::Vec3, target: uv::Vec3) -> Self {
        let offset = position - target;
        let radius = offset.mag().max(f32::EPSILON);
        let yaw = offset.x.atan2(offset.z);
        let pitch = (offset.y / radius).clamp(-1.0, 1.0).acos();
        Self {
            target,
            yaw,
            pitch,
            radius,
            goal_target: target,
            goal_yaw: yaw,
            goal_pitch: pitch,
            goal_radius: radius,
            damping: 0.05,
            rotate_speed: 0.005,
            pan_speed: 0.002,
            zoom_speed: 0.001,
            min_radius: 0.5,
            max_radius: 100.0,
        }
    }

    /// Feed the frame's pointer input into the goal state.
    pub fn handle_input(&mut self, input: &Input) {
        let (dx, dy) = input.cursor_delta();
        if input.button_held(winit::event::MouseButton::Left) {
            self.goal_yaw -= dx * self.rotate_speed;
            self.goal_pitch = (self.goal_pitch - dy * self.rotate_speed)
                .clamp(PITCH_LIMIT, std::f32::consts::PI - PITCH_LIMIT);
        } else if input.button_held(winit::event::MouseButton::Right) {
            // pan in the camera plane
            let fwd = (self.target - self.camera_position()).normalized();
            let right = fwd.cross(uv::Vec3::unit_y()).normalized();
            let up = right.cross(fwd);
            let scale = self.pan_speed * self.radius;
            self.goal_target += right * (-dx * scale) + up * (dy * scale);
        }

        let scroll = input.scroll_delta();
        if scroll != 0.0 {
            let new_radius = (1.0 + scroll * -self.zoom_speed) * self.goal_radius;
            self.goal_radius = new_radius.clamp(self.min_radius, self.max_radius);
        }
    }

    /// Advance the damped approach toward the goal state by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        // framerate-independent exponential damping
        let k = 1.0 - (1.0 - self.damping).powf(dt * 60.0);
        self.yaw += (self.goal_yaw - self.yaw) * k;
        self.pitch += (self.goal_pitch - self.pitch) * k;
        self.radius += (self.goal_radius - self.radius) * k;
        self.target += (self.goal_target - self.target) * k;
    }

    /// Re-aim the controls at a new target point,
    /// approached smoothly by subsequent [`update`][Self::update]s.
    pub fn set_target(&mut self, target: uv::Vec3) {
        self.goal_target = target;
    }

    /// Apply the goal state immediately, skipping the damped approach.
    pub fn snap(&mut self) {
        self.target = self.goal_target;
        self.yaw = self.goal_yaw;
        self.pitch = self.goal_pitch;
        self.radius = self.goal_radius;
    }

    /// Where the camera currently sits, in world space.
    pub fn camera_position(&self) -> uv::Vec3 {
        let offset = uv::Vec3::new(
            self.radius * self.pitch.sin() * self.yaw.sin(),
            self.radius * self.pitch.cos(),
            self.radius * self.pitch.sin() * self.yaw.cos(),
        );
        self.target + offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_resizes_with_unchanged_dimensions_do_not_drift() {
        let mut camera = PerspectiveCamera::new(60.0, (1920, 1080), 0.1, 1000.0);
        let initial_aspect = camera.aspect;
        let initial_proj = camera.projection_matrix();
        for _ in 0..100 {
            camera.set_viewport_size((1920, 1080));
        }
        assert_eq!(camera.aspect, initial_aspect);
        assert_eq!(
            camera.projection_matrix().cols[0].x,
            initial_proj.cols[0].x
        );
    }

    #[test]
    fn resize_recomputes_aspect() {
        let mut camera = PerspectiveCamera::new(60.0, (1920, 1080), 0.1, 1000.0);
        camera.set_viewport_size((800, 600));
        assert_eq!(camera.aspect, 800.0 / 600.0);
    }

    #[test]
    fn camera_position_round_trips_through_spherical_offset() {
        let position = uv::Vec3::new(0.0, 2.0, 6.0);
        let controls = OrbitControls::new(position, uv::Vec3::zero());
        let back = controls.camera_position();
        assert!((back - position).mag() < 1e-4);
    }

    #[test]
    fn damping_converges_on_a_new_target() {
        let mut controls = OrbitControls::new(uv::Vec3::new(0.0, 2.0, 6.0), uv::Vec3::zero());
        let goal = uv::Vec3::new(3.0, 1.0, -2.0);
        controls.set_target(goal);
        // target moves smoothly, not instantly
        controls.update(1.0 / 60.0);
        assert!((controls.target - goal).mag() > 1e-3);
        for _ in 0..600 {
            controls.update(1.0 / 60.0);
        }
        assert!((controls.target - goal).mag() < 1e-3);
    }

    #[test]
    fn snap_applies_the_goal_immediately() {
        let mut controls = OrbitControls::new(uv::Vec3::new(0.0, 2.0, 6.0), uv::Vec3::zero());
        let goal = uv::Vec3::new(3.0, 1.0, -2.0);
        controls.set_target(goal);
        controls.snap();
        assert!((controls.target - goal).mag() < 1e-6);
    }
}
