//! Free-flight perspective camera
//!
//! Yaw and pitch accumulate from pointer movement, position integrates from
//! held keys. The projection uses an infinite far plane and is rebuilt
//! whenever fov or viewport size change.

use crate::config::CameraConfig;
use crate::input::InputState;
use glam::{Mat4, Vec2, Vec3};
use winit::keyboard::KeyCode;

#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    look: Vec3,
    yaw: f32,
    pitch: f32,
    fov_degrees: f32,
    width: u32,
    height: u32,
    projection: Mat4,
    config: CameraConfig,
}

impl Camera {
    pub fn new(width: u32, height: u32, config: CameraConfig) -> Self {
        let mut camera = Self {
            position: Vec3::from_array(config.position),
            look: Vec3::NEG_Z,
            yaw: 0.0,
            pitch: 0.0,
            fov_degrees: config.fov_degrees,
            width: width.max(1),
            height: height.max(1),
            projection: Mat4::IDENTITY,
            config,
        };
        camera.look_at(Vec3::from_array(camera.config.look));
        camera.update_projection();
        camera
    }

    fn update_projection(&mut self) {
        self.projection = Mat4::perspective_infinite_rh(
            self.fov_degrees.to_radians(),
            self.aspect(),
            self.config.near,
        );
    }

    /// Integrate one frame of input and return `projection * view`
    pub fn update(&mut self, input: &InputState, delta_ms: f32) -> Mat4 {
        self.rotate(input.pointer_delta(), delta_ms);
        self.translate(input, delta_ms);
        self.view_projection()
    }

    fn rotate(&mut self, delta: Vec2, delta_ms: f32) {
        if delta == Vec2::ZERO {
            return;
        }
        let speed = self.config.rotation_speed * delta_ms;
        self.yaw += delta.x * speed;
        self.pitch = (self.pitch - delta.y * speed)
            .clamp(-self.config.pitch_limit, self.config.pitch_limit);
        self.look = direction_from_angles(self.yaw, self.pitch);
    }

    fn translate(&mut self, input: &InputState, delta_ms: f32) {
        let multiplier = if input.is_sprinting() {
            self.config.sprint_multiplier
        } else {
            1.0
        };
        let step = self.config.move_speed * delta_ms * multiplier;
        let right = self.look.cross(Vec3::Y).normalize_or_zero();

        if input.is_key_pressed(KeyCode::KeyW) {
            self.position += self.look * step;
        }
        if input.is_key_pressed(KeyCode::KeyS) {
            self.position -= self.look * step;
        }
        if input.is_key_pressed(KeyCode::KeyA) {
            self.position -= right * step;
        }
        if input.is_key_pressed(KeyCode::KeyD) {
            self.position += right * step;
        }
    }

    /// Point the camera along `direction` and resync yaw and pitch with it
    pub fn look_at(&mut self, direction: Vec3) {
        let Some(direction) = direction.try_normalize() else {
            return;
        };
        self.pitch = direction
            .y
            .asin()
            .clamp(-self.config.pitch_limit, self.config.pitch_limit);
        self.yaw = direction.z.atan2(direction.x);
        self.look = direction_from_angles(self.yaw, self.pitch);
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_fov(&mut self, fov_degrees: f32) {
        self.fov_degrees = fov_degrees;
        self.update_projection();
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.update_projection();
    }

    pub fn set_width(&mut self, width: u32) {
        self.set_size(width, self.height);
    }

    pub fn set_height(&mut self, height: u32) {
        self.set_size(self.width, height);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn look(&self) -> Vec3 {
        self.look
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn fov(&self) -> f32 {
        self.fov_degrees
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.look, Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view()
    }
}

fn direction_from_angles(yaw: f32, pitch: f32) -> Vec3 {
    Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
}
