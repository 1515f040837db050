//! Flat collection of renderables and lights
//!
//! There is no hierarchy. Insertion order is paint order within a pass.

use crate::scene::renderable::{LightSource, RenderMode, Renderable};
use tracing::debug;

#[derive(Default)]
pub struct Scene {
    renderables: Vec<Box<dyn Renderable>>,
    lights: Vec<Box<dyn LightSource>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_renderable(&mut self, renderable: impl Renderable + 'static) {
        debug!(renderable = renderable.id(), "Added renderable to scene");
        self.renderables.push(Box::new(renderable));
    }

    pub fn add_light(&mut self, light: impl LightSource + 'static) {
        debug!(light = light.id(), "Added light to scene");
        self.lights.push(Box::new(light));
    }

    /// Remove the first renderable with `id`
    pub fn remove_renderable(&mut self, id: &str) -> Option<Box<dyn Renderable>> {
        let index = self.renderables.iter().position(|r| r.id() == id)?;
        Some(self.renderables.remove(index))
    }

    pub fn remove_light(&mut self, id: &str) -> Option<Box<dyn LightSource>> {
        let index = self.lights.iter().position(|l| l.id() == id)?;
        Some(self.lights.remove(index))
    }

    pub fn renderable(&self, id: &str) -> Option<&dyn Renderable> {
        self.renderables
            .iter()
            .find(|r| r.id() == id)
            .map(|r| r.as_ref())
    }

    pub fn renderable_mut(&mut self, id: &str) -> Option<&mut Box<dyn Renderable>> {
        self.renderables.iter_mut().find(|r| r.id() == id)
    }

    pub fn light(&self, id: &str) -> Option<&dyn LightSource> {
        self.lights.iter().find(|l| l.id() == id).map(|l| l.as_ref())
    }

    pub fn light_mut(&mut self, id: &str) -> Option<&mut Box<dyn LightSource>> {
        self.lights.iter_mut().find(|l| l.id() == id)
    }

    pub fn renderables(&self) -> impl Iterator<Item = &dyn Renderable> {
        self.renderables.iter().map(|r| r.as_ref())
    }

    /// Renderables drawn by the pass for `mode`, in insertion order
    pub fn renderables_in(&self, mode: RenderMode) -> impl Iterator<Item = &dyn Renderable> {
        self.renderables().filter(move |r| r.mode() == mode)
    }

    pub fn lights(&self) -> impl Iterator<Item = &dyn LightSource> {
        self.lights.iter().map(|l| l.as_ref())
    }

    pub fn lights_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn LightSource>> {
        self.lights.iter_mut()
    }

    pub fn renderable_count(&self) -> usize {
        self.renderables.len()
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    pub fn clear(&mut self) {
        self.renderables.clear();
        self.lights.clear();
    }
}
