//! Shadow pass: depth of every shadow caster as seen from each light

use super::{draw, Renderer};
use crate::error::RenderError;
use crate::graphics::bindings::BindingSet;
use crate::scene::{RenderMode, Scene};
use tracing::debug;

impl Renderer {
    /// Refit each light to the camera, then render its shadow map
    pub(super) fn shadow_pass(&self, scene: &mut Scene) -> Result<(), RenderError> {
        let queue = &self.context.queue;
        for light in scene.lights_mut() {
            light.update(queue, &self.camera, &self.config.shadow);
        }

        for light in scene.lights() {
            let mut encoder = self.command_encoder("Shadow Encoder");
            {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Shadow Pass"),
                    color_attachments: &[],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &light.depth_texture().view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });

                let casters = scene
                    .renderables_in(RenderMode::Deferred)
                    .filter(|renderable| renderable.cast_shadows());
                for renderable in casters {
                    let mut bindings = BindingSet::new();
                    bindings
                        .push_uniform(renderable.camera_buffer())
                        .push_uniform(light.projection_view_buffer());
                    draw(
                        &mut pass,
                        &self.context.device,
                        light.pipeline(),
                        &bindings,
                        renderable.buffers(),
                        renderable.id(),
                    )?;
                }
            }
            self.context.submit(std::iter::once(encoder.finish()));
            debug!(light = light.id(), "Shadow pass submitted");
        }
        Ok(())
    }
}
