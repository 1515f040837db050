//! Composite pass: lights the G-buffer into the output, then draws forward
//! renderables on top against the same depth buffer

use super::{draw, Renderer};
use crate::error::RenderError;
use crate::graphics::bindings::BindingSet;
use crate::graphics::uniform::{CameraUniform, UniformBuffer};
use crate::scene::{LightSource, RenderMode, Scene};
use glam::{Mat4, Vec3};
use tracing::debug;

/// Shadow resources of the light used for shading
struct ShadowBindings<'a> {
    depth: &'a wgpu::TextureView,
    projection_view: &'a wgpu::Buffer,
    sampler: &'a wgpu::Sampler,
}

impl Renderer {
    pub(super) fn composite_pass(
        &self,
        scene: &Scene,
        target: &wgpu::TextureView,
    ) -> Result<(), RenderError> {
        let queue = &self.context.queue;
        let light = scene.lights().next();
        let shadow = self.shadow_bindings(light);

        let direction = light.map(|light| light.direction()).unwrap_or(Vec3::Y);
        self.light_settings
            .to_uniform(direction, light.is_some())
            .update_buffer(queue, &self.light_uniform);
        CameraUniform::new(
            self.camera.projection(),
            self.camera.view(),
            Mat4::IDENTITY,
            self.camera.position(),
        )
        .update_buffer(queue, &self.quad_camera);

        let mut encoder = self.command_encoder("Composite Encoder");
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Composite Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let mut quad = BindingSet::new();
            quad.push_uniform(&self.quad_camera)
                .push_uniform(&self.light_uniform)
                .push_uniform(&self.settings_uniform)
                .push_uniform(shadow.projection_view);
            for texture in self.gbuffer.resolve_textures() {
                quad.push_texture(&texture.view);
            }
            quad.push_texture(shadow.depth)
                .push_sampler(shadow.sampler);
            draw(
                &mut pass,
                &self.context.device,
                &self.pipelines.composite,
                &quad,
                &self.quad,
                "composite_quad",
            )?;

            for renderable in scene.renderables_in(RenderMode::Forward) {
                let material = renderable.material();
                let mut bindings = material.bindings();
                bindings
                    .insert_uniform(1, &self.light_uniform)
                    .push_uniform(shadow.projection_view)
                    .push_texture(shadow.depth)
                    .push_sampler(shadow.sampler);
                draw(
                    &mut pass,
                    &self.context.device,
                    material.pipeline(),
                    &bindings,
                    renderable.buffers(),
                    renderable.id(),
                )?;
            }
        }
        self.context.submit(std::iter::once(encoder.finish()));
        debug!(debug_view = ?self.debug_view, "Composite pass submitted");
        Ok(())
    }

    fn shadow_bindings<'a>(&'a self, light: Option<&'a dyn LightSource>) -> ShadowBindings<'a> {
        match light {
            Some(light) => ShadowBindings {
                depth: &light.depth_texture().view,
                projection_view: light.projection_view_buffer(),
                sampler: light.comparison_sampler(),
            },
            None => ShadowBindings {
                depth: &self.shadow_fallback.depth.view,
                projection_view: &self.shadow_fallback.projection_view,
                sampler: &self.shadow_fallback.sampler,
            },
        }
    }
}
