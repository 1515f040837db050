//! G-buffer pass: surface attributes of every deferred renderable

use super::{draw, Renderer};
use crate::error::RenderError;
use crate::scene::{RenderMode, Scene};
use tracing::debug;

impl Renderer {
    pub(super) fn gbuffer_pass(&self, scene: &Scene) -> Result<(), RenderError> {
        let mut encoder = self.command_encoder("G-buffer Encoder");
        {
            let color_attachments: Vec<Option<wgpu::RenderPassColorAttachment>> = self
                .gbuffer
                .targets()
                .iter()
                .map(|target| {
                    Some(wgpu::RenderPassColorAttachment {
                        view: &target.view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                            store: wgpu::StoreOp::Store,
                        },
                    })
                })
                .collect();

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("G-buffer Pass"),
                color_attachments: &color_attachments,
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.gbuffer.depth().view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for renderable in scene.renderables_in(RenderMode::Deferred) {
                let material = renderable.material();
                draw(
                    &mut pass,
                    &self.context.device,
                    material.pipeline(),
                    &material.bindings(),
                    renderable.buffers(),
                    renderable.id(),
                )?;
            }
        }
        self.context.submit(std::iter::once(encoder.finish()));
        debug!("G-buffer pass submitted");
        Ok(())
    }
}
