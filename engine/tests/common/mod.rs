//! Shared helpers for GPU-backed tests

#![allow(dead_code)]

use std::sync::Arc;
use tracing::{info, warn};
use umbra_engine::config::RendererConfig;
use umbra_engine::graphics::{RenderContext, Renderer, ResourceDefaults};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Acquire a device, preferring real hardware and falling back to a software
/// adapter. Returns `None` when the machine has neither, so the caller can
/// skip.
pub fn try_context() -> Option<Arc<RenderContext>> {
    init_tracing();
    for force_fallback in [false, true] {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        match pollster::block_on(RenderContext::with_options(instance, None, force_fallback)) {
            Ok(context) => {
                info!(adapter = %context.adapter_info.name, "Acquired test device");
                return Some(Arc::new(context));
            }
            Err(err) => warn!(error = %err, force_fallback, "No usable adapter"),
        }
    }
    warn!("Skipping GPU test: no adapter available");
    None
}

pub fn defaults(context: &RenderContext) -> ResourceDefaults {
    ResourceDefaults::new(context.device.clone(), context.queue.clone())
}

/// Small renderer config so software adapters stay fast
pub fn small_config() -> RendererConfig {
    let mut config = RendererConfig::default();
    config.shadow.map_size = 256;
    config
}

pub fn offscreen_renderer(width: u32, height: u32) -> Option<Renderer> {
    let context = try_context()?;
    match Renderer::offscreen(context, width, height, small_config()) {
        Ok(renderer) => Some(renderer),
        Err(err) => {
            warn!(error = %err, "Skipping GPU test: renderer creation failed");
            None
        }
    }
}

/// Copy an `Rgba16Float` texture back to the CPU as one `[f32; 4]` per texel
///
/// `width * 8` must be a multiple of 256.
pub fn read_rgba16f(context: &RenderContext, texture: &wgpu::Texture) -> Vec<[f32; 4]> {
    let (width, height) = (texture.width(), texture.height());
    let bytes_per_row = width * 8;
    assert_eq!(bytes_per_row % wgpu::COPY_BYTES_PER_ROW_ALIGNMENT, 0);

    let buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Buffer"),
        size: (bytes_per_row * height) as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    let mut encoder = context.create_command_encoder(Some("Readback Encoder"));
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    context.submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    context.device.poll(wgpu::PollType::Wait).unwrap();
    receiver.recv().unwrap().unwrap();

    let texels = slice
        .get_mapped_range()
        .chunks_exact(8)
        .map(|texel| {
            let channel =
                |i: usize| f16_to_f32(u16::from_le_bytes([texel[i * 2], texel[i * 2 + 1]]));
            [channel(0), channel(1), channel(2), channel(3)]
        })
        .collect();
    buffer.unmap();
    texels
}

fn f16_to_f32(bits: u16) -> f32 {
    let sign = if bits & 0x8000 != 0 { -1.0 } else { 1.0 };
    let exponent = (bits >> 10) & 0x1f;
    let mantissa = (bits & 0x3ff) as f32;
    match exponent {
        0 => sign * mantissa * 2f32.powi(-24),
        0x1f if mantissa == 0.0 => sign * f32::INFINITY,
        0x1f => f32::NAN,
        _ => sign * (1.0 + mantissa / 1024.0) * 2f32.powi(exponent as i32 - 15),
    }
}
