//! Render target abstraction for off-screen rendering
//!
//! Lets the renderer composite into a texture instead of a window surface,
//! which is how headless runs and tests drive the full frame.

use crate::graphics::texture::GpuTexture;

/// A color texture the composite pass can render into
#[derive(Debug)]
pub struct RenderTarget {
    color: GpuTexture,
}

impl RenderTarget {
    pub const DEFAULT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    /// Create a new render target with the specified dimensions and format
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            color: Self::allocate(device, width, height, format),
        }
    }

    fn allocate(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> GpuTexture {
        GpuTexture::new_2d(
            device,
            "Render Target Texture",
            width.max(1),
            height.max(1),
            format,
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
        )
    }

    /// Reallocate the color texture at a new size
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.color.size == (width, height) {
            return;
        }
        self.color.destroy();
        self.color = Self::allocate(device, width, height, self.color.format);
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.color.view
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.color.texture
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.color.format
    }

    pub fn size(&self) -> (u32, u32) {
        self.color.size
    }
}
