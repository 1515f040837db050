//! GPU texture wrapper and sampler descriptions

use serde::{Deserialize, Serialize};

/// A texture together with its default view
#[derive(Debug)]
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub format: wgpu::TextureFormat,
    pub size: (u32, u32),
}

impl GpuTexture {
    /// Create an uninitialized 2D texture
    pub fn new_2d(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            format,
            size: (width, height),
        }
    }

    /// Create a depth texture that can also be sampled
    pub fn depth(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        Self::new_2d(
            device,
            label,
            width,
            height,
            format,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        )
    }

    /// Upload decoded RGBA8 pixels
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: &ImageData,
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = Self::new_2d(
            device,
            label,
            image.width,
            image.height,
            format,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        );

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
        );

        texture
    }

    /// 1x1 texture filled with a single color
    pub fn solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        rgba: [u8; 4],
    ) -> Self {
        Self::from_image(
            device,
            queue,
            label,
            &ImageData::solid(rgba),
            wgpu::TextureFormat::Rgba8Unorm,
        )
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Release GPU memory now instead of when the last handle drops
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

/// Decoded image handed over by the asset loader
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 rows
    pub rgba: Vec<u8>,
}

impl ImageData {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn solid(rgba: [u8; 4]) -> Self {
        Self::new(1, 1, rgba.to_vec())
    }

    /// Whether the pixel buffer matches the declared dimensions
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.rgba.len() == (self.width as usize) * (self.height as usize) * 4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WrapMode {
    #[default]
    Repeat,
    MirrorRepeat,
    ClampToEdge,
}

impl From<WrapMode> for wgpu::AddressMode {
    fn from(mode: WrapMode) -> Self {
        match mode {
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
            WrapMode::MirrorRepeat => wgpu::AddressMode::MirrorRepeat,
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FilterSpec {
    Nearest,
    #[default]
    Linear,
}

impl From<FilterSpec> for wgpu::FilterMode {
    fn from(filter: FilterSpec) -> Self {
        match filter {
            FilterSpec::Nearest => wgpu::FilterMode::Nearest,
            FilterSpec::Linear => wgpu::FilterMode::Linear,
        }
    }
}

/// Wrap and filter settings for a material texture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplerSpec {
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
    pub mag_filter: FilterSpec,
    pub min_filter: FilterSpec,
    pub mipmap_filter: FilterSpec,
    pub anisotropy: u16,
}

impl Default for SamplerSpec {
    fn default() -> Self {
        Self {
            wrap_u: WrapMode::Repeat,
            wrap_v: WrapMode::Repeat,
            mag_filter: FilterSpec::Linear,
            min_filter: FilterSpec::Linear,
            mipmap_filter: FilterSpec::Linear,
            anisotropy: 1,
        }
    }
}

impl SamplerSpec {
    pub fn anisotropic(anisotropy: u16) -> Self {
        Self {
            anisotropy,
            ..Self::default()
        }
    }

    /// Anisotropy is only legal when every filter is linear; otherwise it
    /// is dropped to 1
    pub fn effective_anisotropy(&self) -> u16 {
        let all_linear = self.mag_filter == FilterSpec::Linear
            && self.min_filter == FilterSpec::Linear
            && self.mipmap_filter == FilterSpec::Linear;
        if all_linear {
            self.anisotropy.clamp(1, 16)
        } else {
            1
        }
    }

    pub fn create_sampler(&self, device: &wgpu::Device, label: &str) -> wgpu::Sampler {
        device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: self.wrap_u.into(),
            address_mode_v: self.wrap_v.into(),
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: self.mag_filter.into(),
            min_filter: self.min_filter.into(),
            mipmap_filter: self.mipmap_filter.into(),
            anisotropy_clamp: self.effective_anisotropy(),
            ..Default::default()
        })
    }
}

/// Sampler for depth-comparison lookups into a shadow map
pub fn create_comparison_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        compare: Some(wgpu::CompareFunction::Less),
        ..Default::default()
    })
}
