//! Material, default resource and pipeline contract tests

mod common;

use std::sync::Arc;
use umbra_engine::error::RenderError;
use umbra_engine::graphics::bindings::BindingSet;
use umbra_engine::graphics::{
    BufferSet, GpuTexture, ImageData, Material, MaterialDesc, MeshData, PipelineState,
    RendererPipelines, TextureSlot, VertexLayoutBuilder,
};
use umbra_engine::scene::{MeshRenderable, RenderMode, Renderable, SHADOW_FORMAT};
use umbra_engine::shaders::ShaderProgram;

#[test]
fn test_defaults_initialize_once() {
    let Some(context) = common::try_context() else {
        return;
    };
    let defaults = common::defaults(&context);
    assert!(!defaults.is_initialized());

    let first = defaults.get() as *const _;
    let second = defaults.get() as *const _;
    assert!(defaults.is_initialized());
    assert_eq!(first, second);

    let resources = defaults.get();
    for slot in TextureSlot::ALL {
        assert_eq!(resources.texture(slot).size(), (1, 1));
        assert!(Arc::ptr_eq(resources.texture(slot), defaults.get().texture(slot)));
    }
    for name in ["position", "tex_coord", "normal", "tangent"] {
        assert!(resources.vertex_buffer(name).is_some(), "no default for {name}");
    }
    assert!(resources.vertex_buffer("joints").is_none());
}

#[test]
fn test_material_back_fills_every_slot() {
    let Some(context) = common::try_context() else {
        return;
    };
    let defaults = common::defaults(&context);
    let pipelines = RendererPipelines::new(&context.device, wgpu::TextureFormat::Rgba8UnormSrgb)
        .unwrap();

    let albedo = Arc::new(GpuTexture::from_image(
        &context.device,
        &context.queue,
        "albedo",
        &ImageData::solid([200, 10, 10, 255]),
        TextureSlot::Color.texture_format(),
    ));
    let desc = MaterialDesc::default().with_texture(TextureSlot::Color, albedo.clone());
    let material = Material::create(pipelines.gbuffer.clone(), desc, &defaults);

    assert!(material.is_provided(TextureSlot::Color));
    assert!(Arc::ptr_eq(material.texture(TextureSlot::Color).unwrap(), &albedo));
    for slot in TextureSlot::ALL {
        assert!(material.texture(slot).is_some());
        assert!(material.sampler(slot).is_some());
    }
    for slot in [
        TextureSlot::Normal,
        TextureSlot::Emissive,
        TextureSlot::MetallicRoughness,
        TextureSlot::Occlusion,
    ] {
        assert!(!material.is_provided(slot));
        assert!(Arc::ptr_eq(
            material.texture(slot).unwrap(),
            defaults.get().texture(slot)
        ));
    }
}

#[test]
fn test_slot_swaps_restore_the_material() {
    let Some(context) = common::try_context() else {
        return;
    };
    let defaults = common::defaults(&context);
    let pipelines = RendererPipelines::new(&context.device, wgpu::TextureFormat::Rgba8UnormSrgb)
        .unwrap();
    let mut material =
        Material::create(pipelines.gbuffer.clone(), MaterialDesc::default(), &defaults);
    let original_normal = material.texture(TextureSlot::Normal).unwrap().clone();
    let original_samplers = material.samplers().to_vec();

    let bumps = Arc::new(GpuTexture::from_image(
        &context.device,
        &context.queue,
        "bumps",
        &ImageData::solid([128, 128, 255, 255]),
        TextureSlot::Normal.texture_format(),
    ));
    let previous = material.swap_texture(TextureSlot::Normal, bumps.clone()).unwrap();
    assert!(Arc::ptr_eq(material.texture(TextureSlot::Normal).unwrap(), &bumps));
    material.swap_texture(TextureSlot::Normal, previous);
    assert!(Arc::ptr_eq(
        material.texture(TextureSlot::Normal).unwrap(),
        &original_normal
    ));

    let emptied = material.swap_samplers(Vec::new());
    assert!(material.samplers().is_empty());
    material.swap_samplers(emptied);
    assert_eq!(material.samplers().len(), original_samplers.len());
    for (restored, original) in material.samplers().iter().zip(&original_samplers) {
        assert!(Arc::ptr_eq(restored, original));
    }

    // A raw material has no semantic slots to swap
    let mut raw = Material::raw(
        pipelines.gbuffer.clone(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
    );
    assert!(raw.swap_texture(TextureSlot::Normal, bumps).is_none());
}

#[test]
fn test_renderables_share_pipeline_state() {
    let Some(renderer) = common::offscreen_renderer(32, 32) else {
        return;
    };
    let a = renderer
        .create_mesh(&MeshData::cube("a", 1.0), RenderMode::Deferred)
        .unwrap();
    let b = renderer
        .create_mesh(&MeshData::sphere("b", 1.0, 8, 4), RenderMode::Deferred)
        .unwrap();
    assert!(Arc::ptr_eq(a.material().pipeline(), b.material().pipeline()));

    let mut double_sided = MeshData::plane("c", 1.0, 1.0);
    double_sided.double_sided = true;
    let c = renderer.create_mesh(&double_sided, RenderMode::Deferred).unwrap();
    assert_eq!(c.material().pipeline().primitive().cull_mode, None);
    assert_eq!(
        a.material().pipeline().primitive().cull_mode,
        Some(wgpu::Face::Back)
    );
}

#[test]
fn test_with_material_restores_original() {
    let Some(renderer) = common::offscreen_renderer(32, 32) else {
        return;
    };
    let mut cube = renderer
        .create_mesh(&MeshData::cube("cube", 1.0), RenderMode::Deferred)
        .unwrap();
    let original = cube.material().pipeline().clone();

    let substitute = Material::raw(
        renderer.pipelines().shadow.clone(),
        vec![cube.material().uniform_buffer(0).unwrap().clone()],
        Vec::new(),
        Vec::new(),
    );
    let (seen, returned) = cube.with_material(substitute, |renderable| {
        renderable.material().pipeline().id().to_string()
    });

    assert_eq!(seen, "shadow");
    assert_eq!(returned.pipeline().id(), "shadow");
    assert!(Arc::ptr_eq(cube.material().pipeline(), &original));
}

#[test]
fn test_swap_material_round_trip() {
    let Some(renderer) = common::offscreen_renderer(32, 32) else {
        return;
    };
    let mut cube = renderer
        .create_mesh(&MeshData::cube("cube", 1.0), RenderMode::Deferred)
        .unwrap();
    let forward = renderer
        .create_mesh(&MeshData::cube("other", 1.0), RenderMode::Forward)
        .unwrap();

    let previous = cube.swap_material(forward.material().clone());
    assert_eq!(cube.material().pipeline().id(), "forward");
    let forward_material = cube.swap_material(previous);
    assert_eq!(forward_material.pipeline().id(), "forward");
    assert_eq!(cube.material().pipeline().id(), "gbuffer");
}

#[test]
fn test_realized_pipeline_rejects_changes() {
    let Some(context) = common::try_context() else {
        return;
    };
    let mut pipeline = PipelineState::new(
        "shadow_probe",
        ShaderProgram::Shadow.create_module(&context.device),
        umbra_engine::graphics::VertexLayout::position_only().unwrap(),
        umbra_engine::graphics::BindingSignature::new(2),
    )
    .with_depth_format(SHADOW_FORMAT);

    pipeline
        .set_depth_compare(wgpu::CompareFunction::LessEqual)
        .unwrap();
    assert!(!pipeline.is_realized());

    pipeline.realize(&context.device);
    assert!(pipeline.is_realized());
    let err = pipeline.set_depth_write_enabled(false).unwrap_err();
    assert!(matches!(err, RenderError::PipelineRealized(id) if id == "shadow_probe"));
}

#[test]
fn test_missing_vertex_attribute_is_reported() {
    let Some(context) = common::try_context() else {
        return;
    };
    let defaults = common::defaults(&context);
    let buffers = BufferSet::from_mesh_data(&MeshData::cube("crate", 1.0), &defaults).unwrap();

    let layout = VertexLayoutBuilder::new()
        .add("position", wgpu::VertexFormat::Float32x3, false)
        .and_then(|builder| builder.add("joints", wgpu::VertexFormat::Uint16x4, false))
        .unwrap()
        .end();

    let err = buffers.resolve(&layout, "crate").unwrap_err();
    match err {
        RenderError::MissingVertexAttribute {
            renderable,
            attribute,
        } => {
            assert_eq!(renderable, "crate");
            assert_eq!(attribute, "joints");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_absent_attributes_resolve_to_defaults() {
    let Some(context) = common::try_context() else {
        return;
    };
    let defaults = common::defaults(&context);
    let mesh = MeshData::new("bare", vec![0.0; 9], vec![0, 1, 2]);
    let buffers = BufferSet::from_mesh_data(&mesh, &defaults).unwrap();

    assert!(buffers.has_attribute("position"));
    assert!(!buffers.has_attribute("tangent"));
    let resolved = buffers
        .resolve(&umbra_engine::graphics::VertexLayout::canonical().unwrap(), "bare")
        .unwrap();
    assert_eq!(resolved.len(), 4);
    assert!(Arc::ptr_eq(
        buffers.buffer("tangent").unwrap(),
        defaults.get().vertex_buffer("tangent").unwrap()
    ));
}

#[test]
fn test_bind_group_mismatch_is_reported() {
    let Some(renderer) = common::offscreen_renderer(32, 32) else {
        return;
    };
    let cube = renderer
        .create_mesh(&MeshData::cube("cube", 1.0), RenderMode::Deferred)
        .unwrap();

    // The G-buffer material satisfies its own pipeline but not the forward one
    let expected = RendererPipelines::gbuffer_signature().group_sizes();
    cube.bindings().validate("gbuffer", &expected).unwrap();

    let forward = RendererPipelines::forward_signature().group_sizes();
    let err = cube.bindings().validate("forward", &forward).unwrap_err();
    assert!(matches!(
        err,
        RenderError::BindGroupMismatch { group: 0, expected: 4, actual: 2, .. }
    ));

    let mut partial = BindingSet::new();
    partial.push_uniform(cube.camera_buffer());
    assert!(partial.validate("gbuffer", &expected).is_err());
}

#[test]
fn test_mesh_renderable_wraps_uploaded_resources() {
    let Some(renderer) = common::offscreen_renderer(32, 32) else {
        return;
    };
    let defaults = renderer.defaults();
    let buffers = BufferSet::from_mesh_data(&MeshData::quad("panel", 1.0), defaults).unwrap();
    let material = Material::create(
        renderer.pipelines().gbuffer.clone(),
        MaterialDesc::default(),
        defaults,
    );

    let panel = MeshRenderable::new(
        &renderer.context().device,
        "panel",
        buffers,
        material,
        RenderMode::Deferred,
    );
    assert_eq!(panel.id(), "panel");
    assert!(std::ptr::eq(
        panel.camera_buffer(),
        panel.material().uniform_buffer(0).unwrap().as_ref()
    ));
    assert!(panel.cast_shadows());
    assert!(panel.receive_shadows());
}
