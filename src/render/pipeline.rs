use web_sys::{
    WebGl2RenderingContext, WebGlBuffer, WebGlFramebuffer, WebGlProgram, WebGlRenderbuffer,
    WebGlTexture, WebGlUniformLocation, WebGlVertexArrayObject,
};

use super::camera::OrbitCamera;
use super::shaders::*;
use super::webgl::WebGLContext;
use crate::config::RenderConfig;
use crate::error::Result;
use crate::math::{Color, Vec3};
use crate::mesh::{primitives, Mesh, VERTEX_STRIDE};
use crate::populations::{Population, INSTANCE_STRIDE, POINT_STRIDE};
use crate::scene::Scene;

type GL = WebGl2RenderingContext;

/// Fixed studio lighting around the tree
struct Lighting {
    ambient: Color,
    environment: Color,
    key_position: Vec3,
    key_color: Color,
    rim_position: Vec3,
    rim_color: Color,
    glow_intensity: f32,
    glow_range: f32,
}

const LIGHTING: Lighting = Lighting {
    // #001100 at 0.2
    ambient: Color::new(0.0, 0.0133, 0.0),
    environment: Color::new(0.3, 0.27, 0.22),
    key_position: Vec3::new(10.0, 20.0, 10.0),
    // #ffeebb at 2
    key_color: Color::new(2.0, 1.866, 1.466),
    rim_position: Vec3::new(-10.0, 5.0, -10.0),
    // #0044aa
    rim_color: Color::new(0.0, 0.267, 0.667),
    glow_intensity: 5.0,
    glow_range: 10.0,
};

#[derive(Debug, Clone, Copy)]
struct Material {
    emissive: Color,
    metallic: f32,
    roughness: f32,
}

struct FoliageUniforms {
    group: Option<WebGlUniformLocation>,
    view: Option<WebGlUniformLocation>,
    projection: Option<WebGlUniformLocation>,
    pixel_ratio: Option<WebGlUniformLocation>,
}

/// Uniforms every instanced program has
struct InstancedUniforms {
    group: Option<WebGlUniformLocation>,
    view: Option<WebGlUniformLocation>,
    projection: Option<WebGlUniformLocation>,
}

impl InstancedUniforms {
    fn new(ctx: &WebGLContext, program: &WebGlProgram) -> Self {
        Self {
            group: ctx.uniform_location(program, "u_group"),
            view: ctx.uniform_location(program, "u_view"),
            projection: ctx.uniform_location(program, "u_projection"),
        }
    }
}

struct LitUniforms {
    camera_pos: Option<WebGlUniformLocation>,
    emissive: Option<WebGlUniformLocation>,
    metallic: Option<WebGlUniformLocation>,
    roughness: Option<WebGlUniformLocation>,
    exposure: Option<WebGlUniformLocation>,
    ambient: Option<WebGlUniformLocation>,
    environment: Option<WebGlUniformLocation>,
    key_position: Option<WebGlUniformLocation>,
    key_color: Option<WebGlUniformLocation>,
    rim_position: Option<WebGlUniformLocation>,
    rim_color: Option<WebGlUniformLocation>,
    glow_position: Option<WebGlUniformLocation>,
    glow_color: Option<WebGlUniformLocation>,
    glow_range: Option<WebGlUniformLocation>,
}

struct PostUniforms {
    extract_texture: Option<WebGlUniformLocation>,
    threshold: Option<WebGlUniformLocation>,
    blur_texture: Option<WebGlUniformLocation>,
    direction: Option<WebGlUniformLocation>,
    scene: Option<WebGlUniformLocation>,
    bloom: Option<WebGlUniformLocation>,
    bloom_strength: Option<WebGlUniformLocation>,
    vignette_offset: Option<WebGlUniformLocation>,
    vignette_darkness: Option<WebGlUniformLocation>,
}

/// Foliage points on the GPU
struct PointBatch {
    vao: WebGlVertexArrayObject,
    buffer: WebGlBuffer,
    count: i32,
}

/// One shared mesh drawn once per population element
struct MeshBatch {
    vao: WebGlVertexArrayObject,
    instance_buffer: WebGlBuffer,
    index_count: i32,
    instance_count: i32,
}

struct SceneBatches {
    foliage: PointBatch,
    boxes: MeshBatch,
    balls: MeshBatch,
    lights: MeshBatch,
    star: MeshBatch,
    box_material: Material,
    ball_material: Material,
    star_material: Material,
}

/// Offscreen targets for the bloom chain
struct RenderTargets {
    scene_texture: WebGlTexture,
    scene_depth: WebGlRenderbuffer,
    scene_fbo: WebGlFramebuffer,
    bloom_textures: [WebGlTexture; 2],
    bloom_fbos: [WebGlFramebuffer; 2],
}

/// Forward pass into an offscreen target, then bloom and vignette
pub struct RenderPipeline {
    ctx: WebGLContext,
    settings: RenderConfig,
    background: Color,

    foliage_program: WebGlProgram,
    lit_program: WebGlProgram,
    emissive_program: WebGlProgram,
    bloom_extract_program: WebGlProgram,
    blur_program: WebGlProgram,
    composite_program: WebGlProgram,

    foliage_uniforms: FoliageUniforms,
    lit_instanced: InstancedUniforms,
    lit_uniforms: LitUniforms,
    emissive_instanced: InstancedUniforms,
    post_uniforms: PostUniforms,

    batches: Option<SceneBatches>,
    targets: RenderTargets,

    width: i32,
    height: i32,
}

impl RenderPipeline {
    pub fn new(gl: WebGl2RenderingContext, width: i32, height: i32, settings: &RenderConfig) -> Result<Self> {
        settings.validate()?;
        let ctx = WebGLContext::new(gl);
        let width = width.max(1);
        let height = height.max(1);

        let foliage_program = ctx.create_program(FOLIAGE_VERTEX_SHADER, FOLIAGE_FRAGMENT_SHADER)?;
        let lit_program = ctx.create_program(INSTANCED_VERTEX_SHADER, LIT_FRAGMENT_SHADER)?;
        let emissive_program = ctx.create_program(INSTANCED_VERTEX_SHADER, EMISSIVE_FRAGMENT_SHADER)?;
        let bloom_extract_program = ctx.create_program(FULLSCREEN_VERTEX_SHADER, BLOOM_EXTRACT_SHADER)?;
        let blur_program = ctx.create_program(FULLSCREEN_VERTEX_SHADER, BLUR_SHADER)?;
        let composite_program = ctx.create_program(FULLSCREEN_VERTEX_SHADER, COMPOSITE_SHADER)?;

        let foliage_uniforms = FoliageUniforms {
            group: ctx.uniform_location(&foliage_program, "u_group"),
            view: ctx.uniform_location(&foliage_program, "u_view"),
            projection: ctx.uniform_location(&foliage_program, "u_projection"),
            pixel_ratio: ctx.uniform_location(&foliage_program, "u_pixel_ratio"),
        };

        let lit_uniforms = LitUniforms {
            camera_pos: ctx.uniform_location(&lit_program, "u_camera_pos"),
            emissive: ctx.uniform_location(&lit_program, "u_emissive"),
            metallic: ctx.uniform_location(&lit_program, "u_metallic"),
            roughness: ctx.uniform_location(&lit_program, "u_roughness"),
            exposure: ctx.uniform_location(&lit_program, "u_exposure"),
            ambient: ctx.uniform_location(&lit_program, "u_ambient"),
            environment: ctx.uniform_location(&lit_program, "u_environment"),
            key_position: ctx.uniform_location(&lit_program, "u_key_position"),
            key_color: ctx.uniform_location(&lit_program, "u_key_color"),
            rim_position: ctx.uniform_location(&lit_program, "u_rim_position"),
            rim_color: ctx.uniform_location(&lit_program, "u_rim_color"),
            glow_position: ctx.uniform_location(&lit_program, "u_glow_position"),
            glow_color: ctx.uniform_location(&lit_program, "u_glow_color"),
            glow_range: ctx.uniform_location(&lit_program, "u_glow_range"),
        };

        let post_uniforms = PostUniforms {
            extract_texture: ctx.uniform_location(&bloom_extract_program, "u_texture"),
            threshold: ctx.uniform_location(&bloom_extract_program, "u_threshold"),
            blur_texture: ctx.uniform_location(&blur_program, "u_texture"),
            direction: ctx.uniform_location(&blur_program, "u_direction"),
            scene: ctx.uniform_location(&composite_program, "u_scene"),
            bloom: ctx.uniform_location(&composite_program, "u_bloom"),
            bloom_strength: ctx.uniform_location(&composite_program, "u_bloom_strength"),
            vignette_offset: ctx.uniform_location(&composite_program, "u_vignette_offset"),
            vignette_darkness: ctx.uniform_location(&composite_program, "u_vignette_darkness"),
        };

        let lit_instanced = InstancedUniforms::new(&ctx, &lit_program);
        let emissive_instanced = InstancedUniforms::new(&ctx, &emissive_program);
        let targets = Self::create_targets(&ctx, width, height)?;

        log::info!("render pipeline ready at {}x{}", width, height);

        Ok(Self {
            background: Color::from_hex(&settings.background)?,
            settings: settings.clone(),
            ctx,
            foliage_program,
            lit_program,
            emissive_program,
            bloom_extract_program,
            blur_program,
            composite_program,
            foliage_uniforms,
            lit_instanced,
            lit_uniforms,
            emissive_instanced,
            post_uniforms,
            batches: None,
            targets,
            width,
            height,
        })
    }

    fn create_targets(ctx: &WebGLContext, width: i32, height: i32) -> Result<RenderTargets> {
        let scene_texture = ctx.create_texture(width, height)?;
        let scene_depth = ctx.create_depth_buffer(width, height)?;
        let scene_fbo = ctx.create_framebuffer(&scene_texture, Some(&scene_depth))?;

        // Bloom runs at half resolution
        let (bw, bh) = ((width / 2).max(1), (height / 2).max(1));
        let bloom_a = ctx.create_texture(bw, bh)?;
        let bloom_b = ctx.create_texture(bw, bh)?;
        let fbo_a = ctx.create_framebuffer(&bloom_a, None)?;
        let fbo_b = ctx.create_framebuffer(&bloom_b, None)?;

        Ok(RenderTargets {
            scene_texture,
            scene_depth,
            scene_fbo,
            bloom_textures: [bloom_a, bloom_b],
            bloom_fbos: [fbo_a, fbo_b],
        })
    }

    fn delete_targets(&self) {
        let gl = &self.ctx.gl;
        let t = &self.targets;
        gl.delete_framebuffer(Some(&t.scene_fbo));
        gl.delete_renderbuffer(Some(&t.scene_depth));
        gl.delete_texture(Some(&t.scene_texture));
        for i in 0..2 {
            gl.delete_framebuffer(Some(&t.bloom_fbos[i]));
            gl.delete_texture(Some(&t.bloom_textures[i]));
        }
    }

    /// Allocate GPU buffers sized for the scene's populations
    pub fn upload_scene(&mut self, scene: &Scene) -> Result<()> {
        let foliage = self.upload_points(scene.foliage().instance_data())?;
        let boxes = self.upload_mesh(&primitives::cube(1.0), scene.boxes())?;
        let balls = self.upload_mesh(&primitives::uv_sphere(1.0, 16, 16), scene.balls())?;
        let lights = self.upload_mesh(&primitives::uv_sphere(1.0, 8, 8), scene.lights())?;
        let star = self.upload_mesh(&primitives::octahedron(1.0), scene.star())?;

        self.batches = Some(SceneBatches {
            foliage,
            boxes,
            balls,
            lights,
            star,
            box_material: Material {
                emissive: scene.boxes().emissive(),
                metallic: 0.9,
                roughness: 0.2,
            },
            ball_material: Material {
                emissive: scene.balls().emissive(),
                metallic: 0.9,
                roughness: 0.2,
            },
            star_material: Material {
                emissive: scene.star().emissive(),
                metallic: 1.0,
                roughness: 0.0,
            },
        });

        log::debug!("scene buffers uploaded");
        Ok(())
    }

    /// Layout: position(3) + size(1) + color(3) + random(1)
    fn upload_points(&self, data: &[f32]) -> Result<PointBatch> {
        let gl = &self.ctx.gl;

        let vao = self.ctx.create_vao()?;
        gl.bind_vertex_array(Some(&vao));

        let buffer = self.ctx.create_buffer_f32(data, GL::DYNAMIC_DRAW)?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        self.ctx.float_attrib(0, 3, POINT_STRIDE, 0);
        self.ctx.float_attrib(1, 1, POINT_STRIDE, 3);
        self.ctx.float_attrib(2, 3, POINT_STRIDE, 4);
        self.ctx.float_attrib(3, 1, POINT_STRIDE, 7);

        gl.bind_vertex_array(None);
        gl.bind_buffer(GL::ARRAY_BUFFER, None);

        Ok(PointBatch {
            vao,
            buffer,
            count: (data.len() / POINT_STRIDE) as i32,
        })
    }

    /// Mesh attributes at 0..=1, instance matrix at 2..=5 and color at 6
    fn upload_mesh(&self, mesh: &Mesh, population: &dyn Population) -> Result<MeshBatch> {
        let gl = &self.ctx.gl;

        let vao = self.ctx.create_vao()?;
        gl.bind_vertex_array(Some(&vao));

        let vertex_buffer = self.ctx.create_buffer_f32(&mesh.vertex_data(), GL::STATIC_DRAW)?;
        self.ctx.create_index_buffer(mesh.index_data(), GL::STATIC_DRAW)?;

        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&vertex_buffer));
        self.ctx.float_attrib(0, 3, VERTEX_STRIDE, 0);
        self.ctx.float_attrib(1, 3, VERTEX_STRIDE, 3);

        let data = population.instance_data();
        let instance_buffer = self.ctx.create_buffer_f32(data, GL::DYNAMIC_DRAW)?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&instance_buffer));
        for column in 0..4 {
            self.ctx.instance_attrib(2 + column as u32, 4, INSTANCE_STRIDE, column * 4);
        }
        self.ctx.instance_attrib(6, 3, INSTANCE_STRIDE, 16);

        gl.bind_vertex_array(None);
        gl.bind_buffer(GL::ARRAY_BUFFER, None);

        Ok(MeshBatch {
            vao,
            instance_buffer,
            index_count: mesh.index_data().len() as i32,
            instance_count: (data.len() / INSTANCE_STRIDE) as i32,
        })
    }

    fn draw_mesh(&self, batch: &MeshBatch) {
        self.ctx.gl.bind_vertex_array(Some(&batch.vao));
        self.ctx.gl.draw_elements_instanced_with_i32(
            GL::TRIANGLES,
            batch.index_count,
            GL::UNSIGNED_INT,
            0,
            batch.instance_count,
        );
    }

    fn set_material(&self, material: &Material) {
        self.ctx.uniform_color(self.lit_uniforms.emissive.as_ref(), material.emissive);
        self.ctx.uniform_1f(self.lit_uniforms.metallic.as_ref(), material.metallic);
        self.ctx.uniform_1f(self.lit_uniforms.roughness.as_ref(), material.roughness);
    }

    /// Upload this frame's instance data and draw it
    pub fn render(&self, scene: &Scene, camera: &OrbitCamera) {
        let Some(batches) = self.batches.as_ref() else {
            return;
        };
        let gl = &self.ctx.gl;
        let ctx = &self.ctx;

        ctx.update_buffer_f32(&batches.foliage.buffer, scene.foliage().instance_data());
        ctx.update_buffer_f32(&batches.boxes.instance_buffer, scene.boxes().instance_data());
        ctx.update_buffer_f32(&batches.balls.instance_buffer, scene.balls().instance_data());
        ctx.update_buffer_f32(&batches.lights.instance_buffer, scene.lights().instance_data());
        ctx.update_buffer_f32(&batches.star.instance_buffer, scene.star().instance_data());

        let aspect = self.width as f32 / self.height as f32;
        let projection = camera.projection_matrix(aspect);
        let view = camera.view_matrix();
        let group = scene.group_matrix();
        let camera_pos = camera.position();
        let glow_position = group.transform_point(scene.star().transform().position);

        // === Pass 1: scene into the offscreen target ===
        gl.bind_framebuffer(GL::FRAMEBUFFER, Some(&self.targets.scene_fbo));
        ctx.viewport(0, 0, self.width, self.height);
        gl.disable(GL::BLEND);
        gl.enable(GL::DEPTH_TEST);
        gl.depth_mask(true);
        ctx.clear(self.background);

        gl.use_program(Some(&self.lit_program));
        ctx.uniform_matrix4fv(self.lit_instanced.group.as_ref(), group.as_slice());
        ctx.uniform_matrix4fv(self.lit_instanced.view.as_ref(), view.as_slice());
        ctx.uniform_matrix4fv(self.lit_instanced.projection.as_ref(), projection.as_slice());

        let lit = &self.lit_uniforms;
        ctx.uniform_vec3(lit.camera_pos.as_ref(), camera_pos);
        ctx.uniform_1f(lit.exposure.as_ref(), self.settings.exposure);
        ctx.uniform_color(lit.ambient.as_ref(), LIGHTING.ambient);
        ctx.uniform_color(lit.environment.as_ref(), LIGHTING.environment);
        ctx.uniform_vec3(lit.key_position.as_ref(), LIGHTING.key_position);
        ctx.uniform_color(lit.key_color.as_ref(), LIGHTING.key_color);
        ctx.uniform_vec3(lit.rim_position.as_ref(), LIGHTING.rim_position);
        ctx.uniform_color(lit.rim_color.as_ref(), LIGHTING.rim_color);
        ctx.uniform_vec3(lit.glow_position.as_ref(), glow_position);
        ctx.uniform_color(
            lit.glow_color.as_ref(),
            scene.star().glow_color().scale(LIGHTING.glow_intensity),
        );
        ctx.uniform_1f(lit.glow_range.as_ref(), LIGHTING.glow_range);

        self.set_material(&batches.box_material);
        self.draw_mesh(&batches.boxes);
        self.set_material(&batches.ball_material);
        self.draw_mesh(&batches.balls);
        self.set_material(&batches.star_material);
        self.draw_mesh(&batches.star);

        gl.use_program(Some(&self.emissive_program));
        ctx.uniform_matrix4fv(self.emissive_instanced.group.as_ref(), group.as_slice());
        ctx.uniform_matrix4fv(self.emissive_instanced.view.as_ref(), view.as_slice());
        ctx.uniform_matrix4fv(self.emissive_instanced.projection.as_ref(), projection.as_slice());
        self.draw_mesh(&batches.lights);

        // Foliage last: depth-tested, additive, no depth writes
        gl.use_program(Some(&self.foliage_program));
        gl.depth_mask(false);
        ctx.enable_additive_blending();
        ctx.uniform_matrix4fv(self.foliage_uniforms.group.as_ref(), group.as_slice());
        ctx.uniform_matrix4fv(self.foliage_uniforms.view.as_ref(), view.as_slice());
        ctx.uniform_matrix4fv(self.foliage_uniforms.projection.as_ref(), projection.as_slice());
        ctx.uniform_1f(self.foliage_uniforms.pixel_ratio.as_ref(), scene.pixel_ratio());
        gl.bind_vertex_array(Some(&batches.foliage.vao));
        gl.draw_arrays(GL::POINTS, 0, batches.foliage.count);

        gl.bind_vertex_array(None);
        gl.depth_mask(true);
        gl.disable(GL::DEPTH_TEST);
        gl.disable(GL::BLEND);

        // === Pass 2: bright-pass ===
        let post = &self.post_uniforms;
        gl.bind_framebuffer(GL::FRAMEBUFFER, Some(&self.targets.bloom_fbos[0]));
        ctx.viewport(0, 0, (self.width / 2).max(1), (self.height / 2).max(1));

        gl.use_program(Some(&self.bloom_extract_program));
        gl.active_texture(GL::TEXTURE0);
        gl.bind_texture(GL::TEXTURE_2D, Some(&self.targets.scene_texture));
        ctx.uniform_1i(post.extract_texture.as_ref(), 0);
        ctx.uniform_1f(post.threshold.as_ref(), self.settings.bloom_threshold);
        gl.draw_arrays(GL::TRIANGLES, 0, 3);

        // === Pass 3 and 4: separable blur ===
        gl.use_program(Some(&self.blur_program));
        ctx.uniform_1i(post.blur_texture.as_ref(), 0);

        gl.bind_framebuffer(GL::FRAMEBUFFER, Some(&self.targets.bloom_fbos[1]));
        gl.bind_texture(GL::TEXTURE_2D, Some(&self.targets.bloom_textures[0]));
        ctx.uniform_2f(post.direction.as_ref(), 1.0, 0.0);
        gl.draw_arrays(GL::TRIANGLES, 0, 3);

        gl.bind_framebuffer(GL::FRAMEBUFFER, Some(&self.targets.bloom_fbos[0]));
        gl.bind_texture(GL::TEXTURE_2D, Some(&self.targets.bloom_textures[1]));
        ctx.uniform_2f(post.direction.as_ref(), 0.0, 1.0);
        gl.draw_arrays(GL::TRIANGLES, 0, 3);

        // === Pass 5: composite to the canvas ===
        gl.bind_framebuffer(GL::FRAMEBUFFER, None);
        ctx.viewport(0, 0, self.width, self.height);
        gl.use_program(Some(&self.composite_program));

        gl.active_texture(GL::TEXTURE0);
        gl.bind_texture(GL::TEXTURE_2D, Some(&self.targets.scene_texture));
        ctx.uniform_1i(post.scene.as_ref(), 0);

        gl.active_texture(GL::TEXTURE1);
        gl.bind_texture(GL::TEXTURE_2D, Some(&self.targets.bloom_textures[0]));
        ctx.uniform_1i(post.bloom.as_ref(), 1);

        ctx.uniform_1f(post.bloom_strength.as_ref(), self.settings.bloom_strength);
        ctx.uniform_1f(post.vignette_offset.as_ref(), self.settings.vignette_offset);
        ctx.uniform_1f(post.vignette_darkness.as_ref(), self.settings.vignette_darkness);
        gl.draw_arrays(GL::TRIANGLES, 0, 3);
    }

    pub fn resize(&mut self, width: i32, height: i32) -> Result<()> {
        let width = width.max(1);
        let height = height.max(1);
        if width == self.width && height == self.height {
            return Ok(());
        }

        let targets = Self::create_targets(&self.ctx, width, height)?;
        self.delete_targets();
        self.targets = targets;
        self.width = width;
        self.height = height;

        log::debug!("render targets resized to {}x{}", width, height);
        Ok(())
    }
}
