use web_sys::{
    WebGl2RenderingContext, WebGlBuffer, WebGlFramebuffer, WebGlProgram, WebGlRenderbuffer,
    WebGlShader, WebGlTexture, WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::error::{Result, TreeError};
use crate::math::{Color, Vec3};

type GL = WebGl2RenderingContext;

/// Wrapper around a WebGL2 context with helper methods
pub struct WebGLContext {
    pub gl: WebGl2RenderingContext,
}

impl WebGLContext {
    pub fn new(gl: WebGl2RenderingContext) -> Self {
        Self { gl }
    }

    pub fn compile_shader(&self, shader_type: u32, source: &str) -> Result<WebGlShader> {
        let gl = &self.gl;

        let shader = gl
            .create_shader(shader_type)
            .ok_or_else(|| TreeError::render("failed to create shader"))?;

        gl.shader_source(&shader, source);
        gl.compile_shader(&shader);

        if gl
            .get_shader_parameter(&shader, GL::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
        {
            Ok(shader)
        } else {
            let log = gl.get_shader_info_log(&shader).unwrap_or_default();
            gl.delete_shader(Some(&shader));
            Err(TreeError::render(format!("shader compilation failed: {}", log)))
        }
    }

    pub fn create_program(&self, vert_src: &str, frag_src: &str) -> Result<WebGlProgram> {
        let gl = &self.gl;

        let vert_shader = self.compile_shader(GL::VERTEX_SHADER, vert_src)?;
        let frag_shader = self.compile_shader(GL::FRAGMENT_SHADER, frag_src)?;

        let program = gl
            .create_program()
            .ok_or_else(|| TreeError::render("failed to create program"))?;

        gl.attach_shader(&program, &vert_shader);
        gl.attach_shader(&program, &frag_shader);
        gl.link_program(&program);

        // Linked in; the shader objects are no longer needed
        gl.delete_shader(Some(&vert_shader));
        gl.delete_shader(Some(&frag_shader));

        if gl
            .get_program_parameter(&program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
        {
            Ok(program)
        } else {
            let log = gl.get_program_info_log(&program).unwrap_or_default();
            gl.delete_program(Some(&program));
            Err(TreeError::render(format!("program linking failed: {}", log)))
        }
    }

    /// Create an array buffer and upload `data`
    pub fn create_buffer_f32(&self, data: &[f32], usage: u32) -> Result<WebGlBuffer> {
        let gl = &self.gl;

        let buffer = gl
            .create_buffer()
            .ok_or_else(|| TreeError::render("failed to create buffer"))?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));

        // Safety: the view is consumed by buffer_data before any allocation
        unsafe {
            let array = js_sys::Float32Array::view(data);
            gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &array, usage);
        }

        gl.bind_buffer(GL::ARRAY_BUFFER, None);
        Ok(buffer)
    }

    /// Overwrite the start of an existing array buffer with `data`
    pub fn update_buffer_f32(&self, buffer: &WebGlBuffer, data: &[f32]) {
        let gl = &self.gl;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));

        // Safety: as in create_buffer_f32
        unsafe {
            let array = js_sys::Float32Array::view(data);
            gl.buffer_sub_data_with_i32_and_array_buffer_view(GL::ARRAY_BUFFER, 0, &array);
        }

        gl.bind_buffer(GL::ARRAY_BUFFER, None);
    }

    pub fn create_index_buffer(&self, data: &[u32], usage: u32) -> Result<WebGlBuffer> {
        let gl = &self.gl;

        let buffer = gl
            .create_buffer()
            .ok_or_else(|| TreeError::render("failed to create index buffer"))?;
        gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&buffer));

        unsafe {
            let array = js_sys::Uint32Array::view(data);
            gl.buffer_data_with_array_buffer_view(GL::ELEMENT_ARRAY_BUFFER, &array, usage);
        }

        // The element binding is VAO state, so it stays bound here
        Ok(buffer)
    }

    pub fn create_vao(&self) -> Result<WebGlVertexArrayObject> {
        self.gl
            .create_vertex_array()
            .ok_or_else(|| TreeError::render("failed to create VAO"))
    }

    /// Point float attribute `location` at the bound array buffer
    pub fn float_attrib(&self, location: u32, size: i32, stride_floats: usize, offset_floats: usize) {
        self.gl.enable_vertex_attrib_array(location);
        self.gl.vertex_attrib_pointer_with_i32(
            location,
            size,
            GL::FLOAT,
            false,
            (stride_floats * 4) as i32,
            (offset_floats * 4) as i32,
        );
    }

    /// Like `float_attrib`, but advancing once per instance
    pub fn instance_attrib(&self, location: u32, size: i32, stride_floats: usize, offset_floats: usize) {
        self.float_attrib(location, size, stride_floats, offset_floats);
        self.gl.vertex_attrib_divisor(location, 1);
    }

    pub fn create_texture(&self, width: i32, height: i32) -> Result<WebGlTexture> {
        let gl = &self.gl;

        let texture = gl
            .create_texture()
            .ok_or_else(|| TreeError::render("failed to create texture"))?;
        gl.bind_texture(GL::TEXTURE_2D, Some(&texture));

        gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
            GL::TEXTURE_2D,
            0,
            GL::RGBA as i32,
            width,
            height,
            0,
            GL::RGBA,
            GL::UNSIGNED_BYTE,
            None,
        )
        .map_err(|e| TreeError::render(format!("failed to allocate texture: {:?}", e)))?;

        for (param, value) in [
            (GL::TEXTURE_MIN_FILTER, GL::LINEAR),
            (GL::TEXTURE_MAG_FILTER, GL::LINEAR),
            (GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE),
            (GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE),
        ] {
            gl.tex_parameteri(GL::TEXTURE_2D, param, value as i32);
        }

        gl.bind_texture(GL::TEXTURE_2D, None);
        Ok(texture)
    }

    pub fn create_depth_buffer(&self, width: i32, height: i32) -> Result<WebGlRenderbuffer> {
        let gl = &self.gl;

        let depth = gl
            .create_renderbuffer()
            .ok_or_else(|| TreeError::render("failed to create depth buffer"))?;
        gl.bind_renderbuffer(GL::RENDERBUFFER, Some(&depth));
        gl.renderbuffer_storage(GL::RENDERBUFFER, GL::DEPTH_COMPONENT24, width, height);
        gl.bind_renderbuffer(GL::RENDERBUFFER, None);
        Ok(depth)
    }

    /// Framebuffer with a color texture and an optional depth attachment
    pub fn create_framebuffer(
        &self,
        texture: &WebGlTexture,
        depth: Option<&WebGlRenderbuffer>,
    ) -> Result<WebGlFramebuffer> {
        let gl = &self.gl;

        let fbo = gl
            .create_framebuffer()
            .ok_or_else(|| TreeError::render("failed to create framebuffer"))?;
        gl.bind_framebuffer(GL::FRAMEBUFFER, Some(&fbo));

        gl.framebuffer_texture_2d(GL::FRAMEBUFFER, GL::COLOR_ATTACHMENT0, GL::TEXTURE_2D, Some(texture), 0);
        if let Some(depth) = depth {
            gl.framebuffer_renderbuffer(GL::FRAMEBUFFER, GL::DEPTH_ATTACHMENT, GL::RENDERBUFFER, Some(depth));
        }

        let status = gl.check_framebuffer_status(GL::FRAMEBUFFER);
        gl.bind_framebuffer(GL::FRAMEBUFFER, None);

        if status != GL::FRAMEBUFFER_COMPLETE {
            return Err(TreeError::render(format!("framebuffer incomplete: {:#x}", status)));
        }
        Ok(fbo)
    }

    pub fn uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.gl.get_uniform_location(program, name)
    }

    pub fn uniform_1f(&self, location: Option<&WebGlUniformLocation>, value: f32) {
        self.gl.uniform1f(location, value);
    }

    pub fn uniform_2f(&self, location: Option<&WebGlUniformLocation>, x: f32, y: f32) {
        self.gl.uniform2f(location, x, y);
    }

    pub fn uniform_vec3(&self, location: Option<&WebGlUniformLocation>, v: Vec3) {
        self.gl.uniform3f(location, v.x, v.y, v.z);
    }

    pub fn uniform_color(&self, location: Option<&WebGlUniformLocation>, c: Color) {
        self.gl.uniform3f(location, c.r, c.g, c.b);
    }

    pub fn uniform_matrix4fv(&self, location: Option<&WebGlUniformLocation>, data: &[f32; 16]) {
        self.gl.uniform_matrix4fv_with_f32_array(location, false, data);
    }

    pub fn uniform_1i(&self, location: Option<&WebGlUniformLocation>, value: i32) {
        self.gl.uniform1i(location, value);
    }

    pub fn clear(&self, color: Color) {
        self.gl.clear_color(color.r, color.g, color.b, 1.0);
        self.gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
    }

    /// Additive blending for glowing points
    pub fn enable_additive_blending(&self) {
        self.gl.enable(GL::BLEND);
        self.gl.blend_func(GL::SRC_ALPHA, GL::ONE);
    }

    pub fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.gl.viewport(x, y, width, height);
    }
}
