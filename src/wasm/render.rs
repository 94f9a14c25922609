use js_sys::Float32Array;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use super::dom::describe;
use crate::embers::{EmberGrid, EmberRenderer};
use crate::error::{Error, Result};

const VERTEX_SHADER: &str = r#"#version 300 es
in vec2 a_position;
in float a_size;
in vec3 a_color;
uniform vec2 u_half_viewport;
out vec3 v_color;

void main() {
    v_color = a_color;
    gl_Position = vec4(a_position / u_half_viewport, 0.0, 1.0);
    gl_PointSize = a_size * 2.0;
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
in vec3 v_color;
out vec4 out_color;

void main() {
    float dist = length(gl_PointCoord - vec2(0.5, 0.5));
    if (dist > 0.5) discard;
    float alpha = 1.0 - smoothstep(0.4, 0.5, dist);
    out_color = vec4(v_color, alpha);
}
"#;

/// Draws an [`EmberGrid`] as additive round point sprites.
pub struct WebGlEmbers {
    canvas: HtmlCanvasElement,
    gl: GL,
    program: WebGlProgram,
    vao: WebGlVertexArrayObject,
    half_viewport: Option<WebGlUniformLocation>,
    position: WebGlBuffer,
    size: WebGlBuffer,
    color: WebGlBuffer,
}

impl WebGlEmbers {
    /// Fails when the browser has no WebGL2 or the shaders do not build.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let gl: GL = canvas
            .get_context("webgl2")
            .map_err(|err| Error::Render(describe(&err)))?
            .ok_or_else(|| Error::Render("WebGL2 not supported".to_owned()))?
            .dyn_into()
            .map_err(|_| Error::Render("unexpected WebGL2 context type".to_owned()))?;

        let vertex = compile(&gl, GL::VERTEX_SHADER, VERTEX_SHADER)?;
        let fragment = compile(&gl, GL::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
        let program = link(&gl, &vertex, &fragment)?;

        let vao = gl
            .create_vertex_array()
            .ok_or_else(|| Error::Render("could not create vertex array".to_owned()))?;
        gl.bind_vertex_array(Some(&vao));
        let position = attribute(&gl, &program, "a_position", 2)?;
        let size = attribute(&gl, &program, "a_size", 1)?;
        let color = attribute(&gl, &program, "a_color", 3)?;
        gl.bind_vertex_array(None);

        let half_viewport = gl.get_uniform_location(&program, "u_half_viewport");

        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE);
        gl.clear_color(0.0, 0.0, 0.0, 0.0);

        Ok(Self {
            canvas,
            gl,
            program,
            vao,
            half_viewport,
            position,
            size,
            color,
        })
    }

    fn upload(&self, buffer: &WebGlBuffer, data: &[f32]) {
        self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
        self.gl.buffer_data_with_array_buffer_view(
            GL::ARRAY_BUFFER,
            &Float32Array::from(data),
            GL::DYNAMIC_DRAW,
        );
    }
}

impl EmberRenderer for WebGlEmbers {
    fn resize(&mut self, width: f64, height: f64) {
        self.canvas.set_width(width.max(0.0) as u32);
        self.canvas.set_height(height.max(0.0) as u32);
        self.gl
            .viewport(0, 0, self.canvas.width() as i32, self.canvas.height() as i32);
    }

    fn draw(&mut self, grid: &EmberGrid) -> Result<()> {
        if self.gl.is_context_lost() {
            return Err(Error::Render("WebGL context lost".to_owned()));
        }
        let (width, height) = grid.viewport();

        self.gl.clear(GL::COLOR_BUFFER_BIT);
        self.gl.use_program(Some(&self.program));
        self.gl.uniform2f(
            self.half_viewport.as_ref(),
            (width / 2.0).max(1.0) as f32,
            (height / 2.0).max(1.0) as f32,
        );

        self.gl.bind_vertex_array(Some(&self.vao));
        self.upload(&self.position, grid.positions());
        self.upload(&self.size, grid.sizes());
        self.upload(&self.color, grid.colors());
        self.gl.draw_arrays(GL::POINTS, 0, grid.len() as i32);
        self.gl.bind_vertex_array(None);
        Ok(())
    }

    fn blank(&mut self) {
        self.gl.clear(GL::COLOR_BUFFER_BIT);
    }
}

fn compile(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| Error::Render("could not create shader".to_owned()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    let compiled = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if compiled {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(Error::Render(format!("shader compile failed: {log}")))
    }
}

fn link(gl: &GL, vertex: &WebGlShader, fragment: &WebGlShader) -> Result<WebGlProgram> {
    let program = gl
        .create_program()
        .ok_or_else(|| Error::Render("could not create program".to_owned()))?;
    gl.attach_shader(&program, vertex);
    gl.attach_shader(&program, fragment);
    gl.link_program(&program);
    let linked = gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if linked {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(Error::Render(format!("program link failed: {log}")))
    }
}

/// Creates a buffer for `name` and points the attribute at it. Must run
/// with the vertex array bound.
fn attribute(gl: &GL, program: &WebGlProgram, name: &str, components: i32) -> Result<WebGlBuffer> {
    let location = u32::try_from(gl.get_attrib_location(program, name))
        .map_err(|_| Error::Render(format!("attribute {name} not found")))?;
    let buffer = gl
        .create_buffer()
        .ok_or_else(|| Error::Render("could not create buffer".to_owned()))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
    gl.enable_vertex_attrib_array(location);
    gl.vertex_attrib_pointer_with_i32(location, components, GL::FLOAT, false, 0, 0);
    Ok(buffer)
}
