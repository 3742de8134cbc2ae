/// Vertex shader for foliage points
///
/// Per-point size already includes breathing; only depth attenuation and the
/// pixel-ratio correction happen here.
pub const FOLIAGE_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

layout(location = 0) in vec3 a_position;
layout(location = 1) in float a_size;
layout(location = 2) in vec3 a_color;
layout(location = 3) in float a_random;

uniform mat4 u_group;
uniform mat4 u_view;
uniform mat4 u_projection;
uniform float u_pixel_ratio;

out vec3 v_color;
out float v_random;

void main() {
    v_color = a_color;
    v_random = a_random;

    vec4 view_pos = u_view * u_group * vec4(a_position, 1.0);
    gl_PointSize = a_size * u_pixel_ratio * (40.0 / max(-view_pos.z, 0.001));
    gl_Position = u_projection * view_pos;
}
"#;

/// Fragment shader for foliage points: soft disc plus a rare sparkle
pub const FOLIAGE_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec3 v_color;
in float v_random;

out vec4 fragColor;

void main() {
    float r = distance(gl_PointCoord, vec2(0.5));
    if (r > 0.5) {
        discard;
    }

    float glow = pow(1.0 - r * 2.0, 1.5);
    float sparkle = step(0.98, fract(v_random * 100.0 + gl_FragCoord.x * 0.01));

    fragColor = vec4(v_color + vec3(sparkle * 0.5), glow);
}
"#;

/// Vertex shader shared by every instanced mesh (ornaments, bulbs, star)
pub const INSTANCED_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in mat4 a_model;
layout(location = 6) in vec3 a_color;

uniform mat4 u_group;
uniform mat4 u_view;
uniform mat4 u_projection;

out vec3 v_world_position;
out vec3 v_normal;
out vec3 v_color;

void main() {
    mat4 model = u_group * a_model;
    vec4 world_pos = model * vec4(a_position, 1.0);

    v_world_position = world_pos.xyz;
    v_normal = mat3(model) * a_normal;
    v_color = a_color;

    gl_Position = u_projection * u_view * world_pos;
}
"#;

/// Lit fragment shader for metallic ornaments and the star
pub const LIT_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec3 v_world_position;
in vec3 v_normal;
in vec3 v_color;

uniform vec3 u_camera_pos;
uniform vec3 u_emissive;
uniform float u_metallic;
uniform float u_roughness;
uniform float u_exposure;

uniform vec3 u_ambient;
uniform vec3 u_environment;
uniform vec3 u_key_position;
uniform vec3 u_key_color;
uniform vec3 u_rim_position;
uniform vec3 u_rim_color;
uniform vec3 u_glow_position;
uniform vec3 u_glow_color;
uniform float u_glow_range;

out vec4 fragColor;

vec3 shade(vec3 light_dir, vec3 light_color, vec3 normal, vec3 view_dir, vec3 albedo, vec3 spec_color, float shininess) {
    float ndotl = max(dot(normal, light_dir), 0.0);
    vec3 half_dir = normalize(light_dir + view_dir);
    float spec = pow(max(dot(normal, half_dir), 0.0), shininess);
    return light_color * (albedo * ndotl + spec_color * spec * ndotl);
}

void main() {
    vec3 normal = normalize(v_normal);
    vec3 view_dir = normalize(u_camera_pos - v_world_position);

    vec3 albedo = v_color * (1.0 - u_metallic);
    vec3 spec_color = mix(vec3(0.04), v_color, u_metallic);
    float shininess = mix(256.0, 8.0, u_roughness);

    vec3 color = u_ambient * v_color;

    // Fake environment reflection so metals are never flat black
    float fresnel = pow(1.0 - max(dot(normal, view_dir), 0.0), 5.0);
    color += u_environment * spec_color * (0.5 + 0.5 * fresnel);

    color += shade(normalize(u_key_position - v_world_position), u_key_color, normal, view_dir, albedo, spec_color, shininess);
    color += shade(normalize(u_rim_position - v_world_position), u_rim_color, normal, view_dir, albedo, spec_color, shininess);

    vec3 to_glow = u_glow_position - v_world_position;
    float falloff = clamp(1.0 - length(to_glow) / u_glow_range, 0.0, 1.0);
    color += shade(normalize(to_glow), u_glow_color * falloff * falloff, normal, view_dir, albedo, spec_color, shininess);

    color += u_emissive;

    // Reinhard
    color *= u_exposure;
    color = color / (color + vec3(1.0));

    fragColor = vec4(color, 1.0);
}
"#;

/// Unlit fragment shader for the light bulbs; the instance color is the
/// emitted color and is left untonemapped so it can drive the bloom
pub const EMISSIVE_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec3 v_world_position;
in vec3 v_normal;
in vec3 v_color;

out vec4 fragColor;

void main() {
    fragColor = vec4(v_color, 1.0);
}
"#;

/// Fullscreen triangle vertex shader for post-processing
pub const FULLSCREEN_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

out vec2 v_uv;

void main() {
    float x = float((gl_VertexID & 1) << 2);
    float y = float((gl_VertexID & 2) << 1);
    v_uv = vec2(x * 0.5, y * 0.5);
    gl_Position = vec4(x - 1.0, y - 1.0, 0.0, 1.0);
}
"#;

/// Bright-pass: keeps what rises above the luminance threshold
pub const BLOOM_EXTRACT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec2 v_uv;

uniform sampler2D u_texture;
uniform float u_threshold;

out vec4 fragColor;

void main() {
    vec3 color = texture(u_texture, v_uv).rgb;
    float luma = dot(color, vec3(0.2126, 0.7152, 0.0722));
    float weight = smoothstep(u_threshold, u_threshold + 0.1, luma);
    fragColor = vec4(color * weight, 1.0);
}
"#;

/// Separable 9-tap Gaussian blur
pub const BLUR_SHADER: &str = r#"#version 300 es
precision highp float;

in vec2 v_uv;

uniform sampler2D u_texture;
uniform vec2 u_direction;

out vec4 fragColor;

void main() {
    vec2 texel = 1.0 / vec2(textureSize(u_texture, 0));
    float weights[5] = float[](0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216);

    vec3 result = texture(u_texture, v_uv).rgb * weights[0];
    for (int i = 1; i < 5; i++) {
        vec2 offset = u_direction * texel * float(i) * 2.0;
        result += texture(u_texture, v_uv + offset).rgb * weights[i];
        result += texture(u_texture, v_uv - offset).rgb * weights[i];
    }

    fragColor = vec4(result, 1.0);
}
"#;

/// Scene plus bloom, then a radial vignette
pub const COMPOSITE_SHADER: &str = r#"#version 300 es
precision highp float;

in vec2 v_uv;

uniform sampler2D u_scene;
uniform sampler2D u_bloom;
uniform float u_bloom_strength;
uniform float u_vignette_offset;
uniform float u_vignette_darkness;

out vec4 fragColor;

void main() {
    vec3 color = texture(u_scene, v_uv).rgb + texture(u_bloom, v_uv).rgb * u_bloom_strength;

    float d = distance(v_uv, vec2(0.5));
    color *= 1.0 - smoothstep(u_vignette_offset * 0.799, 0.8, d * (u_vignette_darkness + u_vignette_offset));

    fragColor = vec4(color, 1.0);
}
"#;
