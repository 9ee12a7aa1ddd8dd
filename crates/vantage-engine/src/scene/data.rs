//! Compiled-in vertex data.

/// Unit cube as six faces of four `xyz uv` vertices, drawn as one strip.
#[rustfmt::skip]
pub(crate) const CUBE_VERTICES: [f32; 24 * 5] = [
    // front (+z)
    -1.0,  1.0,  1.0,   0.0, 0.0,
    -1.0, -1.0,  1.0,   0.0, 1.0,
     1.0,  1.0,  1.0,   1.0, 0.0,
     1.0, -1.0,  1.0,   1.0, 1.0,

    // right (+x)
     1.0, -1.0,  1.0,   0.0, 1.0,
     1.0,  1.0,  1.0,   0.0, 0.0,
     1.0, -1.0, -1.0,   1.0, 1.0,
     1.0,  1.0, -1.0,   1.0, 0.0,

    // back (-z)
     1.0,  1.0, -1.0,   0.0, 0.0,
     1.0, -1.0, -1.0,   0.0, 1.0,
    -1.0,  1.0, -1.0,   1.0, 0.0,
    -1.0, -1.0, -1.0,   1.0, 1.0,

    // bottom (-y)
     1.0, -1.0, -1.0,   1.0, 1.0,
    -1.0, -1.0, -1.0,   0.0, 1.0,
     1.0, -1.0,  1.0,   1.0, 0.0,
    -1.0, -1.0,  1.0,   0.0, 0.0,

    // left (-x)
    -1.0, -1.0,  1.0,   1.0, 1.0,
    -1.0, -1.0, -1.0,   0.0, 1.0,
    -1.0,  1.0,  1.0,   1.0, 0.0,
    -1.0,  1.0, -1.0,   0.0, 0.0,

    // top (+y)
    -1.0,  1.0, -1.0,   0.0, 0.0,
    -1.0,  1.0,  1.0,   0.0, 1.0,
     1.0,  1.0, -1.0,   1.0, 0.0,
     1.0,  1.0,  1.0,   1.0, 1.0,
];

/// Three axis segments (`x`, `y`, `z`) followed by one triangle, `xyz` only.
#[rustfmt::skip]
pub(crate) const AXES_TRIANGLE_VERTICES: [f32; 9 * 3] = [
    -2.5,  0.0,  0.0,
     2.5,  0.0,  0.0,

     0.0, -2.5,  0.0,
     0.0,  2.5,  0.0,

     0.0,  0.0, -2.5,
     0.0,  0.0,  2.5,

    -1.0, -0.8,  0.0,
     1.0, -0.8,  0.0,
     0.0,  1.2,  0.0,
];
