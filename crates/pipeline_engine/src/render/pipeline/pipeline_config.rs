//! Fixed-function pipeline state
//!
//! Serializable description of everything a graphics pipeline needs besides
//! its shader stages. Each block converts to the matching Vulkan values.

use ash::vk;
use serde::{Deserialize, Serialize};

/// Primitive assembly topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveTopology {
    /// Independent points
    PointList,
    /// Independent lines
    LineList,
    /// Connected line strip
    LineStrip,
    /// Independent triangles
    #[default]
    TriangleList,
    /// Connected triangle strip
    TriangleStrip,
}

impl PrimitiveTopology {
    /// Vulkan equivalent
    pub fn to_vk(self) -> vk::PrimitiveTopology {
        match self {
            Self::PointList => vk::PrimitiveTopology::POINT_LIST,
            Self::LineList => vk::PrimitiveTopology::LINE_LIST,
            Self::LineStrip => vk::PrimitiveTopology::LINE_STRIP,
            Self::TriangleList => vk::PrimitiveTopology::TRIANGLE_LIST,
            Self::TriangleStrip => vk::PrimitiveTopology::TRIANGLE_STRIP,
        }
    }
}

/// Face culling modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CullMode {
    /// No culling
    None,
    /// Cull front faces
    Front,
    /// Cull back faces
    #[default]
    Back,
}

impl CullMode {
    /// Vulkan equivalent
    pub fn to_vk(self) -> vk::CullModeFlags {
        match self {
            Self::None => vk::CullModeFlags::NONE,
            Self::Front => vk::CullModeFlags::FRONT,
            Self::Back => vk::CullModeFlags::BACK,
        }
    }
}

/// Winding order of front-facing triangles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrontFace {
    /// Clockwise winding (OBJ assets are converted to this)
    #[default]
    Clockwise,
    /// Counter-clockwise winding
    CounterClockwise,
}

impl FrontFace {
    /// Vulkan equivalent
    pub fn to_vk(self) -> vk::FrontFace {
        match self {
            Self::Clockwise => vk::FrontFace::CLOCKWISE,
            Self::CounterClockwise => vk::FrontFace::COUNTER_CLOCKWISE,
        }
    }
}

/// Polygon rendering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolygonMode {
    /// Normal solid rendering
    #[default]
    Fill,
    /// Wireframe mode
    Line,
    /// Point cloud mode
    Point,
}

impl PolygonMode {
    /// Vulkan equivalent
    pub fn to_vk(self) -> vk::PolygonMode {
        match self {
            Self::Fill => vk::PolygonMode::FILL,
            Self::Line => vk::PolygonMode::LINE,
            Self::Point => vk::PolygonMode::POINT,
        }
    }
}

/// Depth comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// Never passes
    Never,
    /// Passes when closer
    #[default]
    Less,
    /// Passes when equal
    Equal,
    /// Passes when closer or equal
    LessOrEqual,
    /// Passes when farther
    Greater,
    /// Passes when not equal
    NotEqual,
    /// Passes when farther or equal
    GreaterOrEqual,
    /// Always passes
    Always,
}

impl CompareOp {
    /// Vulkan equivalent
    pub fn to_vk(self) -> vk::CompareOp {
        match self {
            Self::Never => vk::CompareOp::NEVER,
            Self::Less => vk::CompareOp::LESS,
            Self::Equal => vk::CompareOp::EQUAL,
            Self::LessOrEqual => vk::CompareOp::LESS_OR_EQUAL,
            Self::Greater => vk::CompareOp::GREATER,
            Self::NotEqual => vk::CompareOp::NOT_EQUAL,
            Self::GreaterOrEqual => vk::CompareOp::GREATER_OR_EQUAL,
            Self::Always => vk::CompareOp::ALWAYS,
        }
    }
}

/// Blending modes for different rendering effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Blending disabled
    #[default]
    Opaque,
    /// Standard alpha blending
    Alpha,
    /// Additive blending for particles and lights
    Additive,
    /// Multiplicative blending for shadows
    Multiplicative,
    /// Pre-multiplied alpha
    Premultiplied,
}

impl BlendMode {
    /// Whether the mode needs blending enabled at all
    pub fn is_blended(self) -> bool {
        self != Self::Opaque
    }

    /// Color attachment state for this mode
    pub fn to_vk(self) -> vk::PipelineColorBlendAttachmentState {
        let (src_color, dst_color, src_alpha, dst_alpha) = match self {
            Self::Opaque => {
                return vk::PipelineColorBlendAttachmentState::builder()
                    .color_write_mask(vk::ColorComponentFlags::RGBA)
                    .blend_enable(false)
                    .build();
            }
            Self::Alpha => (
                vk::BlendFactor::SRC_ALPHA,
                vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
                vk::BlendFactor::ONE,
                vk::BlendFactor::ZERO,
            ),
            Self::Additive => (
                vk::BlendFactor::SRC_ALPHA,
                vk::BlendFactor::ONE,
                vk::BlendFactor::ONE,
                vk::BlendFactor::ONE,
            ),
            Self::Multiplicative => (
                vk::BlendFactor::DST_COLOR,
                vk::BlendFactor::ZERO,
                vk::BlendFactor::DST_ALPHA,
                vk::BlendFactor::ZERO,
            ),
            Self::Premultiplied => (
                vk::BlendFactor::ONE,
                vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
                vk::BlendFactor::ONE,
                vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
            ),
        };

        vk::PipelineColorBlendAttachmentState::builder()
            .color_write_mask(vk::ColorComponentFlags::RGBA)
            .blend_enable(true)
            .src_color_blend_factor(src_color)
            .dst_color_blend_factor(dst_color)
            .color_blend_op(vk::BlendOp::ADD)
            .src_alpha_blend_factor(src_alpha)
            .dst_alpha_blend_factor(dst_alpha)
            .alpha_blend_op(vk::BlendOp::ADD)
            .build()
    }
}

fn default_line_width() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

/// Rasterizer configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RasterizationState {
    /// Cull mode for backface culling
    #[serde(default)]
    pub cull_mode: CullMode,
    /// Front face winding
    #[serde(default)]
    pub front_face: FrontFace,
    /// Fill, wireframe or points
    #[serde(default)]
    pub polygon_mode: PolygonMode,
    /// Rasterized line width
    #[serde(default = "default_line_width")]
    pub line_width: f32,
}

impl Default for RasterizationState {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::default(),
            front_face: FrontFace::default(),
            polygon_mode: PolygonMode::default(),
            line_width: default_line_width(),
        }
    }
}

/// Depth testing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepthState {
    /// Enable depth testing
    #[serde(default = "default_true")]
    pub test: bool,
    /// Enable depth writing
    #[serde(default = "default_true")]
    pub write: bool,
    /// Comparison used by the depth test
    #[serde(default)]
    pub compare_op: CompareOp,
}

impl Default for DepthState {
    fn default() -> Self {
        Self {
            test: true,
            write: true,
            compare_op: CompareOp::default(),
        }
    }
}

/// Color blending configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlendState {
    /// Blend equation preset
    #[serde(default)]
    pub mode: BlendMode,
}

/// Everything in a graphics pipeline that is not a shader stage
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixedFunctionState {
    /// Input assembly topology
    #[serde(default)]
    pub topology: PrimitiveTopology,
    /// Rasterizer state
    #[serde(default)]
    pub rasterization: RasterizationState,
    /// Depth state
    #[serde(default)]
    pub depth: DepthState,
    /// Blend state
    #[serde(default)]
    pub blend: BlendState,
}

impl FixedFunctionState {
    /// Opaque geometry: depth test and write, back-face culling
    pub fn opaque() -> Self {
        Self::default()
    }

    /// Transparent geometry: alpha blending, no depth writes, no culling
    pub fn transparent() -> Self {
        Self {
            rasterization: RasterizationState {
                cull_mode: CullMode::None,
                ..RasterizationState::default()
            },
            depth: DepthState {
                write: false,
                ..DepthState::default()
            },
            blend: BlendState { mode: BlendMode::Alpha },
            ..Self::default()
        }
    }

    /// Additive effects such as particles and light volumes
    pub fn additive() -> Self {
        Self {
            blend: BlendState { mode: BlendMode::Additive },
            ..Self::transparent()
        }
    }

    /// Wireframe debug rendering
    pub fn wireframe() -> Self {
        Self {
            rasterization: RasterizationState {
                cull_mode: CullMode::None,
                polygon_mode: PolygonMode::Line,
                ..RasterizationState::default()
            },
            ..Self::default()
        }
    }

    /// Rasterization state in Vulkan form
    pub fn rasterization_info(&self) -> vk::PipelineRasterizationStateCreateInfo {
        vk::PipelineRasterizationStateCreateInfo::builder()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(self.rasterization.polygon_mode.to_vk())
            .line_width(self.rasterization.line_width)
            .cull_mode(self.rasterization.cull_mode.to_vk())
            .front_face(self.rasterization.front_face.to_vk())
            .depth_bias_enable(false)
            .build()
    }

    /// Depth/stencil state in Vulkan form
    pub fn depth_stencil_info(&self) -> vk::PipelineDepthStencilStateCreateInfo {
        vk::PipelineDepthStencilStateCreateInfo::builder()
            .depth_test_enable(self.depth.test)
            .depth_write_enable(self.depth.write)
            .depth_compare_op(self.depth.compare_op.to_vk())
            .depth_bounds_test_enable(false)
            .stencil_test_enable(false)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_opaque() {
        let state = FixedFunctionState::default();
        assert_eq!(state, FixedFunctionState::opaque());
        assert_eq!(state.topology.to_vk(), vk::PrimitiveTopology::TRIANGLE_LIST);
        assert_eq!(state.rasterization.cull_mode.to_vk(), vk::CullModeFlags::BACK);
        assert!(state.depth.test && state.depth.write);
        assert!(!state.blend.mode.is_blended());
        assert_eq!(state.blend.mode.to_vk().blend_enable, vk::FALSE);
    }

    #[test]
    fn test_transparent_preset() {
        let state = FixedFunctionState::transparent();
        assert!(!state.depth.write);
        assert_eq!(state.rasterization.cull_mode, CullMode::None);

        let attachment = state.blend.mode.to_vk();
        assert_eq!(attachment.blend_enable, vk::TRUE);
        assert_eq!(attachment.src_color_blend_factor, vk::BlendFactor::SRC_ALPHA);
        assert_eq!(attachment.dst_color_blend_factor, vk::BlendFactor::ONE_MINUS_SRC_ALPHA);
    }

    #[test]
    fn test_vk_info_reflects_state() {
        let state = FixedFunctionState::wireframe();
        let raster = state.rasterization_info();
        assert_eq!(raster.polygon_mode, vk::PolygonMode::LINE);
        assert_eq!(raster.cull_mode, vk::CullModeFlags::NONE);

        let depth = FixedFunctionState::additive().depth_stencil_info();
        assert_eq!(depth.depth_write_enable, vk::FALSE);
        assert_eq!(depth.depth_compare_op, vk::CompareOp::LESS);
    }
}
