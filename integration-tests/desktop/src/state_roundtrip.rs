//! Every state setter followed by its getter.

use lustre::state::{
  Capability, DepthComparison, DepthRange, FaceCullingMode, FaceCullingOrder, PolygonMode,
  PolygonModes, Rect,
};
use lustre::{Context, Error};
use lustre_gl::GL33;

pub fn fixture(ctx: &mut Context<GL33>) -> Result<(), Error> {
  log::info!("OpenGL {}", ctx.version()?);

  ctx.set_clear_color([0.25, 0.5, 0.75, 1.])?;
  assert_eq!(ctx.clear_color()?, [0.25, 0.5, 0.75, 1.]);

  ctx.set_clear_depth(0.5)?;
  assert_eq!(ctx.clear_depth()?, 0.5);

  ctx.set_clear_stencil(3)?;
  assert_eq!(ctx.clear_stencil()?, 3);

  let rect = Rect::new(8, 16, 320, 240);
  ctx.set_viewport(rect)?;
  assert_eq!(ctx.viewport()?, rect);
  ctx.set_scissor_box(rect)?;
  assert_eq!(ctx.scissor_box()?, rect);

  // only 1 is guaranteed for both on core profiles
  ctx.set_line_width(1.)?;
  assert_eq!(ctx.line_width()?, 1.);
  ctx.set_point_size(2.)?;
  assert_eq!(ctx.point_size()?, 2.);

  ctx.set_polygon_mode(PolygonModes::both(PolygonMode::Line))?;
  assert_eq!(
    ctx.polygon_mode()?,
    PolygonModes {
      front: PolygonMode::Line,
      back: PolygonMode::Line
    }
  );
  ctx.set_polygon_mode(PolygonModes::both(PolygonMode::Fill))?;

  let range = DepthRange {
    near: 0.25,
    far: 0.75,
  };
  ctx.set_depth_range(range)?;
  assert_eq!(ctx.depth_range()?, range);

  for cap in [
    Capability::DepthTest,
    Capability::DepthClamp,
    Capability::FaceCulling,
    Capability::ScissorTest,
    Capability::Blending,
    Capability::PrimitiveRestart,
    Capability::FramebufferSrgb,
  ] {
    ctx.set_enabled(cap, true)?;
    assert!(ctx.is_enabled(cap)?, "{:?} should be enabled", cap);
    ctx.set_enabled(cap, false)?;
    assert!(!ctx.is_enabled(cap)?, "{:?} should be disabled", cap);
  }

  ctx.set_front_face(FaceCullingOrder::CW)?;
  assert_eq!(ctx.front_face()?, FaceCullingOrder::CW);
  ctx.set_cull_face_mode(FaceCullingMode::Both)?;
  assert_eq!(ctx.cull_face_mode()?, FaceCullingMode::Both);

  ctx.set_depth_func(DepthComparison::GreaterOrEqual)?;
  assert_eq!(ctx.depth_func()?, DepthComparison::GreaterOrEqual);
  ctx.set_depth_mask(false)?;
  assert!(!ctx.depth_mask()?);

  ctx.set_active_texture_unit(5)?;
  assert_eq!(ctx.active_texture_unit()?, 5);
  ctx.set_active_texture_unit(0)
}
