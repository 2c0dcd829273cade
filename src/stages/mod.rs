pub mod stage0_normalize;
pub mod stage1_load;
pub mod stage2_classify;
pub mod stage3_render;

pub use stage0_normalize::*;
pub use stage1_load::*;
pub use stage2_classify::*;
pub use stage3_render::*;
