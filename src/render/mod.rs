// Frame composition stack: primitives, effects and scene layouts

pub mod animation;
pub mod color;
pub mod fb;
pub mod gauge;
pub mod history;
pub mod idle;
pub mod luts;
pub mod scene;
pub mod spark;
pub mod text;
pub mod theme;

pub use animation::AnimationEngine;
pub use fb::{DISPLAY_HEIGHT, DISPLAY_WIDTH, Frame};
pub use idle::IdleController;
pub use scene::Renderer;
