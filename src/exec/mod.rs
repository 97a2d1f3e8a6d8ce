// src/exec/mod.rs

//! Deployment execution layer.
//!
//! - [`deployer`] performs a plan: copy/symlink, model textures and
//!   materials, shader transform or compilation.
//! - [`glsl`] is the lexical Vulkan→OpenGL GLSL rewrite.
//! - [`compiler`] provides the `ShaderCompiler` trait and the real
//!   `glslangValidator` implementation (tests swap in a fake).
//! - [`transcript`] turns compiler output into messages.

pub mod compiler;
pub mod deployer;
pub mod glsl;
pub mod transcript;

pub use compiler::{GlslangCompiler, ShaderCompiler};
pub use deployer::Deployer;
pub use transcript::CompilerTranscript;
