//! Buildtree core library.
//!
//! Resolves where every project of a multi-project tree writes its build
//! output. The root build directory may be relocated anywhere; each
//! subproject's default output directory is then namespaced below it by name.
//! Declared evaluation-order constraints between subprojects are checked for
//! cycles and turned into a deterministic evaluation order.
//!
//! The pipeline is [`manifest`] (YAML into [`ast`]), then
//! [`ir::BuildLayout::from_manifest`] (the configuration pass), then
//! [`layout_gen`] for rendering. [`runner`] wires these to the [`cli`].

pub mod ast;
pub mod cli;
pub mod ir;
pub mod layout_gen;
pub mod manifest;
pub mod runner;
