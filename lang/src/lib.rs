//! Starlark language toolchain.
//!
//! Rigel is a front end for the
//! [Starlark](https://github.com/bazelbuild/starlark) configuration language.
//! This crate contains tools for Starlark source analysis, starting with
//! lexical scanning.
//!

#[macro_use]
extern crate static_assertions;

pub mod toolchain;
