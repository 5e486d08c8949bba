//! hcsc — a native-code compiler for the HCS scripting language.
//!
//! The pipeline is small and strictly sequential:
//!
//! 1. [`syntax`] — lex and parse one `.hcs` file into the [`ast`] tree
//!    (the only pass that can reject a program).
//! 2. [`collect`] — record class names and infer field types from
//!    `self.field = …` assignments.
//! 3. [`emit`] — lower the tree to a C translation unit: type-directed
//!    operator selection, string-interpolation lowering, method-name
//!    mangling, and the runtime prelude + `main` wrapper.
//! 4. [`link`] — hand the C to the system compiler and produce the binary.
//!
//! Everything after parsing is permissive by design: unknown names and
//! shapes emit as-is and the C compiler has the final word.

pub mod ast;
pub mod collect;
pub mod config;
pub mod emit;
pub mod link;
pub mod location;
pub mod scope;
pub mod syntax;
pub mod types;
