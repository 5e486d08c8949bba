//! Static types inferred during collection and emission, plus the built-in
//! signature table shared by both passes.

use std::fmt;

// ── CType ────────────────────────────────────────────────────────────────────

/// The static type attached to every emitted expression.
///
/// `Unknown` is an explicit propagating bottom: it never aborts emission, and
/// each site that needs a concrete C type widens it explicitly (usually to
/// `char*` via [`CType::concrete`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CType<'src> {
    Int,
    Bool,
    /// `char*`
    Str,
    Void,
    /// `void*`
    VoidPtr,
    /// The runtime's dynamic string array.
    Array,
    /// `Response*` — HTTP response struct pointer.
    Response,
    /// `Json*`
    Json,
    /// `Hcl*`
    Hcl,
    /// `struct Name*` for a user class.
    Struct(&'src str),
    Unknown,
}

impl<'src> CType<'src> {
    pub fn is_unknown(&self) -> bool {
        matches!(self, CType::Unknown)
    }

    /// The class name when this is a pointer to a user struct.
    pub fn struct_name(&self) -> Option<&'src str> {
        match self {
            CType::Struct(name) => Some(name),
            _ => None,
        }
    }

    /// Widen `Unknown` to `char*` where a concrete C type is required
    /// (declarations, struct fields).
    pub fn concrete(self) -> CType<'src> {
        if self.is_unknown() { CType::Str } else { self }
    }
}

impl fmt::Display for CType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CType::Int => write!(f, "int"),
            CType::Bool => write!(f, "bool"),
            CType::Str => write!(f, "char*"),
            CType::Void => write!(f, "void"),
            CType::VoidPtr => write!(f, "void*"),
            CType::Array => write!(f, "Array"),
            CType::Response => write!(f, "Response*"),
            CType::Json => write!(f, "Json*"),
            CType::Hcl => write!(f, "Hcl*"),
            CType::Struct(name) => write!(f, "struct {name}*"),
            CType::Unknown => write!(f, "unknown"),
        }
    }
}

// ── Built-in signatures ──────────────────────────────────────────────────────

/// Return type of a built-in free function or runtime method.
///
/// One table serves both the collector's field inference and the emitter's
/// call typing. The lowered specials (`allocate`, `deallocate`,
/// `version_compare`) are listed here too so the two passes always agree.
pub fn builtin_return_type(name: &str) -> CType<'static> {
    match name {
        "read_file" | "get_current_version" | "get_remote_version" | "replace" | "get_cwd"
        | "write_file" | "read_input" => CType::Str,
        "curl_get" => CType::Response,
        "json_parse" => CType::Json,
        "parse_hcl" => CType::Hcl,
        "list_dir" => CType::Array,
        "file_exists" => CType::Bool,
        "build" | "run" | "install" | "remove" | "version_compare" => CType::Int,
        "allocate" => CType::VoidPtr,
        "deallocate" => CType::Void,
        _ => CType::Unknown,
    }
}

/// Whether a function with this source-level name gets C return type `int`.
/// `main` is included because it is emitted as `hs_main`, which returns the
/// process exit code through the argv wrapper.
pub fn returns_int(name: &str) -> bool {
    matches!(
        name,
        "main" | "build" | "run" | "install" | "remove" | "version_compare"
    )
}

// ── Tests ────────────────────────────────────────────────────────────────────
