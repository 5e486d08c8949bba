//! Collector pass: class names and field-type inference.
//!
//! The first of the two semantic walks. It records every declared class name
//! and, for each `self.<field> = <expr>` assignment anywhere inside a class
//! body, the field's inferred static type. The emitter consumes the
//! resulting [`ClassTable`]; no code is produced here.

use crate::ast::{ClassDef, Expr, Item, Program, Stmt, StmtKind};
use crate::types::{CType, builtin_return_type};
use std::collections::HashSet;

// ── ClassTable ───────────────────────────────────────────────────────────────

/// Class name set plus per-class field→type mapping in first-assignment
/// order (struct emission needs declaration order).
#[derive(Debug, Default)]
pub struct ClassTable<'src> {
    names: HashSet<&'src str>,
    fields: Vec<(&'src str, Vec<(&'src str, CType<'src>)>)>,
}

impl<'src> ClassTable<'src> {
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// The class's fields in declaration order; empty for unknown classes.
    pub fn fields_of(&self, class: &str) -> &[(&'src str, CType<'src>)] {
        self.fields
            .iter()
            .find(|(name, _)| *name == class)
            .map(|(_, fields)| fields.as_slice())
            .unwrap_or(&[])
    }

    pub fn field_type(&self, class: &str, field: &str) -> Option<CType<'src>> {
        self.fields_of(class)
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, ty)| *ty)
    }

    fn declare(&mut self, class: &'src str) {
        self.names.insert(class);
        if !self.fields.iter().any(|(name, _)| *name == class) {
            self.fields.push((class, Vec::new()));
        }
    }

    /// Record a field, keeping the first-assignment position but letting a
    /// later assignment win on type (last write wins, as in the source).
    fn record(&mut self, class: &'src str, field: &'src str, ty: CType<'src>) {
        let Some((_, fields)) = self.fields.iter_mut().find(|(name, _)| *name == class) else {
            return;
        };
        match fields.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = ty,
            None => fields.push((field, ty)),
        }
    }
}

// ── Collection ───────────────────────────────────────────────────────────────

pub fn collect<'src>(program: &Program<'src>) -> ClassTable<'src> {
    let mut table = ClassTable::default();
    for item in &program.items {
        if let Item::Class(class) = item {
            collect_class(class, &mut table);
        }
    }
    table
}

fn collect_class<'src>(class: &ClassDef<'src>, table: &mut ClassTable<'src>) {
    table.declare(class.name);
    for func in &class.funcs {
        collect_stmts(&func.body, class.name, table);
    }
}

fn collect_stmts<'src>(stmts: &[Stmt<'src>], class: &'src str, table: &mut ClassTable<'src>) {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Assign { target, value } => {
                if let Expr::Dot { recv, field } = target
                    && matches!(**recv, Expr::Var("self"))
                {
                    table.record(class, *field, infer_type(value));
                }
            }
            StmtKind::If {
                body,
                elifs,
                orelse,
                ..
            } => {
                collect_stmts(body, class, table);
                for elif in elifs {
                    collect_stmts(&elif.body, class, table);
                }
                if let Some(orelse) = orelse {
                    collect_stmts(orelse, class, table);
                }
            }
            StmtKind::For { body, .. } => collect_stmts(body, class, table),
            _ => {}
        }
    }
}

// ── Type inference ───────────────────────────────────────────────────────────

/// Infer a static type from an expression's form alone.
///
/// Call return types come from the same builtin table the emitter consults;
/// everything the collector cannot see (locals, receivers) is `Unknown`.
pub fn infer_type<'src>(expr: &Expr<'src>) -> CType<'src> {
    match expr {
        Expr::Str(_) => CType::Str,
        Expr::Int(_) => CType::Int,
        Expr::Null => CType::VoidPtr,
        Expr::Add(operands) => {
            // Left-to-right accumulation: once the chain turns `char*` it
            // stays `char*`, so `int + str + int` is `char*`.
            let mut acc = infer_type(&operands[0]);
            for operand in &operands[1..] {
                let rhs = infer_type(operand);
                acc = if acc == CType::Str || rhs == CType::Str {
                    CType::Str
                } else {
                    CType::Int
                };
            }
            acc
        }
        Expr::New(name) => CType::Struct(*name),
        Expr::Call { callee, .. } => match &**callee {
            Expr::Var(name) => builtin_return_type(name),
            _ => CType::Unknown,
        },
        _ => CType::Unknown,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn table(src: &str) -> ClassTable<'_> {
        collect(&parse(src).expect("source should parse"))
    }

    #[test]
    fn test_field_inference_from_init() {
        let t = table("class C [ func init() [ self.name = \"x\" self.count = 0 ] ]");
        assert!(t.contains("C"));
        assert_eq!(t.field_type("C", "name"), Some(CType::Str));
        assert_eq!(t.field_type("C", "count"), Some(CType::Int));
    }

    #[test]
    fn test_field_order_is_first_assignment_order() {
        let t = table("class C [ func init() [ self.b = 1 self.a = \"x\" self.b = 2 ] ]");
        let names: Vec<&str> = t.fields_of("C").iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_empty_class_still_declared() {
        let t = table("class E [ ]");
        assert!(t.contains("E"));
        assert!(t.fields_of("E").is_empty());
    }

    #[test]
    fn test_fields_in_nested_statements() {
        let t = table(
            "class C [ func init(flag) [ if flag == \"y\" [ self.a = 1 ] else [ self.b = \"s\" ] ] ]",
        );
        assert_eq!(t.field_type("C", "a"), Some(CType::Int));
        assert_eq!(t.field_type("C", "b"), Some(CType::Str));
    }

    #[test]
    fn test_non_self_assignments_ignored() {
        let t = table("class C [ func init() [ x = 1 other.y = 2 ] ]");
        assert!(t.fields_of("C").is_empty());
    }

    #[test]
    fn test_module_level_assignments_ignored() {
        let t = table("class C [ ]\nfunc f() [ self.x = 1 ]");
        assert!(t.fields_of("C").is_empty());
    }

    #[test]
    fn test_infer_null_and_new() {
        let t = table("class C [ func init() [ self.p = null self.q = new C() ] ]");
        assert_eq!(t.field_type("C", "p"), Some(CType::VoidPtr));
        assert_eq!(t.field_type("C", "q"), Some(CType::Struct("C")));
    }

    #[test]
    fn test_infer_builtin_calls() {
        let t = table(
            "class C [ func init() [ self.body = read_file(\"f\") self.resp = curl_get(\"u\") self.buf = allocate(16) ] ]",
        );
        assert_eq!(t.field_type("C", "body"), Some(CType::Str));
        assert_eq!(t.field_type("C", "resp"), Some(CType::Response));
        assert_eq!(t.field_type("C", "buf"), Some(CType::VoidPtr));
    }

    #[test]
    fn test_infer_unknown_call_and_var() {
        let t = table("class C [ func init() [ self.a = mystery() self.b = somevar ] ]");
        assert_eq!(t.field_type("C", "a"), Some(CType::Unknown));
        assert_eq!(t.field_type("C", "b"), Some(CType::Unknown));
    }

    #[test]
    fn test_add_chain_mixed_is_str() {
        let t = table("class C [ func init() [ self.v = 1 + \"x\" + 2 ] ]");
        assert_eq!(t.field_type("C", "v"), Some(CType::Str));
    }

    #[test]
    fn test_add_chain_ints_is_int() {
        let t = table("class C [ func init() [ self.v = 1 + 2 + 3 ] ]");
        assert_eq!(t.field_type("C", "v"), Some(CType::Int));
    }

    #[test]
    fn test_multiple_classes() {
        let t = table(
            "class A [ func init() [ self.x = 1 ] ]\nclass B [ func init() [ self.y = \"s\" ] ]",
        );
        assert_eq!(t.field_type("A", "x"), Some(CType::Int));
        assert_eq!(t.field_type("B", "y"), Some(CType::Str));
        assert_eq!(t.field_type("A", "y"), None);
    }
}
