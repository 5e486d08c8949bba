use std::path::PathBuf;
use std::process::Command;

// ── helpers ──────────────────────────────────────────────────────────────────

fn hcsc_bin() -> PathBuf {
    // CARGO_BIN_EXE_hcsc is set by cargo test for integration tests
    PathBuf::from(env!("CARGO_BIN_EXE_hcsc"))
}

struct TempHcs {
    dir: tempfile::TempDir,
    input: PathBuf,
}

impl TempHcs {
    fn new(source: &str) -> Self {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("app.hcs");
        std::fs::write(&input, source).unwrap();
        Self { dir, input }
    }

    /// Drop a `project.hcl` next to the input.
    fn config(self, content: &str) -> Self {
        std::fs::write(self.dir.path().join("project.hcl"), content).unwrap();
        self
    }

    /// Run hcsc on the input with extra args.  Returns (stdout, stderr, exit code).
    fn run(&self, extra: &[&str]) -> (String, String, i32) {
        self.run_env(extra, &[])
    }

    fn run_env(&self, extra: &[&str], env: &[(&str, &str)]) -> (String, String, i32) {
        let mut cmd = Command::new(hcsc_bin());
        cmd.arg(&self.input);
        for a in extra {
            cmd.arg(a);
        }
        for (k, v) in env {
            cmd.env(k, v);
        }
        cmd.current_dir(self.dir.path());
        let out = cmd.output().expect("failed to run hcsc");
        (
            String::from_utf8_lossy(&out.stdout).into_owned(),
            String::from_utf8_lossy(&out.stderr).into_owned(),
            out.status.code().unwrap_or(-1),
        )
    }

    /// Run with `--emit-c` and return the generated C.
    fn emit_c(&self) -> String {
        let (stdout, stderr, code) = self.run(&["--emit-c"]);
        assert_eq!(code, 0, "emit-c failed: {stderr}");
        stdout
    }
}

/// Collapse whitespace runs so assertions are layout-independent.
fn flat(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── end-to-end scenarios (at the emitted-C level) ────────────────────────────

#[test]
fn test_hello() {
    let t = TempHcs::new("func main(args) [ log \"hello\" ]");
    let out = flat(&t.emit_c());
    assert!(out.contains("printf(\"%s\\n\", \"hello\");"));
    assert!(out.contains("int hs_main(Array args)"));
    assert!(out.contains(
        "int main(int argc, char** argv) { Array args = {argv + 1, argc - 1}; return hs_main(args); }"
    ));
}

#[test]
fn test_string_build() {
    let t = TempHcs::new(
        "func main(args) [ v = \"v\" + get_current_version() log \"{v}\" return 0 ]",
    );
    let out = flat(&t.emit_c());
    assert!(out.contains("asprintf(&res, \"%s%s\", \"v\", get_current_version())"));
    assert!(out.contains("asprintf(&str, \"%s\", v)"));
    assert!(out.contains("char* v;"));
}

#[test]
fn test_class_with_field() {
    let t = TempHcs::new(
        "class C [ func init() [ self.n = \"x\" ] func show() [ v = self.n log \"{v}\" ] ]\n\
         func main(args) [ c = new C() c.init() c.show() return 0 ]",
    );
    let out = flat(&t.emit_c());
    assert!(out.contains("struct C { char* n; };"));
    assert!(out.contains("void C_init(struct C* self) { self->n = \"x\"; }"));
    assert!(out.contains("self->n = \"x\";"));
    assert!(out.contains("c = (struct C*)malloc(sizeof(struct C));"));
    assert!(out.contains("C_init(c);"));
    assert!(out.contains("C_show(c);"));
}

#[test]
fn test_branching_equality() {
    let t = TempHcs::new(
        "func main(args) [ if read_input() == \"yes\" [ log \"y\" ] else [ log \"n\" ] return 0 ]",
    );
    let out = flat(&t.emit_c());
    assert!(out.contains("if ((strcmp(read_input(), \"yes\") == 0)) {"));
    assert!(out.contains("printf(\"%s\\n\", \"y\");"));
    assert!(out.contains("} else { printf(\"%s\\n\", \"n\");"));
}

#[test]
fn test_array_iteration() {
    let t = TempHcs::new("func main(args) [ for x in [\"a\", \"b\"] [ log \"{x}\" ] return 0 ]");
    let out = flat(&t.emit_c());
    assert!(out.contains("(Array){.data = (char**)(char*[]){ \"a\", \"b\" }, .len = 2 }"));
    assert!(out.contains(".len; _x_i++)"));
    assert!(out.contains(".data[_x_i];"));
    assert!(out.contains("asprintf(&str, \"%s\", x)"));
}

// ── emitted shapes ───────────────────────────────────────────────────────────

#[test]
fn test_method_mangling() {
    let t = TempHcs::new(
        "class Pkg [ func build() [ return 0 ] ]\nfunc main(args) [ p = new Pkg() p.build() return 0 ]",
    );
    let out = flat(&t.emit_c());
    assert!(out.contains("int Pkg_build(struct Pkg* self)"));
    assert!(out.contains("Pkg_build(p);"));
}

#[test]
fn test_empty_class() {
    let t = TempHcs::new("class E [ ]\nfunc main(args) [ return 0 ]");
    let out = flat(&t.emit_c());
    assert!(out.contains("struct E { char dummy; };"));
}

#[test]
fn test_for_in_list_dir() {
    let t = TempHcs::new("func main(args) [ for f in list_dir(\".\") [ log \"{f}\" ] return 0 ]");
    let out = flat(&t.emit_c());
    assert!(out.contains("for (int _f_i = 0; _f_i < list_dir(\".\").len; _f_i++)"));
    assert!(out.contains("char* f = list_dir(\".\").data[_f_i];"));
}

#[test]
fn test_imports_lowered() {
    let t = TempHcs::new("import <c:math>\nimport <virus:payload>\nfunc main(args) [ return 0 ]");
    let out = t.emit_c();
    assert!(out.contains("#include <math.h>\n"));
    assert!(out.contains("#include \"payload.h\"\n"));
}

#[test]
fn test_manual_mode_defer_macro() {
    let manual = TempHcs::new("--- manual ---\nfunc main(args) [ return 0 ]");
    assert!(manual.emit_c().contains("#define defer(stmt)"));

    let automatic = TempHcs::new("--- automatic ---\nfunc main(args) [ return 0 ]");
    assert!(!automatic.emit_c().contains("#define defer"));
}

#[test]
fn test_prelude_runtime_types() {
    let t = TempHcs::new("func main(args) [ return 0 ]");
    let out = t.emit_c();
    assert!(out.starts_with("#define _GNU_SOURCE\n"));
    assert!(out.contains("typedef struct { char** data; int len; } Array;"));
    assert!(out.contains("typedef struct { int status; char* body; } Response;"));
    assert!(out.contains("typedef struct { Array items; } Json;"));
    assert!(out.contains("typedef struct { struct { Array c; Array virus; } dependencies; } Hcl;"));
}

// ── exit codes and errors ────────────────────────────────────────────────────

#[test]
fn test_parse_error_exit_code_and_position() {
    let t = TempHcs::new("func f( [ ]");
    let (_, stderr, code) = t.run(&["--emit-c"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error"), "stderr: {stderr}");
    assert!(stderr.contains("`[`"), "stderr: {stderr}");
    assert!(stderr.contains("1:9"), "stderr: {stderr}");
}

#[test]
fn test_missing_input_exit_code() {
    let out = Command::new(hcsc_bin())
        .arg("no/such/file.hcs")
        .output()
        .expect("failed to run hcsc");
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("no/such/file.hcs"), "stderr: {stderr}");
}

#[test]
fn test_usage_error_without_input() {
    let out = Command::new(hcsc_bin())
        .output()
        .expect("failed to run hcsc");
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Usage"), "stderr: {stderr}");
}

// ── --emit-ast ───────────────────────────────────────────────────────────────

#[test]
fn test_emit_ast_is_valid_json() {
    let t = TempHcs::new("import <c:stdio>\nclass C [ ]\nfunc main(args) [ return 0 ]");
    let (stdout, stderr, code) = t.run(&["--emit-ast"]);
    assert_eq!(code, 0, "emit-ast failed: {stderr}");
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("output must be JSON");
    assert_eq!(value["imports"].as_array().map(Vec::len), Some(1));
    assert_eq!(value["items"].as_array().map(Vec::len), Some(2));
}

// ── output naming (C compiler stubbed via $CC) ───────────────────────────────

#[test]
fn test_output_flag_wins() {
    let t = TempHcs::new("func main(args) [ return 0 ]")
        .config("build {\n  binary_name = \"from-config\"\n}\n");
    let (stdout, stderr, code) = t.run_env(&["-o", "from-flag"], &[("CC", "true")]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("to from-flag"), "stdout: {stdout}");
}

#[test]
fn test_config_binary_name_used() {
    let t = TempHcs::new("func main(args) [ return 0 ]")
        .config("build {\n  binary_name = \"from-config\"\n}\n");
    let (stdout, stderr, code) = t.run_env(&[], &[("CC", "true")]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("to from-config"), "stdout: {stdout}");
}

#[test]
fn test_input_stem_is_default_output() {
    let t = TempHcs::new("func main(args) [ return 0 ]");
    let (stdout, stderr, code) = t.run_env(&[], &[("CC", "true")]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("to app"), "stdout: {stdout}");
}

#[test]
fn test_child_compiler_failure_surfaces() {
    let t = TempHcs::new("func main(args) [ return 0 ]");
    let (_, stderr, code) = t.run_env(&[], &[("CC", "false")]);
    assert_eq!(code, 1);
    assert!(stderr.contains("C compiler"), "stderr: {stderr}");
}

#[test]
fn test_success_message() {
    let t = TempHcs::new("func main(args) [ return 0 ]");
    let (stdout, _, code) = t.run_env(&[], &[("CC", "true")]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Compiled"), "stdout: {stdout}");
}
