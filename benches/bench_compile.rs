use criterion::{Criterion, black_box, criterion_group, criterion_main};
use hcsc::collect::collect;
use hcsc::emit::emit_program;
use hcsc::syntax::parse;

/// Generate a realistic HCS module with classes, methods, control flow, and
/// interpolation so every emitter path gets exercised.
fn make_module(index: usize) -> String {
    format!(
        r#"
class Pkg{i} [
    func init() [
        self.name = "pkg-{i}"
        self.version = get_current_version()
        self.count = {i} + 1
    ]
    func build() [
        if file_exists("build-{i}.lock") [
            log "already built {{self.name}}"
            return 1
        ]
        return 0
    ]
]

func check{i}(args) [
    p = new Pkg{i}()
    p.init()
    for entry in list_dir(".") [
        if entry == "target" [
            log "skipping {{entry}}"
        ] else [
            n = version_compare(entry, "v{i}")
        ]
    ]
    return
]
"#,
        i = index
    )
}

fn make_program(modules: usize) -> String {
    let mut src = String::from("--- automatic ---\nimport <c:math>\nimport <virus:runtime>\n");
    for i in 0..modules {
        src.push_str(&make_module(i));
    }
    src.push_str("func main(args) [ log \"done\" return 0 ]\n");
    src
}

fn bench_compile(c: &mut Criterion) {
    let small = make_program(5);
    c.bench_function("compile_5_modules", |b| {
        b.iter(|| {
            let program = parse(black_box(&small)).unwrap();
            let classes = collect(&program);
            black_box(emit_program(&program, &classes));
        });
    });

    let large = make_program(200);
    c.bench_function("compile_200_modules", |b| {
        b.iter(|| {
            let program = parse(black_box(&large)).unwrap();
            let classes = collect(&program);
            black_box(emit_program(&program, &classes));
        });
    });

    // Parsing alone, to separate front-end from emission cost.
    c.bench_function("parse_200_modules", |b| {
        b.iter(|| {
            black_box(parse(black_box(&large)).unwrap());
        });
    });
}

criterion_group!(benches, bench_compile);
criterion_main!(benches);
