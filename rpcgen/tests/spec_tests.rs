/* Spec loading: prototype parsing, attribute overlay, types file, validation */

use rpcgen::spec::{self, SpecSources, apply_overlay, parse_spec, validate};
use rpcgen::{DiagnosticKind, Diagnostics, GenError};
use rpcgen_types::{HeaderKind, PointerDir, SpecTable, TypeRegistry};
use std::fs;

fn parse(text: &str) -> (SpecTable, Diagnostics) {
    let registry = TypeRegistry::with_builtins();
    let mut diags = Diagnostics::new();
    let table = parse_spec("gl", text, &registry, &mut diags);
    (table, diags)
}

#[test]
fn parses_prototypes_in_file_order() {
    let (table, diags) = parse(
        "# comment\n\
         \n\
         void glFlush(void);\n\
         int glGetError();\n\
         void glBufferData(unsigned int target, const void* data, int size, unsigned int usage);\n",
    );
    assert!(diags.is_empty());
    let names: Vec<&str> = table.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["glFlush", "glGetError", "glBufferData"]);

    let buffer_data = table.find("glBufferData").unwrap();
    assert!(buffer_data.ret.is_void());
    assert_eq!(buffer_data.params.len(), 4);
    assert_eq!(buffer_data.params[1].type_name(), "const void*");
    assert!(buffer_data.params[1].is_pointer());
    assert_eq!(buffer_data.params[2].byte_size(), 4);
    assert_eq!(table.max_param_count(), 4);
}

#[test]
fn unnamed_parameters_get_positional_names() {
    let (table, diags) = parse("int glIsEnabled(unsigned int, int);\n");
    assert!(diags.is_empty());
    let entry = table.find("glIsEnabled").unwrap();
    assert_eq!(entry.params[0].name, "arg0");
    assert_eq!(entry.params[1].name, "arg1");
}

#[test]
fn malformed_lines_are_reported_with_line_numbers() {
    let (table, diags) = parse("void ok(int a);\nthis is not a prototype\nGLthing bad(int a);\nvoid ok(int b);\n");
    assert_eq!(table.len(), 1);

    let found: Vec<(DiagnosticKind, Option<usize>)> = diags.iter().map(|d| (d.kind, d.line)).collect();
    assert_eq!(
        found,
        vec![
            (DiagnosticKind::MalformedSpecLine, Some(2)),
            (DiagnosticKind::UnknownType, Some(3)),
            (DiagnosticKind::DuplicateEntryPoint, Some(4)),
        ]
    );
}

#[test]
fn opcodes_follow_table_position() {
    let (table, _) = parse("void a();\nvoid b();\nvoid c();\n");
    assert_eq!(table.opcode_of("a"), Some(0));
    assert_eq!(table.opcode_of("c"), Some(2));
    assert_eq!(table.last_opcode(), 3);

    let (swapped, _) = parse("void b();\nvoid a();\nvoid c();\n");
    assert_eq!(swapped.opcode_of("a"), table.opcode_of("b"));
    assert_eq!(swapped.opcode_of("b"), table.opcode_of("a"));
    assert_eq!(swapped.opcode_of("c"), table.opcode_of("c"));
}

const SPEC: &str = "\
int foo(int a, void* b);
void glReadPixels(int x, int y, int width, int height, void* pixels);
void glTexImage(const void* data, int size);
void glUnsupported(int a);
";

const OVERLAY: &str = "\
GLOBAL
\tbase_opcode 1024
\tencoder_headers \"glUtils.h\" \"glFixed.h\"
\tdecoder_headers \"glUtils.h\"

foo
\tdir b out
\tlen b 4

glReadPixels
\tdir pixels out
\tlen pixels width * height * 4
\tcustom_unpack pixels unpackPixels(stream, pixels, width, height)

glTexImage
\tlen data size
\tvar_flag data nullAllowed
\tcustom_pack data packTexture(ptr, data, size)
\tflag custom_decoder

glUnsupported
\tflag unsupported
";

#[test]
fn overlay_applies_entry_and_global_attributes() {
    let (mut table, _) = parse(SPEC);
    let mut diags = Diagnostics::new();
    apply_overlay(&mut table, OVERLAY, &mut diags);
    assert!(diags.is_empty(), "{:?}", diags);

    assert_eq!(table.settings.base_opcode, 1024);
    assert_eq!(table.opcode_of("glReadPixels"), Some(1025));
    assert_eq!(
        table.settings.headers(HeaderKind::Encoder),
        &["\"glUtils.h\"".to_string(), "\"glFixed.h\"".to_string()]
    );
    assert_eq!(table.settings.headers(HeaderKind::Decoder).len(), 1);

    let read_pixels = table.find("glReadPixels").unwrap();
    let pixels = read_pixels.param("pixels").unwrap().pointer_attrs().unwrap();
    assert_eq!(pixels.dir, PointerDir::Out);
    assert_eq!(pixels.len_expr, "width * height * 4");
    assert_eq!(
        pixels.unpack_expr.as_deref(),
        Some("unpackPixels(stream, pixels, width, height)")
    );

    let tex = table.find("glTexImage").unwrap();
    let data = tex.param("data").unwrap().pointer_attrs().unwrap();
    assert!(data.null_allowed);
    assert_eq!(data.dir, PointerDir::In);
    assert_eq!(data.pack_expr.as_deref(), Some("packTexture(ptr, data, size)"));
    assert!(tex.custom_decoder);

    assert!(table.find("glUnsupported").unwrap().unsupported);
}

#[test]
fn base_opcode_that_would_overflow_is_rejected() {
    let (mut table, _) = parse("void a();\nvoid b();\n");
    let mut diags = Diagnostics::new();
    apply_overlay(&mut table, "GLOBAL\n\tbase_opcode 16\n\tbase_opcode 4294967295\n", &mut diags);

    let found: Vec<(DiagnosticKind, Option<usize>)> = diags.iter().map(|d| (d.kind, d.line)).collect();
    assert_eq!(found, vec![(DiagnosticKind::InvalidAttributeValue, Some(3))]);
    assert_eq!(table.settings.base_opcode, 16);
    assert_eq!(table.last_opcode(), 18);

    apply_overlay(&mut table, "GLOBAL\n\tbase_opcode 4294967293\n", &mut diags);
    assert_eq!(diags.len(), 1);
    assert_eq!(table.opcode_of("b"), Some(u32::MAX - 1));
    assert_eq!(table.last_opcode(), u32::MAX);
}

#[test]
fn validation_reports_opcode_overflow_set_outside_the_overlay() {
    let (mut table, _) = parse("void a();\nvoid b();\n");
    table.settings.base_opcode = u32::MAX;
    let mut diags = Diagnostics::new();
    validate(&table, &mut diags);
    assert_eq!(diags.count(DiagnosticKind::InvalidAttributeValue), 1);
}

#[test]
fn overlay_problems_are_warnings() {
    let (mut table, _) = parse(SPEC);
    let mut diags = Diagnostics::new();
    let overlay = "\
glMissing
\tlen x 4

foo
\tlen nothere 4
\tdir a out
\tdir b sideways
\tcolour b red

GLOBAL
\tframe_rate 60
";
    apply_overlay(&mut table, overlay, &mut diags);

    let found: Vec<(DiagnosticKind, Option<usize>)> = diags.iter().map(|d| (d.kind, d.line)).collect();
    assert_eq!(
        found,
        vec![
            (DiagnosticKind::UnknownEntryPoint, Some(1)),
            (DiagnosticKind::UnknownParameter, Some(5)),
            (DiagnosticKind::NotAPointer, Some(6)),
            (DiagnosticKind::InvalidAttributeValue, Some(7)),
            (DiagnosticKind::UnknownAttribute, Some(8)),
            (DiagnosticKind::UnknownGlobalKey, Some(11)),
        ]
    );
    // the stray attributes left the entry untouched
    let foo = table.find("foo").unwrap();
    assert_eq!(foo.param("b").unwrap().pointer_attrs().unwrap().dir, PointerDir::In);
}

#[test]
fn applying_an_overlay_twice_changes_nothing() {
    let (mut once, _) = parse(SPEC);
    let mut diags = Diagnostics::new();
    apply_overlay(&mut once, OVERLAY, &mut diags);

    let (mut twice, _) = parse(SPEC);
    apply_overlay(&mut twice, OVERLAY, &mut diags);
    apply_overlay(&mut twice, OVERLAY, &mut diags);

    assert_eq!(once.entries(), twice.entries());
    assert_eq!(once.settings, twice.settings);
}

#[test]
fn validation_flags_missing_lengths_and_pointer_returns() {
    let (table, _) = parse("void* glMapBuffer(int target);\nvoid glUpload(void* data);\n");
    let mut diags = Diagnostics::new();
    validate(&table, &mut diags);

    assert_eq!(diags.count(DiagnosticKind::PointerReturn), 1);
    assert_eq!(diags.count(DiagnosticKind::MissingLengthExpression), 1);
    let missing = diags
        .iter()
        .find(|d| d.kind == DiagnosticKind::MissingLengthExpression)
        .unwrap();
    assert_eq!(missing.entry.as_deref(), Some("glUpload"));
    assert!(missing.message.contains("'data'"));
}

#[test]
fn load_reads_types_spec_and_overlay_from_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("gl.types"), "GLenum 32 0x%08x false\nGLfloat 32 %f false\n").unwrap();
    fs::write(dir.path().join("gl.in"), "void glClear(GLenum mask, GLfloat depth, void* rect);\n").unwrap();
    fs::write(dir.path().join("gl.attrib"), "glClear\n\tlen rect 16\n").unwrap();

    let sources = SpecSources::from_dir(dir.path(), "gl");
    let loaded = spec::load("gl", &sources).unwrap();
    assert!(loaded.diagnostics.is_empty());

    let clear = loaded.table.find("glClear").unwrap();
    assert_eq!(clear.params[0].ty.print_format, "0x%08x");
    assert_eq!(clear.params[1].byte_size(), 4);
    assert_eq!(clear.params[2].pointer_attrs().unwrap().len_expr, "16");
    assert!(loaded.registry.get("GLenum").is_some());
}

#[test]
fn overlay_and_types_are_optional() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("gl.in"), "void glUpload(void* data);\n").unwrap();

    let sources = SpecSources::from_dir(dir.path(), "gl");
    assert!(sources.attributes.is_none());
    assert!(sources.types.is_none());

    let loaded = spec::load("gl", &sources).unwrap();
    assert_eq!(loaded.diagnostics.count(DiagnosticKind::MissingLengthExpression), 1);
}

#[test]
fn missing_spec_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let sources = SpecSources::from_dir(dir.path(), "gl");
    match spec::load("gl", &sources) {
        Err(GenError::Read { path, .. }) => assert_eq!(path, dir.path().join("gl.in")),
        other => panic!("expected read error, got {:?}", other.map(|l| l.table.len())),
    }
}

#[test]
fn bad_types_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("gl.types"), "GLenum 32 %d false\nGLhalf 12 %d false\n").unwrap();
    fs::write(dir.path().join("gl.in"), "void glFlush();\n").unwrap();

    let err = spec::load("gl", &SpecSources::from_dir(dir.path(), "gl")).unwrap_err();
    assert!(matches!(err, GenError::TypeDefinition { line: 2, .. }));
    assert!(err.to_string().contains("gl.types:2"));
}
