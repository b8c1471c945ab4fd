use std::io;

use tlwire_gen::{Config, Outputs, generate};
use tlwire_parser::{parse_tl_file, tl::Definition};

fn defs(src: &str) -> Vec<Definition> {
    parse_tl_file(src).collect::<Result<_, _>>().unwrap()
}

#[derive(Debug)]
struct Generated {
    common: String,
    types: String,
    functions: String,
}

fn run(src: &str, config: &Config) -> io::Result<Generated> {
    let mut outputs = Outputs { common: Vec::new(), types: Vec::new(), functions: Vec::new() };
    generate(&defs(src), config, &mut outputs)?;
    outputs.flush()?;
    Ok(Generated {
        common: String::from_utf8(outputs.common).unwrap(),
        types: String::from_utf8(outputs.types).unwrap(),
        functions: String::from_utf8(outputs.functions).unwrap(),
    })
}

const SCHEMA: &str = "
boolTrue#997275b5 = Bool;
geoPoint#b2a2f663 flags:# long:double lat:double access_hash:long accuracy_radius:flags.0?int = GeoPoint;
auth.sentCodeTypeSms#c000bba2 length:int = auth.SentCodeType;
message#5bb8e511 msg_id:long seqno:int bytes:int body:Object = Message;
msg_container#73f1f8dc messages:vector<%Message> = MessageContainer;
msgs_ack#62d6b459 msg_ids:Vector<long> = MsgsAck;
---functions---
ping#7abe77ec ping_id:long = Pong;
invokeWithLayer#da9b0d0d {X:Type} layer:int query:!X = X;
";

#[test]
fn emits_flagged_descriptor() {
    let out = run(SCHEMA, &Config::default()).unwrap();
    assert!(out.types.contains("pub static GEO_POINT: TypeDescriptor = TypeDescriptor {"));
    assert!(out.types.contains("id: 0xb2a2f663,"));
    assert!(out.types.contains("Field::required(\"long\", Codec::Double),"));
    assert!(out.types.contains("Field::optional(\"accuracy_radius\", 0, Codec::Int),"));
}

#[test]
fn skips_builtins() {
    let out = run(SCHEMA, &Config::default()).unwrap();
    assert!(!out.types.contains("BOOL_TRUE"));
}

#[test]
fn namespaces_become_modules() {
    let out = run(SCHEMA, &Config::default()).unwrap();
    assert!(out.types.contains("pub mod auth {"));
    assert!(out.types.contains("pub static SENT_CODE_TYPE_SMS: TypeDescriptor"));
    assert!(out.types.contains("name: \"auth.sentCodeTypeSms\","));
    assert!(out.types.contains("ty: \"auth.SentCodeType\","));
    assert!(out.common.contains("&types::auth::SENT_CODE_TYPE_SMS,"));
}

#[test]
fn vectors_and_bare_references() {
    let out = run(SCHEMA, &Config::default()).unwrap();
    assert!(out.types.contains("Field::required(\"messages\", Codec::BareVector(&Codec::Bare(0x5bb8e511))),"));
    assert!(out.types.contains("Field::required(\"msg_ids\", Codec::Vector(&Codec::Long)),"));
    assert!(out.types.contains("Field::required(\"body\", Codec::Object),"));
}

#[test]
fn functions_are_opt_in_for_the_schema_list() {
    let out = run(SCHEMA, &Config::default()).unwrap();
    assert!(out.functions.contains("pub static PING: TypeDescriptor"));
    assert!(out.functions.contains("kind: Kind::Function,"));
    assert!(out.functions.contains("Field::required(\"query\", Codec::Object),"));
    assert!(out.functions.contains("ty: \"X\","));
    assert!(!out.common.contains("functions::PING"));

    let config = Config { register_functions: true, ..Config::default() };
    let out = run(SCHEMA, &config).unwrap();
    assert!(out.common.contains("&functions::PING,"));
}

#[test]
fn name_for_id_is_optional() {
    let out = run(SCHEMA, &Config::default()).unwrap();
    assert!(!out.common.contains("fn name_for_id"));

    let config = Config { gen_name_for_id: true, ..Config::default() };
    let out = run(SCHEMA, &config).unwrap();
    assert!(out.common.contains("0x7abe77ec => Some(\"ping\"),"));
    assert!(out.common.contains("0xc000bba2 => Some(\"auth.sentCodeTypeSms\"),"));
}

#[test]
fn rejects_duplicate_ids() {
    let src = "a#1 = A;\nb#1 = B;";
    let err = run(src, &Config::default()).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

#[test]
fn rejects_second_flags_word() {
    let src = "a#1 flags:# flags2:# x:flags.0?int y:flags2.0?int = A;";
    assert!(run(src, &Config::default()).is_err());
}

#[test]
fn rejects_late_flags_word() {
    let src = "a#1 id:long flags:# x:flags.0?int = A;";
    assert!(run(src, &Config::default()).is_err());
}

#[test]
fn rejects_unresolved_bare_type() {
    let src = "a#1 items:vector<%Missing> = A;";
    assert!(run(src, &Config::default()).is_err());
}

#[test]
fn failed_generation_writes_nothing() {
    let mut outputs = Outputs { common: Vec::new(), types: Vec::new(), functions: Vec::new() };
    let result = generate(&defs("a#1 = A;\nb#1 = B;"), &Config::default(), &mut outputs);
    assert!(result.is_err());
    assert!(outputs.common.is_empty() && outputs.types.is_empty() && outputs.functions.is_empty());
}

fn descriptor<'a>(source: &'a str, name: &str) -> &'a str {
    let start = source.find(&format!("pub static {name}: TypeDescriptor")).unwrap();
    let len = source[start..].find("};").unwrap();
    &source[start..start + len]
}

#[test]
fn records_whether_a_flags_word_is_declared() {
    let out = run(SCHEMA, &Config::default()).unwrap();
    assert!(descriptor(&out.types, "GEO_POINT").contains("flags: true,"));
    assert!(descriptor(&out.types, "MESSAGE").contains("flags: false,"));
    assert!(descriptor(&out.functions, "PING").contains("flags: false,"));
}

#[test]
fn keeps_a_flags_word_no_field_reads() {
    let out = run("foo#11223344 flags:# x:int = Foo;", &Config::default()).unwrap();
    let foo = descriptor(&out.types, "FOO");
    assert!(foo.contains("flags: true,"));
    assert!(foo.contains("Field::required(\"x\", Codec::Int),"));
}

#[test]
fn rejects_vectors_of_true() {
    assert!(run("a#1 xs:Vector<true> = A;", &Config::default()).is_err());
    assert!(run("a#1 xs:vector<true> = A;", &Config::default()).is_err());
}
