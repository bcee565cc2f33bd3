//! End-to-end tests over the parse, lower, validate pipeline.

use minimidl::ast::validation::{self, Message};
use minimidl::ast::{self, lower, Item, NamedKind, Type};
use minimidl::files::Files;
use minimidl::surface;

fn compile(source: &str) -> (ast::Module, Vec<Message>) {
    let mut files = Files::new();
    let file_id = files.add("test.midl".to_owned(), source.to_owned());
    let surface = surface::Module::parse(file_id, source).expect("unexpected syntax error");
    let mut module = lower::module(&surface);
    let messages = validation::validate(&mut module);
    (module, messages)
}

fn compile_ok(source: &str) -> ast::Module {
    let (module, messages) = compile(source);
    assert!(messages.is_empty(), "unexpected messages: {:?}", messages);
    module
}

fn const_value(module: &ast::Module, namespace: usize, name: &str) -> Option<i64> {
    module.namespaces[namespace].items.iter().find_map(|item| match item {
        Item::Const(r#const) if r#const.name == name => r#const.value,
        _ => None,
    })
}

#[test]
fn compilation_is_deterministic() {
    let source = r#"
        namespace Shop {
            const int32_t MAX_ITEMS = 1 << 6;
            enum Status : int32_t { Open = 1, Closed = 2, }
            interface IOrder;
            interface IOrder {
                string_t Id;
                Status State writable;
                int32_t Total();
            }
        }
    "#;
    let first = compile_ok(source);
    let second = compile_ok(source);
    assert_eq!(first, second);
}

#[test]
fn duplicate_interface_reports_once() {
    let (_, messages) = compile(
        r#"
        namespace Test {
            interface IThing { }
            interface IThing { }
        }
        "#,
    );
    let duplicates: Vec<_> = messages
        .iter()
        .filter(|message| matches!(message, Message::DuplicateDefinition { name, .. } if name == "IThing"))
        .collect();
    assert_eq!(duplicates.len(), 1);
}

#[test]
fn duplicate_across_kinds() {
    let (_, messages) = compile(
        r#"
        namespace Test {
            enum Thing : int32_t { A = 1, }
            typedef string_t Thing;
        }
        "#,
    );
    assert!(messages
        .iter()
        .any(|message| matches!(message, Message::DuplicateDefinition { name, .. } if name == "Thing")));
}

#[test]
fn dangling_forward_declaration() {
    let (_, messages) = compile(
        r#"
        namespace Test {
            interface IMissing;
        }
        "#,
    );
    assert_eq!(messages.len(), 1);
    assert!(matches!(
        &messages[0],
        Message::UnresolvedForwardDeclaration { name, .. } if name == "IMissing"
    ));

    // The same forward declaration with a definition is fine, and repeated
    // forward declarations are allowed.
    compile_ok(
        r#"
        namespace Test {
            interface IMissing;
            interface IMissing;
            interface IMissing { }
        }
        "#,
    );
}

#[test]
fn mutually_referencing_interfaces_resolve() {
    let module = compile_ok(
        r#"
        namespace Social {
            interface IPost;
            interface IUser {
                IPost[] Posts;
            }
            interface IPost {
                IUser Author;
            }
        }
        "#,
    );

    // `IPost` inside `IUser` points at the full definition, not the forward
    // declaration.
    let user = match &module.namespaces[0].items[1] {
        Item::Interface(interface) => interface,
        item => panic!("expected interface, found {:?}", item),
    };
    match &user.properties[0].r#type {
        Type::Array { element, .. } => match element.as_ref() {
            Type::Named {
                target: Some(target),
                ..
            } => {
                assert_eq!(target.kind, NamedKind::Interface);
                assert_eq!((target.namespace, target.item), (0, 2));
            }
            r#type => panic!("expected resolved name, found {:?}", r#type),
        },
        r#type => panic!("expected array, found {:?}", r#type),
    }
}

#[test]
fn nested_nullability_is_rejected() {
    compile_ok(
        r#"
        namespace Test {
            interface IThing { string_t? MaybeName; }
        }
        "#,
    );

    let (_, messages) = compile(
        r#"
        namespace Test {
            interface IThing { string_t?? MaybeName; }
        }
        "#,
    );
    assert!(messages
        .iter()
        .any(|message| matches!(message, Message::InvalidNullability { .. })));

    // Also through a typedef.
    let (_, messages) = compile(
        r#"
        namespace Test {
            typedef string_t? MaybeString;
            interface IThing { MaybeString? Name; }
        }
        "#,
    );
    assert!(messages
        .iter()
        .any(|message| matches!(message, Message::InvalidNullability { .. })));
}

#[test]
fn dictionary_key_shapes() {
    compile_ok(
        r#"
        namespace Test {
            interface IThing { dict<string_t, int32_t> Counts; }
        }
        "#,
    );

    let (_, messages) = compile(
        r#"
        namespace Test {
            interface IUser { }
            interface IThing { dict<IUser, string_t> Names; }
        }
        "#,
    );
    assert!(messages
        .iter()
        .any(|message| matches!(message, Message::InvalidKeyType { .. })));

    // Key validity looks through typedefs.
    let (_, messages) = compile(
        r#"
        namespace Test {
            typedef string_t[] StringList;
            interface IThing { dict<StringList, int32_t> Counts; }
        }
        "#,
    );
    assert!(messages
        .iter()
        .any(|message| matches!(message, Message::InvalidKeyType { found, .. } if found == "an array")));
}

#[test]
fn void_is_only_a_return_type() {
    compile_ok(
        r#"
        namespace Test {
            interface IThing { void Reset(); }
        }
        "#,
    );

    let (_, messages) = compile(
        r#"
        namespace Test {
            interface IThing {
                void Broken;
                void[] AlsoBroken();
            }
        }
        "#,
    );
    let voids = messages
        .iter()
        .filter(|message| matches!(message, Message::InvalidVoidType { .. }))
        .count();
    assert_eq!(voids, 2);
}

#[test]
fn unknown_type_suggests_a_close_name() {
    let (_, messages) = compile(
        r#"
        namespace Test {
            interface IWidget { }
            interface IThing { IWidgit Child; }
        }
        "#,
    );
    assert!(messages.iter().any(|message| matches!(
        message,
        Message::UnknownType { name, suggestion: Some(suggestion), .. }
            if name == "IWidgit" && suggestion == "IWidget"
    )));
}

#[test]
fn constant_is_not_a_type() {
    let (_, messages) = compile(
        r#"
        namespace Test {
            const int32_t LIMIT = 8;
            interface IThing { LIMIT Size; }
        }
        "#,
    );
    assert!(messages
        .iter()
        .any(|message| matches!(message, Message::NotAType { name, .. } if name == "LIMIT")));
}

#[test]
fn typedef_cycles_are_rejected() {
    let (_, messages) = compile(
        r#"
        namespace Test {
            typedef B A;
            typedef A B;
        }
        "#,
    );
    let cycles = messages
        .iter()
        .filter(|message| matches!(message, Message::CyclicTypedef { .. }))
        .count();
    assert_eq!(cycles, 2);

    // Aliasing through a container is not a cycle.
    compile_ok(
        r#"
        namespace Test {
            interface INode;
            interface INode { INode[] Children; }
            typedef INode[] NodeList;
        }
        "#,
    );
}

#[test]
fn constant_values_are_attached() {
    let module = compile_ok(
        r#"
        namespace Flags {
            const int32_t READ = 1 << 0;
            const int32_t WRITE = 1 << 1;
            const int32_t ALL = READ | WRITE;
            const int32_t MASK = (1 << 8) | 0xFF;
            const int32_t PATTERN = 0b11010010;
        }
        "#,
    );
    assert_eq!(const_value(&module, 0, "READ"), Some(1));
    assert_eq!(const_value(&module, 0, "WRITE"), Some(2));
    assert_eq!(const_value(&module, 0, "ALL"), Some(3));
    assert_eq!(const_value(&module, 0, "MASK"), Some(511));
    assert_eq!(const_value(&module, 0, "PATTERN"), Some(210));
}

#[test]
fn enum_members_evaluate_in_order() {
    let module = compile_ok(
        r#"
        namespace Test {
            const int32_t BASE = 16;
            enum Flag : int32_t {
                A = 1,
                B = A << 1,
                C = A | B,
                D = BASE,
            }
        }
        "#,
    );
    let r#enum = match &module.namespaces[0].items[1] {
        Item::Enum(r#enum) => r#enum,
        item => panic!("expected enum, found {:?}", item),
    };
    let values: Vec<Option<i64>> = r#enum.members.iter().map(|member| member.value).collect();
    assert_eq!(values, vec![Some(1), Some(2), Some(3), Some(16)]);
}

#[test]
fn forward_references_in_expressions_fail() {
    let (_, messages) = compile(
        r#"
        namespace Test {
            const int32_t FIRST = SECOND + 1;
            const int32_t SECOND = 2;
        }
        "#,
    );
    assert!(messages
        .iter()
        .any(|message| matches!(message, Message::UnresolvedReference { name, .. } if name == "SECOND")));
}

#[test]
fn referencing_an_interface_in_an_expression() {
    let (_, messages) = compile(
        r#"
        namespace Test {
            interface IUser { }
            const int32_t BAD = IUser + 1;
        }
        "#,
    );
    assert!(messages.iter().any(|message| matches!(
        message,
        Message::TypeMismatch { name, kind, .. } if name == "IUser" && *kind == "an interface"
    )));
}

#[test]
fn division_by_zero_is_reported() {
    let (_, messages) = compile(
        r#"
        namespace Test {
            const int32_t BAD = 1 / 0;
        }
        "#,
    );
    assert!(messages
        .iter()
        .any(|message| matches!(message, Message::DivisionByZero { .. })));
}

#[test]
fn interface_member_collisions() {
    let (_, messages) = compile(
        r#"
        namespace Test {
            interface IThing {
                string_t Name;
                int32_t Name();
                void Run(int32_t count, int32_t count);
            }
        }
        "#,
    );
    assert!(messages
        .iter()
        .any(|message| matches!(message, Message::DuplicateMember { name, .. } if name == "Name")));
    assert!(messages
        .iter()
        .any(|message| matches!(message, Message::DuplicateParameter { name, .. } if name == "count")));
}

#[test]
fn same_named_namespace_blocks_share_a_scope() {
    // A constant in an earlier block is visible in a later one.
    let module = compile_ok(
        r#"
        namespace Test {
            const int32_t BASE = 4;
        }
        namespace Test {
            const int32_t DERIVED = BASE * 2;
        }
        "#,
    );
    assert_eq!(const_value(&module, 1, "DERIVED"), Some(8));

    // Definitions collide across blocks too.
    let (_, messages) = compile(
        r#"
        namespace Test {
            interface IThing { }
        }
        namespace Test {
            interface IThing { }
        }
        "#,
    );
    assert!(messages
        .iter()
        .any(|message| matches!(message, Message::DuplicateDefinition { name, .. } if name == "IThing")));

    // Distinct namespace names are distinct scopes.
    compile_ok(
        r#"
        namespace A { interface IThing { } }
        namespace B { interface IThing { } }
        "#,
    );
}

#[test]
fn thirty_two_bit_constants_wrap() {
    let module = compile_ok(
        r#"
        namespace Test {
            const int32_t WRAPPED = 0x7FFFFFFF + 1;
            const int64_t WIDE = 0x7FFFFFFF + 1;
        }
        "#,
    );
    assert_eq!(const_value(&module, 0, "WRAPPED"), Some(i32::MIN as i64));
    assert_eq!(const_value(&module, 0, "WIDE"), Some(0x8000_0000));
}

#[test]
fn batch_reporting_collects_every_error() {
    let (_, messages) = compile(
        r#"
        namespace Test {
            interface IMissing;
            interface IThing {
                Unknown Child;
                void Broken;
            }
            const int32_t BAD = NOPE;
        }
        "#,
    );
    assert!(messages
        .iter()
        .any(|message| matches!(message, Message::UnresolvedForwardDeclaration { .. })));
    assert!(messages
        .iter()
        .any(|message| matches!(message, Message::UnknownType { .. })));
    assert!(messages
        .iter()
        .any(|message| matches!(message, Message::InvalidVoidType { .. })));
    assert!(messages
        .iter()
        .any(|message| matches!(message, Message::UnresolvedReference { .. })));
}
