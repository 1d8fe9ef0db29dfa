//! The type algebra in isolation: member lookup, directional compatibility,
//! and union simplification over hand-built prototype chains.

use pretty_assertions::assert_eq;

use arbor::{or_union, ErrorKind, Object, ObjectHandle, Type};

/// A miniature prototype world: `object` at the root, `int` and `string`
/// descending from it.
fn protos() -> (ObjectHandle, ObjectHandle, ObjectHandle) {
    let object = Object::new("object", Type::Null).into_handle();
    let int = Object::new("int", Type::Basic(object.clone())).into_handle();
    let string = Object::new("string", Type::Basic(object.clone())).into_handle();
    (object, int, string)
}

#[test]
fn basic_compatibility_is_reflexive() {
    let (_, int, _) = protos();
    let ty = Type::Basic(int);
    assert!(ty.is_compatible(&ty.clone()).unwrap());
}

#[test]
fn compatibility_walks_the_ancestor_chain_one_way() {
    let (object, int, _) = protos();
    let object_ty = Type::Basic(object);
    let int_ty = Type::Basic(int);
    // An int value satisfies an object variable, never the reverse.
    assert!(object_ty.is_compatible(&int_ty).unwrap());
    assert!(!int_ty.is_compatible(&object_ty).unwrap());
}

#[test]
fn unrelated_basics_are_incompatible() {
    let (_, int, string) = protos();
    assert!(!Type::Basic(int).is_compatible(&Type::Basic(string)).unwrap());
}

#[test]
fn null_refuses_compatibility_queries() {
    let (_, int, _) = protos();
    let err = Type::Null.is_compatible(&Type::Basic(int.clone())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    let err = Type::Basic(int).is_compatible(&Type::Null).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn basic_against_compound_is_undefined() {
    let (_, int, string) = protos();
    let compound = Type::and(Type::Basic(int.clone()), Type::Basic(string.clone()));
    let err = Type::Basic(int.clone()).is_compatible(&compound).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    let union = Type::or(Type::Basic(int.clone()), Type::Basic(string));
    let err = Type::Basic(int).is_compatible(&union).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn conjunction_accepts_a_value_matching_either_side() {
    let (_, int, string) = protos();
    let both = Type::and(Type::Basic(int.clone()), Type::Basic(string));
    assert!(both.is_compatible(&Type::Basic(int)).unwrap());
}

#[test]
fn disjunction_accepts_a_value_matching_either_branch() {
    let (_, int, string) = protos();
    let either = Type::or(Type::Basic(int.clone()), Type::Basic(string.clone()));
    assert!(either.is_compatible(&Type::Basic(int)).unwrap());
    assert!(either.is_compatible(&Type::Basic(string)).unwrap());
}

#[test]
fn disjunction_requires_a_covering_branch_for_a_union_value() {
    let (object, int, string) = protos();
    let declared = Type::or(Type::Basic(object), Type::Basic(int.clone()));
    let value = Type::or(Type::Basic(int.clone()), Type::Basic(string.clone()));
    // The object branch covers both int and string on its own.
    assert!(declared.is_compatible(&value).unwrap());
    // Neither branch of int|string covers the other, so no single branch
    // covers an int|string value.
    let declared = Type::or(Type::Basic(int.clone()), Type::Basic(string.clone()));
    let value = Type::or(Type::Basic(int), Type::Basic(string));
    assert!(!declared.is_compatible(&value).unwrap());
}

#[test]
fn member_lookup_passes_through_the_ancestor_chain() {
    let (object, int, _) = protos();
    let member = Object::new("size", Type::Basic(int)).into_handle();
    let parent = Object::new("parent", Type::Null)
        .with_member("size", member)
        .into_handle();
    let child = Object::new("child", Type::Basic(parent)).into_handle();
    let found = child.get_member("size").expect("inherited member");
    assert_eq!(found.name(), "size");
    assert!(child.get_member("missing").is_none());
    assert!(object.get_member("size").is_none());
}

#[test]
fn conjunction_member_lookup_tries_both_sides() {
    let (_, int, string) = protos();
    let a = Object::new("a", Type::Null)
        .with_member("left", Object::new("left", Type::Basic(int)).into_handle())
        .into_handle();
    let b = Object::new("b", Type::Null)
        .with_member("right", Object::new("right", Type::Basic(string)).into_handle())
        .into_handle();
    let both = Type::and(Type::Basic(a), Type::Basic(b));
    assert!(both.get_member("left").unwrap().is_some());
    assert!(both.get_member("right").unwrap().is_some());
    assert!(both.get_member("neither").unwrap().is_none());
}

#[test]
fn disjunction_refuses_member_lookup() {
    let (_, int, string) = protos();
    let either = Type::or(Type::Basic(int), Type::Basic(string));
    let err = either.get_member("anything").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn disjunction_member_type_unions_both_branches() {
    let (_, int, string) = protos();
    let int_ty = Type::Basic(int.clone());
    let a = Object::new("a", Type::Null)
        .with_member("m", Object::new("m", int_ty.clone()).into_handle())
        .into_handle();
    let b = Object::new("b", Type::Null)
        .with_member("m", Object::new("m", int_ty).into_handle())
        .into_handle();
    let either = Type::or(Type::Basic(a.clone()), Type::Basic(b));
    let ty = either.get_member_type("m").unwrap().expect("shared member");
    assert_eq!(ty.to_string(), "int");

    // A member missing from one branch cannot be typed.
    let lopsided = Type::or(Type::Basic(a), Type::Basic(string));
    let err = lopsided.get_member_type("m").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn union_simplifies_to_the_wider_side() {
    let (object, int, string) = protos();
    let object_ty = Type::Basic(object);
    let int_ty = Type::Basic(int);
    let string_ty = Type::Basic(string);

    let widened = or_union(&object_ty, &int_ty).unwrap();
    assert_eq!(widened.to_string(), "object");
    let widened = or_union(&int_ty, &object_ty).unwrap();
    assert_eq!(widened.to_string(), "object");

    // Identical sides never produce a literal disjunction.
    let same = or_union(&int_ty, &int_ty).unwrap();
    assert_eq!(same.to_string(), "int");

    // Incomparable sides stay a literal disjunction.
    let kept = or_union(&int_ty, &string_ty).unwrap();
    assert_eq!(kept.to_string(), "|(int,string)");
}

#[test]
fn display_formats() {
    let (_, int, string) = protos();
    assert_eq!(Type::Null.to_string(), "<no type>");
    assert_eq!(Type::Basic(int.clone()).to_string(), "int");
    assert_eq!(
        Type::and(Type::Basic(int.clone()), Type::Basic(string.clone())).to_string(),
        "&(int,string)"
    );
    assert_eq!(
        Type::or(Type::Basic(int), Type::Basic(string)).to_string(),
        "|(int,string)"
    );
}
