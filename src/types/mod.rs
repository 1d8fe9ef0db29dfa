//! Structural type algebra: null, basic, conjunction, and disjunction types.
//!
//! A [`Type`] describes the shape of a prototype object. Types are value
//! types: cloning always yields an independent instance, and no instance is
//! ever shared for mutation. Member lookup and compatibility delegate to the
//! underlying prototype objects' member and ancestor chains.
//!
//! Compatibility is assignment-directional: `declared.is_compatible(value)`
//! asks whether a value of type `value` satisfies a variable declared as
//! `declared`.

use crate::errors::EvalError;
use crate::runtime::object::ObjectHandle;

/// A structurally-compared description of an object's shape.
#[derive(Debug, Clone)]
pub enum Type {
    /// "No type": the root/uninitialized state. All queries fail except
    /// member lookup (which yields none) and printing.
    Null,
    /// Wraps exactly one underlying prototype object.
    Basic(ObjectHandle),
    /// Conjunction of two member types. The member sets are disjoint by
    /// construction; lookup tries the left side, then the right.
    And(Box<Type>, Box<Type>),
    /// Disjunction of two member types. Member lookup is forbidden
    /// (ambiguous), but member-*type* lookup returns the least-upper-bound
    /// union of both branches.
    Or(Box<Type>, Box<Type>),
}

impl Type {
    pub fn and(left: Type, right: Type) -> Type {
        Type::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Type, right: Type) -> Type {
        Type::Or(Box::new(left), Box::new(right))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Type::Null)
    }

    /// Looks up a member object by name.
    ///
    /// Fails on a disjunction: without knowing which branch the value
    /// actually inhabits, there is no single member object to return.
    pub fn get_member(&self, name: &str) -> Result<Option<ObjectHandle>, EvalError> {
        match self {
            Type::Null => Ok(None),
            Type::Basic(object) => Ok(object.get_member(name)),
            Type::And(left, right) => {
                // The member exists in at most one branch; that is enforced
                // at construction.
                if let Some(member) = left.get_member(name)? {
                    return Ok(Some(member));
                }
                right.get_member(name)
            }
            Type::Or(..) => Err(EvalError::type_error(format!(
                "cannot request member '{}' from disjunction type {}",
                name, self
            ))),
        }
    }

    /// Looks up the type of a member, duplicated so the caller owns it.
    ///
    /// On a disjunction the member must exist in both branches; the result is
    /// the simplified union of the two member types.
    pub fn get_member_type(&self, name: &str) -> Result<Option<Type>, EvalError> {
        match self {
            Type::Null => Ok(None),
            Type::Basic(object) => Ok(object
                .get_member(name)
                .map(|member| member.get_type().clone())),
            Type::And(left, right) => {
                if let Some(ty) = left.get_member_type(name)? {
                    return Ok(Some(ty));
                }
                right.get_member_type(name)
            }
            Type::Or(left, right) => {
                let left_ty = left.get_member_type(name)?;
                let right_ty = right.get_member_type(name)?;
                match (left_ty, right_ty) {
                    (Some(l), Some(r)) => Ok(Some(or_union(&l, &r)?)),
                    _ => Err(EvalError::type_error(format!(
                        "member '{}' is not defined by both branches of {}",
                        name, self
                    ))),
                }
            }
        }
    }

    /// Does a value of type `other` satisfy a variable declared as `self`?
    pub fn is_compatible(&self, other: &Type) -> Result<bool, EvalError> {
        match (self, other) {
            (Type::Null, _) | (_, Type::Null) => Err(EvalError::type_error(
                "the null type cannot be checked for compatibility",
            )),

            (Type::Basic(mine), Type::Basic(theirs)) => {
                if ObjectHandle::ptr_eq(mine, theirs) {
                    return Ok(true);
                }
                // Walk the other side's ancestor chain: its prototype's own
                // declared type may match us further up.
                match theirs.get_type() {
                    Type::Null => Ok(false),
                    ancestor => self.is_compatible(ancestor),
                }
            }
            // A lone prototype can never promise the combined or ambiguous
            // member set of a conjunction/disjunction value.
            (Type::Basic(_), Type::And(..)) | (Type::Basic(_), Type::Or(..)) => {
                Err(EvalError::type_error(format!(
                    "compatibility of {} with {} is undefined in this direction",
                    self, other
                )))
            }

            // A&B <=> C ?  (C matches A) or (C matches B)
            (Type::And(l, r), Type::Basic(_)) => {
                Ok(l.is_compatible(other)? || r.is_compatible(other)?)
            }
            // A&B <=> C&D ?  (C or D matches A) or (C or D matches B)
            (Type::And(l, r), Type::And(ol, or)) => Ok(l.is_compatible(ol)?
                || l.is_compatible(or)?
                || r.is_compatible(ol)?
                || r.is_compatible(or)?),
            // A&B <=> C|D ?  (C matches A or B) and (D matches A or B)
            (Type::And(l, r), Type::Or(ol, or)) => {
                Ok((l.is_compatible(ol)? || r.is_compatible(ol)?)
                    && (l.is_compatible(or)? || r.is_compatible(or)?))
            }

            // A|B <=> C ?  (C matches A) or (C matches B)
            (Type::Or(l, r), Type::Basic(_)) => {
                Ok(l.is_compatible(other)? || r.is_compatible(other)?)
            }
            // A|B <=> C&D ?  (C or D match A) or (C or D match B)
            (Type::Or(l, r), Type::And(ol, or)) => Ok(l.is_compatible(ol)?
                || l.is_compatible(or)?
                || r.is_compatible(ol)?
                || r.is_compatible(or)?),
            // A|B <=> C|D ?  (C and D match A) or (C and D match B)
            (Type::Or(l, r), Type::Or(ol, or)) => {
                Ok((l.is_compatible(ol)? && l.is_compatible(or)?)
                    || (r.is_compatible(ol)? && r.is_compatible(or)?))
            }
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Null => write!(f, "<no type>"),
            Type::Basic(object) => write!(f, "{}", object.name()),
            Type::And(left, right) => write!(f, "&({},{})", left, right),
            Type::Or(left, right) => write!(f, "|({},{})", left, right),
        }
    }
}

/// Builds the simplest union of two types.
///
/// If either side already subsumes the other, the union is a duplicate of the
/// wider side; only genuinely incomparable types produce a literal [`Type::Or`].
pub fn or_union(a: &Type, b: &Type) -> Result<Type, EvalError> {
    if a.is_compatible(b)? {
        return Ok(a.clone());
    }
    if b.is_compatible(a)? {
        return Ok(b.clone());
    }
    Ok(Type::or(a.clone(), b.clone()))
}
